//! Registry records
//!
//! On disk the registry is `{"Plugins": {"<name>": {"Location": .., "Commands": [..]}}}`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::protocol::messages::{PluginCommand, PluginMetadata};

/// Installed plugins keyed by plugin name, in name order
pub type PluginMap = BTreeMap<String, PluginRegistryEntry>;

/// One installed plugin
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct PluginRegistryEntry {
    /// Absolute path of the installed binary
    pub location: PathBuf,
    /// Commands in the order the plugin reported them
    #[serde(default)]
    pub commands: Vec<PluginCommand>,
}

impl PluginRegistryEntry {
    pub fn new(location: impl Into<PathBuf>, metadata: &PluginMetadata) -> Self {
        Self {
            location: location.into(),
            commands: metadata.commands.clone(),
        }
    }

    /// The command answering to `name` by name or alias
    pub fn find_command(&self, name: &str) -> Option<&PluginCommand> {
        self.commands.iter().find(|c| c.answers_to(name))
    }
}

/// Serialized form of the whole registry file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct RegistryData {
    #[serde(default)]
    pub plugins: PluginMap,
}

/// A registry hit for a command name or alias
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOwner<'a> {
    pub plugin_name: &'a str,
    pub entry: &'a PluginRegistryEntry,
    pub command: &'a PluginCommand,
}

/// Find the installed plugin owning command `name` (by name or alias)
pub fn find_command_owner<'a>(plugins: &'a PluginMap, name: &str) -> Option<CommandOwner<'a>> {
    plugins.iter().find_map(|(plugin_name, entry)| {
        entry.find_command(name).map(|command| CommandOwner {
            plugin_name,
            entry,
            command,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_registry_file_shape() {
        let metadata = PluginMetadata::new("Test1")
            .with_command(PluginCommand::new("c1", "h1"))
            .with_command(PluginCommand::new("c2", "h2").with_alias("x"));
        let mut data = RegistryData::default();
        data.plugins.insert(
            "Test1".to_string(),
            PluginRegistryEntry::new("/plugins/test_1.exe", &metadata),
        );

        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            json!({
                "Plugins": {
                    "Test1": {
                        "Location": "/plugins/test_1.exe",
                        "Commands": [
                            {"Name": "c1", "Alias": "", "HelpText": "h1"},
                            {"Name": "c2", "Alias": "x", "HelpText": "h2"}
                        ]
                    }
                }
            })
        );
    }

    #[test]
    fn test_find_command_owner_by_alias() {
        let mut plugins = PluginMap::new();
        plugins.insert(
            "Pusher".to_string(),
            PluginRegistryEntry {
                location: PathBuf::from("/plugins/pusher"),
                commands: vec![PluginCommand::new("push-it", "").with_alias("pi")],
            },
        );

        let owner = find_command_owner(&plugins, "pi").unwrap();
        assert_eq!(owner.plugin_name, "Pusher");
        assert_eq!(owner.command.name, "push-it");
        assert!(find_command_owner(&plugins, "").is_none());
        assert!(find_command_owner(&plugins, "push").is_none());
    }
}
