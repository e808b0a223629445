//! Payload types carried by the CliRpcCmd methods
//!
//! Field casing follows the registry and wire format shared with plugins built
//! outside this crate (`Name`, `Commands`, `Alias`, `HelpText`).

use serde::{Deserialize, Serialize};

/// Version of the CliRpcCmd contract implemented by this build
pub const RPC_PROTOCOL_VERSION: u32 = 1;

/// Identity and command surface a plugin reports about itself
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct PluginMetadata {
    /// Unique plugin name
    pub name: String,
    /// Commands in the order the plugin reported them
    #[serde(default)]
    pub commands: Vec<PluginCommand>,
}

impl PluginMetadata {
    /// Create metadata with no commands
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commands: Vec::new(),
        }
    }

    /// Append a command
    pub fn with_command(mut self, command: PluginCommand) -> Self {
        self.commands.push(command);
        self
    }

    /// Find the command answering to `name`, either by name or by alias
    pub fn find_command(&self, name: &str) -> Option<&PluginCommand> {
        self.commands.iter().find(|c| c.answers_to(name))
    }
}

/// One invokable command contributed by a plugin
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct PluginCommand {
    pub name: String,
    /// Empty means no alias
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub help_text: String,
}

impl PluginCommand {
    pub fn new(name: impl Into<String>, help_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: String::new(),
            help_text: help_text.into(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    /// Alias, if one is set
    pub fn alias(&self) -> Option<&str> {
        if self.alias.is_empty() {
            None
        } else {
            Some(&self.alias)
        }
    }

    /// Whether `name` equals this command's name or alias
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.alias() == Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_metadata_wire_casing() {
        let metadata = PluginMetadata::new("Test1")
            .with_command(PluginCommand::new("test_1_cmd1", "help text for test_1_cmd1"))
            .with_command(PluginCommand::new("test_1_cmd2", "help text").with_alias("t12"));

        let value = serde_json::to_value(&metadata).unwrap();
        assert_eq!(
            value,
            json!({
                "Name": "Test1",
                "Commands": [
                    {"Name": "test_1_cmd1", "Alias": "", "HelpText": "help text for test_1_cmd1"},
                    {"Name": "test_1_cmd2", "Alias": "t12", "HelpText": "help text"}
                ]
            })
        );
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let metadata: PluginMetadata =
            serde_json::from_value(json!({"Name": "Bare", "Commands": [{"Name": "go"}]})).unwrap();
        assert_eq!(metadata.commands[0].alias(), None);
        assert_eq!(metadata.commands[0].help_text, "");
    }

    #[test]
    fn test_empty_alias_never_matches() {
        let command = PluginCommand::new("push", "");
        assert!(command.answers_to("push"));
        assert!(!command.answers_to(""));

        let metadata = PluginMetadata::new("P").with_command(command.with_alias("p"));
        assert_eq!(metadata.find_command("p").map(|c| c.name.as_str()), Some("push"));
        assert!(metadata.find_command("q").is_none());
    }
}
