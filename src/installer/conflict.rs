// ! Command and alias conflict detection
// !
// ! Module checks a candidate plugin's commands against the built-in command
// ! table and every installed plugin. Commands are scanned in reported order;
// ! each one is checked against the built-ins (name, then alias) and then
// ! against installed plugins before the next command is looked at.

use std::fmt;

use crate::cli::table::{CommandTable, RESERVED_HELP_NAME};
use crate::protocol::messages::{PluginCommand, PluginMetadata};
use crate::registry::types::PluginMap;

/// Which field of a candidate command collided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Command,
    Alias,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameKind::Command => write!(f, "Command"),
            NameKind::Alias => write!(f, "Alias"),
        }
    }
}

/// First collision found for a candidate plugin
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    /// The candidate claims the built-in help command
    ReservedHelp { kind: NameKind, name: String },
    /// The candidate shadows a built-in command or short name
    NativeCommand { kind: NameKind, name: String },
    /// The candidate collides with an installed plugin's command or alias
    OtherPlugin {
        kind: NameKind,
        name: String,
        plugin: String,
    },
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Conflict::ReservedHelp { kind, name } | Conflict::NativeCommand { kind, name } => write!(
                f,
                "{kind} `{name}` in the plugin being installed is a native CF command/alias.  \
                 Rename the `{name}` command in the plugin being installed in order to enable \
                 its installation and use."
            ),
            Conflict::OtherPlugin { kind, name, plugin } => write!(
                f,
                "{kind} `{name}` is a command/alias in plugin '{plugin}'.  You could try \
                 uninstalling plugin '{plugin}' and then install this plugin in order to invoke \
                 the `{name}` command.  However, you should first fully understand the impact \
                 of uninstalling the existing '{plugin}' plugin."
            ),
        }
    }
}

/// Name and (non-empty) alias of a command, name first
fn claimed_names(command: &PluginCommand) -> impl Iterator<Item = (NameKind, &str)> {
    std::iter::once((NameKind::Command, command.name.as_str()))
        .chain(command.alias().map(|alias| (NameKind::Alias, alias)))
}

/// Reject plugins that claim the built-in help name
pub fn check_reserved(metadata: &PluginMetadata) -> Result<(), Conflict> {
    for command in &metadata.commands {
        for (kind, name) in claimed_names(command) {
            if name == RESERVED_HELP_NAME {
                return Err(Conflict::ReservedHelp {
                    kind,
                    name: name.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Find the first collision with a built-in or an installed plugin
pub fn find_conflict(
    metadata: &PluginMetadata,
    natives: &CommandTable,
    installed: &PluginMap,
) -> Option<Conflict> {
    for command in &metadata.commands {
        for (kind, name) in claimed_names(command) {
            if natives.find(name).is_some() {
                return Some(Conflict::NativeCommand {
                    kind,
                    name: name.to_string(),
                });
            }
        }

        for (kind, name) in claimed_names(command) {
            for (plugin, entry) in installed {
                if entry.find_command(name).is_some() {
                    return Some(Conflict::OtherPlugin {
                        kind,
                        name: name.to_string(),
                        plugin: plugin.clone(),
                    });
                }
            }
        }
    }

    None
}
