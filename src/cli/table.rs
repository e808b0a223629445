//! Built-in command names and short names
//!
//! Plugins share one namespace with the core commands, so the installer checks
//! candidates against this table.

use clap::CommandFactory;

use crate::cli::commands::Cli;

/// Name of the built-in help command; no plugin may claim it
pub const RESERVED_HELP_NAME: &str = "help";

/// One built-in command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMetadata {
    pub name: String,
    /// Empty means no short name
    pub short_name: String,
}

impl CommandMetadata {
    pub fn new(name: impl Into<String>, short_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            short_name: short_name.into(),
        }
    }

    /// Whether `name` equals this command's name or (non-empty) short name
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || (!self.short_name.is_empty() && self.short_name == name)
    }
}

/// The set of built-in commands
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandTable {
    commands: Vec<CommandMetadata>,
}

impl CommandTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in commands of `cf`
    pub fn builtin() -> Self {
        Self::from_clap(&Cli::command())
    }

    /// Every subcommand of `command`, plus `help`
    ///
    /// The first visible alias of a subcommand becomes its short name.
    pub fn from_clap(command: &clap::Command) -> Self {
        let mut table = Self::new();
        for sub in command.get_subcommands() {
            let short_name = sub.get_visible_aliases().next().unwrap_or_default();
            table = table.with_command(sub.get_name(), short_name);
        }
        if table.find(RESERVED_HELP_NAME).is_none() {
            table = table.with_command(RESERVED_HELP_NAME, "h");
        }
        table
    }

    pub fn with_command(mut self, name: impl Into<String>, short_name: impl Into<String>) -> Self {
        self.commands.push(CommandMetadata::new(name, short_name));
        self
    }

    /// The built-in answering to `name`
    pub fn find(&self, name: &str) -> Option<&CommandMetadata> {
        self.commands.iter().find(|c| c.answers_to(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandMetadata> {
        self.commands.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table() {
        let table = CommandTable::builtin();
        for name in ["install-plugin", "plugins", "uninstall-plugin", "version", "help", "h"] {
            assert!(table.find(name).is_some(), "missing {name}");
        }
        assert!(table.find("test_1_cmd1").is_none());
        assert!(table.find("").is_none());
    }

    #[test]
    fn test_visible_alias_becomes_short_name() {
        let command = clap::Command::new("cf")
            .subcommand(clap::Command::new("push").visible_alias("p"))
            .subcommand(clap::Command::new("apps"));
        let table = CommandTable::from_clap(&command);

        assert_eq!(table.find("p").map(|c| c.name.as_str()), Some("push"));
        assert_eq!(table.find("apps").map(|c| c.short_name.as_str()), Some(""));
        assert_eq!(table.iter().count(), 3);
    }
}
