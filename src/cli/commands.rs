//! Command line definition for `cf`

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Operator CLI with out-of-process plugins
#[derive(Debug, Parser)]
#[command(name = "cf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding `.cf/plugins`; defaults to the home directory
    #[arg(long, env = "CF_PLUGIN_HOME")]
    pub plugin_home: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Install the plugin defined in command argument
    #[command(name = "install-plugin")]
    InstallPlugin {
        /// Local path or URL of the plugin binary
        target: String,
    },

    /// List all available plugin commands
    Plugins,

    /// Uninstall the plugin defined in command argument
    #[command(name = "uninstall-plugin")]
    UninstallPlugin {
        /// Name the plugin reported when it was installed
        name: String,
    },

    /// Print the version
    Version,

    /// Command provided by an installed plugin
    #[command(external_subcommand)]
    External(Vec<String>),
}
