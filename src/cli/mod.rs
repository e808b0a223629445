//! The `cf` host: command line, terminal output and command execution

pub mod app;
pub mod commands;
pub mod dispatch;
pub mod table;
pub mod ui;

pub use app::App;
pub use commands::{Cli, Commands};
pub use dispatch::run_plugin_command;
pub use table::{CommandMetadata, CommandTable, RESERVED_HELP_NAME};
pub use ui::{TerminalUi, Ui};
