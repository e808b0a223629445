//! Plugin runtime shim
//!
//! Everything a plugin binary links against: the `Plugin` trait, startup
//! argument parsing, the handshake with the host and the callback helpers for
//! running host core commands.
//!
//! ```no_run
//! use async_trait::async_trait;
//! use cf_plugins::core::error::CliResult;
//! use cf_plugins::plugin::{CliConnection, Plugin, start};
//! use cf_plugins::protocol::{PluginCommand, PluginMetadata};
//!
//! struct Hello;
//!
//! #[async_trait]
//! impl Plugin for Hello {
//!     fn metadata(&self) -> PluginMetadata {
//!         PluginMetadata::new("Hello").with_command(PluginCommand::new("hello", "say hello"))
//!     }
//!
//!     async fn run(&self, connection: &CliConnection, _args: Vec<String>) -> CliResult<()> {
//!         let version = connection.cli_command_without_terminal_output(["version"]).await?;
//!         println!("hello from {}", version.join(" "));
//!         Ok(())
//!     }
//! }
//!
//! fn main() {
//!     start(Hello)
//! }
//! ```

pub mod api;
pub mod connection;
pub mod handshake;
pub mod shim;
pub mod startup;

pub use api::Plugin;
pub use connection::CliConnection;
pub use shim::{run_shim, start};
pub use startup::{StartupConfig, StartupMode};
