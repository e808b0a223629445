// Copyright (c) 2025 CF CLI Contributors
// SPDX-License-Identifier: MIT

//! # cf plugins
//!
//! Out-of-process plugin support for the `cf` command line: a host that spawns
//! plugin binaries and serves them a JSON-RPC callback service over loopback
//! TCP, and the runtime shim every plugin links against.
//!
//! ## Features
//!
//! - **Handshake**: plugins ping the host listener (5 attempts, 200ms apart) before doing anything else
//! - **CliRpcCmd service**: metadata reporting, terminal output control, core command execution and output draining
//! - **Plugin shim**: parsed startup arguments, metadata mode and run mode, `CliCommand` helpers
//! - **Installer**: local or downloaded binaries, conflict checks against built-ins and installed plugins
//! - **Registry**: plugin name to location and commands, persisted under a file lock
//!
//! ## Quick Start
//!
//! A plugin is a binary whose `main` hands a [`plugin::Plugin`] to the shim:
//!
//! ```rust,no_run
//! use cf_plugins::prelude::*;
//!
//! struct Hello;
//!
//! #[async_trait]
//! impl Plugin for Hello {
//!     fn metadata(&self) -> PluginMetadata {
//!         PluginMetadata::new("Hello").with_command(PluginCommand::new("hello", "Say hello"))
//!     }
//!
//!     async fn run(&self, connection: &CliConnection, args: Vec<String>) -> CliResult<()> {
//!         let version = connection.cli_command_without_terminal_output(["version"]).await?;
//!         println!("Hello from {:?} ({})", args, version.join(" "));
//!         Ok(())
//!     }
//! }
//!
//! fn main() {
//!     cf_plugins::plugin::start(Hello)
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`core`]: Errors, logging and retry
//! - [`protocol`]: JSON-RPC envelope and CliRpcCmd payload types
//! - [`transport`]: Newline-delimited JSON over loopback TCP
//! - [`rpc`]: Host RPC service, per-invocation session and typed client
//! - [`plugin`]: Runtime shim linked into plugin binaries
//! - [`registry`]: Persisted plugin registry
//! - [`installer`]: Binary resolution, metadata query, conflict checks, installation
//! - [`cli`]: The `cf` host application
//! - [`config`]: Configuration resolved from the environment

pub mod cli;
pub mod config;
pub mod core;
pub mod installer;
pub mod plugin;
pub mod protocol;
pub mod registry;
pub mod rpc;
pub mod transport;

// Re-export commonly used types for convenience
pub use core::error::{CliError, CliResult};
pub use protocol::messages::{PluginCommand, PluginMetadata};

/// Prelude module for convenient imports
///
/// Use `use cf_plugins::prelude::*;` when writing a plugin.
pub mod prelude {
    pub use crate::core::error::{CliError, CliResult};
    pub use crate::plugin::{CliConnection, Plugin};
    pub use crate::protocol::messages::{PluginCommand, PluginMetadata};

    // Essential external types
    pub use async_trait::async_trait;
}
