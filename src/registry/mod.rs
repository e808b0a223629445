//! Persisted plugin registry
//!
//! Maps plugin name to installed location and command list. Read by the
//! conflict checker and by command dispatch, written by install/uninstall.

pub mod memory;
pub mod store;
pub mod types;

use std::path::PathBuf;

use crate::core::error::CliResult;

pub use memory::InMemoryPluginConfiguration;
pub use store::FilePluginConfiguration;
pub use types::{CommandOwner, PluginMap, PluginRegistryEntry, RegistryData, find_command_owner};

/// Access to the plugin directory and its registry
pub trait PluginConfiguration: Send + Sync {
    /// Directory installed binaries are copied into
    fn plugin_path(&self) -> PathBuf;

    /// Every installed plugin
    fn plugins(&self) -> CliResult<PluginMap>;

    /// Insert or replace the entry for `name`
    fn set_plugin(&self, name: &str, entry: PluginRegistryEntry) -> CliResult<()>;

    /// Remove the entry for `name`, returning it if present
    fn remove_plugin(&self, name: &str) -> CliResult<Option<PluginRegistryEntry>>;
}
