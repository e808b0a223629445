//! In-memory registry for tests and embedding

use std::path::PathBuf;
use std::sync::RwLock;

use crate::core::error::CliResult;
use crate::registry::PluginConfiguration;
use crate::registry::types::{PluginMap, PluginRegistryEntry};

#[derive(Debug)]
pub struct InMemoryPluginConfiguration {
    plugin_dir: PathBuf,
    plugins: RwLock<PluginMap>,
}

impl InMemoryPluginConfiguration {
    /// Empty registry whose binaries are installed under `plugin_dir`
    pub fn new(plugin_dir: impl Into<PathBuf>) -> Self {
        Self::with_plugins(plugin_dir, PluginMap::new())
    }

    pub fn with_plugins(plugin_dir: impl Into<PathBuf>, plugins: PluginMap) -> Self {
        Self {
            plugin_dir: plugin_dir.into(),
            plugins: RwLock::new(plugins),
        }
    }
}

impl PluginConfiguration for InMemoryPluginConfiguration {
    fn plugin_path(&self) -> PathBuf {
        self.plugin_dir.clone()
    }

    fn plugins(&self) -> CliResult<PluginMap> {
        Ok(self
            .plugins
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }

    fn set_plugin(&self, name: &str, entry: PluginRegistryEntry) -> CliResult<()> {
        self.plugins
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(name.to_string(), entry);
        Ok(())
    }

    fn remove_plugin(&self, name: &str) -> CliResult<Option<PluginRegistryEntry>> {
        Ok(self
            .plugins
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(name))
    }
}
