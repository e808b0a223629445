// ! File-backed plugin registry
// !
// ! Module persists the registry as `<plugin_dir>/config.json`. Every
// ! read-modify-write runs under an exclusive advisory lock on
// ! `<plugin_dir>/.config.lock` and replaces the file through a rename.

use fs2::FileExt;
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::error::{CliError, CliResult};
use crate::registry::PluginConfiguration;
use crate::registry::types::{PluginMap, PluginRegistryEntry, RegistryData};

/// Registry file name inside the plugin directory
pub const REGISTRY_FILE_NAME: &str = "config.json";

const LOCK_FILE_NAME: &str = ".config.lock";

/// Registry stored next to the installed binaries
#[derive(Debug, Clone)]
pub struct FilePluginConfiguration {
    plugin_dir: PathBuf,
}

impl FilePluginConfiguration {
    pub fn new(plugin_dir: impl Into<PathBuf>) -> Self {
        Self {
            plugin_dir: plugin_dir.into(),
        }
    }

    pub fn registry_file(&self) -> PathBuf {
        self.plugin_dir.join(REGISTRY_FILE_NAME)
    }

    fn lock_file(&self) -> CliResult<fs::File> {
        fs::create_dir_all(&self.plugin_dir)?;
        let file = fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.plugin_dir.join(LOCK_FILE_NAME))?;
        Ok(file)
    }

    fn read_data(path: &Path) -> CliResult<RegistryData> {
        if !path.exists() {
            return Ok(RegistryData::default());
        }

        let file = fs::File::open(path)?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            CliError::registry(format!("Failed to parse {}: {e}", path.display()))
        })
    }

    fn write_data(&self, data: &RegistryData) -> CliResult<()> {
        let mut temp = tempfile::NamedTempFile::new_in(&self.plugin_dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, data)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(self.registry_file())
            .map_err(|e| CliError::registry(format!("Failed to replace registry file: {e}")))?;
        Ok(())
    }

    /// Apply `update` to the registry under the exclusive lock
    fn update<T>(&self, update: impl FnOnce(&mut RegistryData) -> T) -> CliResult<T> {
        let lock = self.lock_file()?;
        FileExt::lock_exclusive(&lock)?;

        let result = Self::read_data(&self.registry_file()).and_then(|mut data| {
            let value = update(&mut data);
            self.write_data(&data)?;
            Ok(value)
        });

        FileExt::unlock(&lock)?;
        result
    }
}

impl PluginConfiguration for FilePluginConfiguration {
    fn plugin_path(&self) -> PathBuf {
        self.plugin_dir.clone()
    }

    fn plugins(&self) -> CliResult<PluginMap> {
        if !self.plugin_dir.exists() {
            return Ok(PluginMap::new());
        }

        let lock = self.lock_file()?;
        FileExt::lock_shared(&lock)?;
        let data = Self::read_data(&self.registry_file());
        FileExt::unlock(&lock)?;

        Ok(data?.plugins)
    }

    fn set_plugin(&self, name: &str, entry: PluginRegistryEntry) -> CliResult<()> {
        debug!("Registering plugin {} at {}", name, entry.location.display());
        self.update(|data| {
            data.plugins.insert(name.to_string(), entry);
        })
    }

    fn remove_plugin(&self, name: &str) -> CliResult<Option<PluginRegistryEntry>> {
        debug!("Removing plugin {} from registry", name);
        self.update(|data| data.plugins.remove(name))
    }
}
