// ! Plugin installation pipeline
// !
// ! Module takes a path or URL through resolution, metadata query, conflict
// ! checks and finally the copy into the plugin directory. Nothing is written
// ! before every check has passed. The binary is staged in a temporary file
// ! and only moved onto its final name once complete, and it is removed again
// ! if the registry update fails.

use async_trait::async_trait;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::cli::table::CommandTable;
use crate::cli::ui::Ui;
use crate::core::error::{CliError, CliResult};
use crate::core::logging::ErrorContext;
use crate::installer::conflict::{check_reserved, find_conflict};
use crate::installer::launcher::query_metadata;
use crate::installer::resolve::{BinaryDownloader, HttpDownloader, ResolvedBinary, resolve_binary};
use crate::protocol::messages::PluginMetadata;
use crate::registry::{PluginConfiguration, PluginRegistryEntry};

/// Source of a candidate binary's metadata
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn query(&self, binary: &Path) -> CliResult<PluginMetadata>;
}

/// Queries metadata by launching the binary in metadata mode
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessMetadataSource;

#[async_trait]
impl MetadataSource for ProcessMetadataSource {
    async fn query(&self, binary: &Path) -> CliResult<PluginMetadata> {
        query_metadata(binary).await
    }
}

/// Outcome of a successful install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPlugin {
    pub name: String,
    pub location: PathBuf,
    pub command_count: usize,
}

/// Installs plugin binaries into a registry
#[derive(Clone)]
pub struct PluginInstaller {
    ui: Arc<dyn Ui>,
    registry: Arc<dyn PluginConfiguration>,
    natives: CommandTable,
    downloader: Arc<dyn BinaryDownloader>,
    metadata: Arc<dyn MetadataSource>,
}

impl PluginInstaller {
    pub fn new(
        ui: Arc<dyn Ui>,
        registry: Arc<dyn PluginConfiguration>,
        natives: CommandTable,
    ) -> Self {
        Self {
            ui,
            registry,
            natives,
            downloader: Arc::new(HttpDownloader::new()),
            metadata: Arc::new(ProcessMetadataSource),
        }
    }

    pub fn with_downloader(mut self, downloader: Arc<dyn BinaryDownloader>) -> Self {
        self.downloader = downloader;
        self
    }

    pub fn with_metadata_source(mut self, metadata: Arc<dyn MetadataSource>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Install the plugin at `target`, a local path or a URL
    pub async fn install(&self, target: &str) -> CliResult<InstalledPlugin> {
        self.ui.say(&format!("Installing plugin {target}..."));

        let binary = resolve_binary(target, self.ui.as_ref(), self.downloader.as_ref()).await?;
        let metadata = self.metadata.query(&binary.path).await?;
        debug!(
            "{} reported plugin {} with {} commands",
            binary.path.display(),
            metadata.name,
            metadata.commands.len()
        );

        let installed = self
            .install_reported(&binary, &metadata)
            .await
            .inspect_err(|e| {
                e.log_with_context(&ErrorContext::new("install").with_plugin(&metadata.name))
            })?;

        info!(
            "Installed plugin {} at {}",
            installed.name,
            installed.location.display()
        );
        self.ui.ok();
        self.ui
            .say(&format!("Plugin {} successfully installed.", installed.name));
        self.ui.say(&format!(
            "{} command(s) available.",
            installed.command_count
        ));
        Ok(installed)
    }

    async fn install_reported(
        &self,
        binary: &ResolvedBinary,
        metadata: &PluginMetadata,
    ) -> CliResult<InstalledPlugin> {
        check_reserved(metadata)?;

        let installed = self.registry.plugins()?;
        if let Some(conflict) = find_conflict(metadata, &self.natives, &installed) {
            return Err(conflict.into());
        }

        if installed.contains_key(&metadata.name) {
            return Err(CliError::NameTaken(metadata.name.clone()));
        }

        let basename = binary.basename()?;
        let plugin_dir = self.registry.plugin_path();
        let destination = plugin_dir.join(&basename);
        if destination.exists() {
            return Err(CliError::DestinationExists(basename));
        }

        let source = binary.path.clone();
        let target = destination.clone();
        tokio::task::spawn_blocking(move || copy_into_plugin_dir(&source, &plugin_dir, &target))
            .await
            .map_err(|e| CliError::internal(format!("Copy task failed: {e}")))??;

        let entry = PluginRegistryEntry::new(destination.clone(), metadata);
        if let Err(e) = self.registry.set_plugin(&metadata.name, entry) {
            if let Err(cleanup) = std::fs::remove_file(&destination) {
                warn!(
                    "Failed to remove {} after registry error: {}",
                    destination.display(),
                    cleanup
                );
            }
            return Err(e);
        }

        Ok(InstalledPlugin {
            name: metadata.name.clone(),
            location: destination,
            command_count: metadata.commands.len(),
        })
    }
}

/// Copy `source` to `destination` inside `plugin_dir` without clobbering
///
/// The bytes land in a temporary file in `plugin_dir` first, so a failed copy
/// leaves nothing behind and `destination` only ever holds a complete binary.
fn copy_into_plugin_dir(source: &Path, plugin_dir: &Path, destination: &Path) -> CliResult<()> {
    std::fs::create_dir_all(plugin_dir)?;

    let mut temp = NamedTempFile::new_in(plugin_dir)?;
    let mut reader = File::open(source)?;
    std::io::copy(&mut reader, temp.as_file_mut())?;
    temp.as_file().sync_all()?;
    restrict_permissions(temp.path())?;

    temp.persist_noclobber(destination).map_err(|e| {
        if e.error.kind() == std::io::ErrorKind::AlreadyExists {
            let name = destination
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            CliError::DestinationExists(name)
        } else {
            CliError::from(e.error)
        }
    })?;
    Ok(())
}

/// Owner read/write/execute only
#[cfg(unix)]
fn restrict_permissions(path: &Path) -> CliResult<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> CliResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ui::TerminalUi;
    use crate::installer::conflict::Conflict;
    use crate::protocol::messages::PluginCommand;
    use crate::registry::InMemoryPluginConfiguration;
    use pretty_assertions::assert_eq;

    struct Fixed(PluginMetadata);

    #[async_trait]
    impl MetadataSource for Fixed {
        async fn query(&self, _binary: &Path) -> CliResult<PluginMetadata> {
            Ok(self.0.clone())
        }
    }

    struct NoNetwork;

    #[async_trait]
    impl BinaryDownloader for NoNetwork {
        async fn download(&self, _target: &str, _dest_dir: &Path) -> CliResult<PathBuf> {
            Err(CliError::Http("offline".to_string()))
        }
    }

    struct Harness {
        source: tempfile::TempDir,
        plugin_dir: tempfile::TempDir,
        ui: Arc<TerminalUi>,
        registry: Arc<InMemoryPluginConfiguration>,
    }

    impl Harness {
        fn new() -> Self {
            let plugin_dir = tempfile::tempdir().unwrap();
            Self {
                source: tempfile::tempdir().unwrap(),
                registry: Arc::new(InMemoryPluginConfiguration::new(plugin_dir.path())),
                plugin_dir,
                ui: Arc::new(TerminalUi::captured()),
            }
        }

        fn binary(&self, name: &str) -> String {
            let path = self.source.path().join(name);
            std::fs::write(&path, b"#!/bin/sh\n").unwrap();
            path.to_string_lossy().into_owned()
        }

        fn installer(&self, metadata: PluginMetadata) -> PluginInstaller {
            PluginInstaller::new(
                self.ui.clone(),
                self.registry.clone(),
                CommandTable::new().with_command("push", "p"),
            )
            .with_downloader(Arc::new(NoNetwork))
            .with_metadata_source(Arc::new(Fixed(metadata)))
        }
    }

    fn test1() -> PluginMetadata {
        PluginMetadata::new("Test1")
            .with_command(PluginCommand::new("c1", "h1"))
            .with_command(PluginCommand::new("c2", "h2"))
    }

    #[tokio::test]
    async fn test_install_copies_and_registers() {
        let harness = Harness::new();
        let target = harness.binary("test_1.exe");

        let installed = harness.installer(test1()).install(&target).await.unwrap();

        let expected = harness.plugin_dir.path().join("test_1.exe");
        assert_eq!(installed.location, expected);
        assert_eq!(installed.command_count, 2);
        assert!(expected.exists());

        let plugins = harness.registry.plugins().unwrap();
        let entry = &plugins["Test1"];
        assert_eq!(entry.location, expected);
        assert_eq!(entry.commands, test1().commands);

        assert!(harness.ui.contains_line(&["Installing plugin", "test_1.exe"]));
        assert!(harness.ui.contains_line(&["OK"]));
        assert!(harness.ui.contains_line(&["Plugin", "Test1", "successfully installed"]));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_installed_binary_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let harness = Harness::new();
        let target = harness.binary("test_1.exe");
        let installed = harness.installer(test1()).install(&target).await.unwrap();

        let mode = std::fs::metadata(installed.location).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }

    #[tokio::test]
    async fn test_reserved_help_leaves_no_trace() {
        let harness = Harness::new();
        let target = harness.binary("test_with_help.exe");
        let metadata = PluginMetadata::new("TestWithHelp").with_command(PluginCommand::new("help", ""));

        let result = harness.installer(metadata).install(&target).await;
        assert!(matches!(
            result,
            Err(CliError::Conflict(Conflict::ReservedHelp { .. }))
        ));
        assert!(harness.registry.plugins().unwrap().is_empty());
        assert!(!harness.plugin_dir.path().join("test_with_help.exe").exists());
    }

    #[tokio::test]
    async fn test_name_taken() {
        let harness = Harness::new();
        harness
            .installer(test1())
            .install(&harness.binary("test_1.exe"))
            .await
            .unwrap();

        let renamed = PluginMetadata::new("Test1").with_command(PluginCommand::new("other", ""));
        let result = harness
            .installer(renamed)
            .install(&harness.binary("test_1_copy.exe"))
            .await;

        match result {
            Err(e @ CliError::NameTaken(_)) => {
                assert_eq!(e.to_string(), "Plugin name Test1 is already taken")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_destination_exists_is_not_overwritten() {
        let harness = Harness::new();
        let existing = harness.plugin_dir.path().join("test_1.exe");
        std::fs::write(&existing, b"already here").unwrap();

        let result = harness
            .installer(test1())
            .install(&harness.binary("test_1.exe"))
            .await;

        match result {
            Err(e @ CliError::DestinationExists(_)) => assert_eq!(
                e.to_string(),
                "The file test_1.exe already exists under the plugin directory."
            ),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(std::fs::read(&existing).unwrap(), b"already here");
        assert!(harness.registry.plugins().unwrap().is_empty());
    }

    #[test]
    fn test_failed_copy_leaves_plugin_dir_empty() {
        let source = tempfile::tempdir().unwrap();
        let plugin_dir = tempfile::tempdir().unwrap();
        let destination = plugin_dir.path().join("test_1.exe");

        // Reading a directory fails once the copy has started
        let result = copy_into_plugin_dir(source.path(), plugin_dir.path(), &destination);

        assert!(matches!(result, Err(CliError::Io(_))));
        assert!(!destination.exists());
        assert_eq!(std::fs::read_dir(plugin_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_copy_never_clobbers_destination() {
        let source = tempfile::tempdir().unwrap();
        let binary = source.path().join("test_1.exe");
        std::fs::write(&binary, b"new").unwrap();
        let plugin_dir = tempfile::tempdir().unwrap();
        let destination = plugin_dir.path().join("test_1.exe");
        std::fs::write(&destination, b"old").unwrap();

        let result = copy_into_plugin_dir(&binary, plugin_dir.path(), &destination);

        match result {
            Err(CliError::DestinationExists(name)) => assert_eq!(name, "test_1.exe"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(std::fs::read(&destination).unwrap(), b"old");
        assert_eq!(std::fs::read_dir(plugin_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_copy_writes_complete_binary() {
        let source = tempfile::tempdir().unwrap();
        let binary = source.path().join("test_1.exe");
        std::fs::write(&binary, b"#!/bin/sh\necho hi\n").unwrap();
        let plugin_dir = tempfile::tempdir().unwrap();
        let destination = plugin_dir.path().join("nested").join("test_1.exe");

        copy_into_plugin_dir(&binary, &plugin_dir.path().join("nested"), &destination).unwrap();
        assert_eq!(std::fs::read(&destination).unwrap(), b"#!/bin/sh\necho hi\n");
    }

    #[tokio::test]
    async fn test_unresolvable_target() {
        let harness = Harness::new();
        let result = harness
            .installer(test1())
            .install("path/to/not/a/thing.exe")
            .await;

        assert!(matches!(result, Err(CliError::Resolution(_))));
        assert!(harness.ui.contains_line(&["Download attempt failed"]));
        assert!(harness.registry.plugins().unwrap().is_empty());
    }
}
