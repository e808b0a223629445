// ! Plugin binary resolution
// !
// ! Module locates the binary named on the command line: as given, then
// ! relative to the current directory, and finally as a URL to download into a
// ! temporary directory.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};
use url::Url;

use crate::cli::ui::Ui;
use crate::core::error::{CliError, CliResult};

/// Final message when a binary can be neither found nor downloaded
pub const UNAVAILABLE_MESSAGE: &str =
    "Unable to install, plugin is not available from local/internet.";

/// Fetches a plugin binary from the network
#[async_trait]
pub trait BinaryDownloader: Send + Sync {
    /// Download `target` into `dest_dir`, returning the written file
    async fn download(&self, target: &str, dest_dir: &Path) -> CliResult<PathBuf>;
}

/// Downloader over HTTP(S)
#[derive(Debug, Clone, Default)]
pub struct HttpDownloader {
    client: reqwest::Client,
}

impl HttpDownloader {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BinaryDownloader for HttpDownloader {
    async fn download(&self, target: &str, dest_dir: &Path) -> CliResult<PathBuf> {
        let url = Url::parse(target)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CliError::Url(format!("unsupported scheme '{}'", url.scheme())));
        }

        let file_name = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| CliError::Url(format!("no file name in {url}")))?
            .to_string();

        debug!("Downloading {} to {}", url, dest_dir.display());
        let response = self.client.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;

        let path = dest_dir.join(file_name);
        tokio::fs::write(&path, &bytes).await?;
        Ok(path)
    }
}

/// A located plugin binary
///
/// Downloaded binaries live in a temporary directory removed on drop.
#[derive(Debug)]
pub struct ResolvedBinary {
    pub path: PathBuf,
    pub downloaded: bool,
    _temp_dir: Option<TempDir>,
}

impl ResolvedBinary {
    pub fn local(path: PathBuf) -> Self {
        Self {
            path,
            downloaded: false,
            _temp_dir: None,
        }
    }

    /// File name the binary is installed under
    pub fn basename(&self) -> CliResult<String> {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| CliError::Resolution(format!("{} has no file name", self.path.display())))
    }
}

/// Locate `target` locally, else download it
pub async fn resolve_binary(
    target: &str,
    ui: &dyn Ui,
    downloader: &dyn BinaryDownloader,
) -> CliResult<ResolvedBinary> {
    if let Some(path) = find_local(target)? {
        debug!("Found plugin binary at {}", path.display());
        return Ok(ResolvedBinary::local(path));
    }

    ui.say("Attempting to download binary file from internet address...");
    let temp_dir = tempfile::tempdir()?;
    match downloader.download(target, temp_dir.path()).await {
        Ok(path) => {
            make_executable(&path)?;
            info!("Downloaded plugin binary from {}", target);
            Ok(ResolvedBinary {
                path,
                downloaded: true,
                _temp_dir: Some(temp_dir),
            })
        }
        Err(e) => {
            ui.say(&format!("Download attempt failed: {e}"));
            Err(CliError::Resolution(UNAVAILABLE_MESSAGE.to_string()))
        }
    }
}

fn find_local(target: &str) -> CliResult<Option<PathBuf>> {
    let as_given = PathBuf::from(target);
    if as_given.is_file() {
        return Ok(Some(std::path::absolute(&as_given)?));
    }

    let relative = std::env::current_dir()?.join(target);
    if relative.is_file() {
        return Ok(Some(relative));
    }

    Ok(None)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> CliResult<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> CliResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ui::TerminalUi;

    struct NoNetwork;

    #[async_trait]
    impl BinaryDownloader for NoNetwork {
        async fn download(&self, _target: &str, _dest_dir: &Path) -> CliResult<PathBuf> {
            Err(CliError::Http("network unreachable".to_string()))
        }
    }

    struct WritesFile;

    #[async_trait]
    impl BinaryDownloader for WritesFile {
        async fn download(&self, _target: &str, dest_dir: &Path) -> CliResult<PathBuf> {
            let path = dest_dir.join("downloaded.exe");
            std::fs::write(&path, b"binary")?;
            Ok(path)
        }
    }

    #[tokio::test]
    async fn test_local_file_skips_download() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("test_1.exe");
        std::fs::write(&file, b"x").unwrap();

        let ui = TerminalUi::captured();
        let resolved = resolve_binary(file.to_str().unwrap(), &ui, &NoNetwork)
            .await
            .unwrap();

        assert_eq!(resolved.path, file);
        assert!(!resolved.downloaded);
        assert_eq!(resolved.basename().unwrap(), "test_1.exe");
        assert!(!ui.contains_line(&["Attempting to download"]));
    }

    #[tokio::test]
    async fn test_missing_file_reports_failed_download() {
        let ui = TerminalUi::captured();
        let result = resolve_binary("path/to/not/a/thing.exe", &ui, &NoNetwork).await;

        match result {
            Err(CliError::Resolution(message)) => assert_eq!(message, UNAVAILABLE_MESSAGE),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(ui.contains_line(&["Attempting to download binary file from internet"]));
        assert!(ui.contains_line(&["Download attempt failed", "network unreachable"]));
    }

    #[tokio::test]
    async fn test_download_keeps_temp_dir_alive() {
        let ui = TerminalUi::captured();
        let resolved = resolve_binary("https://example.invalid/downloaded.exe", &ui, &WritesFile)
            .await
            .unwrap();

        assert!(resolved.downloaded);
        assert!(resolved.path.exists());

        let path = resolved.path.clone();
        drop(resolved);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_http_downloader_rejects_non_urls() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = HttpDownloader::new();

        assert!(matches!(
            downloader.download("path/to/thing.exe", dir.path()).await,
            Err(CliError::Url(_))
        ));
        assert!(matches!(
            downloader.download("ftp://host/thing.exe", dir.path()).await,
            Err(CliError::Url(_))
        ));
        assert!(matches!(
            downloader.download("https://host/", dir.path()).await,
            Err(CliError::Url(_))
        ));
    }
}
