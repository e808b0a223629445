//! Metadata query
//!
//! Runs a candidate binary in metadata mode against a fresh RPC session and
//! returns what it reported.

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::core::error::{CliError, CliResult};
use crate::plugin::startup::StartupConfig;
use crate::protocol::messages::PluginMetadata;
use crate::rpc::capture::OutputCapture;
use crate::rpc::server::RpcSession;

/// Launch `binary` in metadata mode and collect its metadata
pub async fn query_metadata(binary: &Path) -> CliResult<PluginMetadata> {
    let session = RpcSession::start(Arc::new(OutputCapture::new()), None).await?;
    let result = run_metadata_query(binary, &session).await;
    session.close().await?;
    result
}

async fn run_metadata_query(binary: &Path, session: &RpcSession) -> CliResult<PluginMetadata> {
    debug!(
        "Querying metadata of {} on port {}",
        binary.display(),
        session.port()
    );

    let output = Command::new(binary)
        .args(StartupConfig::metadata_query_argv(session.port()))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| {
            CliError::PluginLaunch(format!("failed to start {}: {e}", binary.display()))
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stdout.trim().is_empty() {
        debug!("plugin stdout: {}", stdout.trim_end());
    }
    if !stderr.trim().is_empty() {
        debug!("plugin stderr: {}", stderr.trim_end());
    }

    match session.take_metadata() {
        Some(metadata) => {
            if !output.status.success() {
                warn!(
                    "{} reported metadata but exited with {}",
                    binary.display(),
                    output.status
                );
            }
            Ok(metadata)
        }
        None => {
            let mut message = format!(
                "{} exited with {} without reporting its metadata",
                binary.display(),
                output.status
            );
            if !stderr.trim().is_empty() {
                message.push_str(": ");
                message.push_str(stderr.trim());
            }
            Err(CliError::PluginLaunch(message))
        }
    }
}
