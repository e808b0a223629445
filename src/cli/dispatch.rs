//! Run-mode dispatch of plugin commands

use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, info};

use crate::cli::app::App;
use crate::core::error::{CliError, CliResult};
use crate::core::logging::ErrorContext;
use crate::plugin::startup::StartupConfig;
use crate::registry::find_command_owner;
use crate::rpc::server::RpcSession;
use crate::rpc::service::CoreCommandRunner;

/// Run the plugin owning `args[0]` with the remaining arguments
///
/// The command is passed to the plugin under its canonical name even when it
/// was invoked by alias.
pub async fn run_plugin_command(app: &App, mut args: Vec<String>) -> CliResult<()> {
    let requested = args
        .first()
        .cloned()
        .ok_or_else(|| CliError::usage("no command given"))?;

    let plugins = app.registry().plugins()?;
    let owner = find_command_owner(&plugins, &requested)
        .ok_or_else(|| CliError::usage(format!("'{requested}' is not a registered command")))?;
    args[0] = owner.command.name.clone();

    let plugin_name = owner.plugin_name.to_string();
    let location = owner.entry.location.clone();
    info!("Dispatching {} to plugin {}", requested, plugin_name);

    let runner: Arc<dyn CoreCommandRunner> = Arc::new(app.clone());
    let session = RpcSession::start(app.ui().capture().clone(), Some(runner)).await?;
    debug!("Launching {} on port {}", location.display(), session.port());

    let status = Command::new(&location)
        .args(StartupConfig::run_argv(session.port(), &args))
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await;
    session.close().await?;

    let outcome = match status {
        Err(e) => Err(CliError::PluginLaunch(format!(
            "failed to start {}: {e}",
            location.display()
        ))),
        Ok(status) if !status.success() => Err(CliError::PluginFailed(format!(
            "{plugin_name} exited with {status}"
        ))),
        Ok(_) => Ok(()),
    };
    outcome.inspect_err(|e| {
        e.log_with_context(&ErrorContext::new("dispatch").with_plugin(&plugin_name));
    })
}
