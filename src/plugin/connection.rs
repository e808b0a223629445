//! Callback helpers for running host core commands from a plugin

use crate::core::error::{CliError, CliResult};
use crate::rpc::client::CliRpcClient;

/// Handle on the host that launched this plugin
///
/// Each helper call dials the host afresh, so the handle is cheap to copy and
/// holds no connection between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CliConnection {
    port: u16,
}

impl CliConnection {
    pub fn new(port: u16) -> Self {
        Self { port }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run a core command with its output shown on the terminal
    ///
    /// Returns the lines the command printed. A failed command yields
    /// `CliError::CoreCommandFailed` carrying whatever it printed.
    pub async fn cli_command<I, S>(&self, args: I) -> CliResult<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args = args.into_iter().map(Into::into).collect();
        self.call_core_command(false, args).await
    }

    /// Run a core command without printing to the terminal
    pub async fn cli_command_without_terminal_output<I, S>(&self, args: I) -> CliResult<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args = args.into_iter().map(Into::into).collect();
        self.call_core_command(true, args).await
    }

    async fn call_core_command(&self, silent: bool, args: Vec<String>) -> CliResult<Vec<String>> {
        let mut client = CliRpcClient::connect(self.port).await?;

        client.disable_terminal_output(silent).await?;
        let called = client.call_core_command(&args).await;
        let success = matches!(called, Ok(true));
        let drained = client.get_output_and_reset(success).await;
        client.finish().await;

        if !called? {
            return Err(CliError::CoreCommandFailed {
                output: drained.unwrap_or_default(),
            });
        }

        drained.map_err(|e| {
            CliError::protocol(format!("Unexpected failure collecting command output: {e}"))
        })
    }
}
