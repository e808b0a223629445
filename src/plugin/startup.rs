//! Plugin startup arguments
//!
//! The host launches a plugin as `<exe> true <port> [SendMetadata | <command> <args>...]`.
//! `StartupConfig` is the validated form of that argument vector, and the
//! builders below produce it on the host side.

use crate::core::error::{CliError, CliResult};

/// argv[1]: marks the process as launched by the host
pub const LAUNCHED_BY_HOST: &str = "true";

/// argv[3] selecting metadata-query mode
pub const METADATA_MODE_MARKER: &str = "SendMetadata";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupMode {
    /// Report metadata to the host and exit
    MetadataQuery,
    /// Execute `command` with `args`; `command` is `None` when nothing follows the port
    Run {
        command: Option<String>,
        args: Vec<String>,
    },
}

/// Parsed plugin invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupConfig {
    /// Port of the host's RPC listener on 127.0.0.1
    pub port: u16,
    pub mode: StartupMode,
}

impl StartupConfig {
    /// Parse a full argument vector, executable name included
    pub fn parse<I, S>(argv: I) -> CliResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let argv: Vec<String> = argv.into_iter().map(Into::into).collect();

        if argv.len() < 3 {
            return Err(CliError::usage(
                "plugins must be launched by the CLI (expected: <exe> true <port> [command args...])",
            ));
        }
        if argv[1] != LAUNCHED_BY_HOST {
            tracing::debug!("Unexpected launch flag {:?}, continuing", argv[1]);
        }

        let port: u16 = argv[2]
            .parse()
            .map_err(|_| CliError::usage(format!("invalid RPC port {:?}", argv[2])))?;
        if port == 0 {
            return Err(CliError::usage("RPC port must not be 0"));
        }

        let mode = if argv.len() == 4 && argv[3] == METADATA_MODE_MARKER {
            StartupMode::MetadataQuery
        } else {
            let mut rest = argv.into_iter().skip(3);
            StartupMode::Run {
                command: rest.next(),
                args: rest.collect(),
            }
        };

        Ok(Self { port, mode })
    }

    /// Arguments handed to the plugin's `run`: the command followed by its args
    pub fn plugin_args(&self) -> Vec<String> {
        match &self.mode {
            StartupMode::MetadataQuery => Vec::new(),
            StartupMode::Run { command, args } => {
                command.iter().chain(args.iter()).cloned().collect()
            }
        }
    }

    /// Host side: arguments (after the executable) for a metadata query
    pub fn metadata_query_argv(port: u16) -> Vec<String> {
        vec![
            LAUNCHED_BY_HOST.to_string(),
            port.to_string(),
            METADATA_MODE_MARKER.to_string(),
        ]
    }

    /// Host side: arguments (after the executable) to run a plugin command
    pub fn run_argv(port: u16, args: &[String]) -> Vec<String> {
        let mut argv = vec![LAUNCHED_BY_HOST.to_string(), port.to_string()];
        argv.extend(args.iter().cloned());
        argv
    }
}
