// ! Plugin runtime shim
// !
// ! Module holds the entry point linked into every plugin binary: parse the
// ! startup arguments, ping the host, then either report metadata or run the
// ! requested command.

use crate::core::error::{CliError, CliResult};
use crate::core::logging::{DEFAULT_LOG_FILTER, LOG_ENV_VAR, init_logging};
use crate::plugin::api::Plugin;
use crate::plugin::connection::CliConnection;
use crate::plugin::handshake::ping_host;
use crate::plugin::startup::{StartupConfig, StartupMode};
use crate::protocol::messages::RPC_PROTOCOL_VERSION;
use crate::rpc::client::CliRpcClient;

/// Run `plugin` against the process arguments and exit with its status
///
/// Call this from the plugin's `main`.
pub fn start<P: Plugin>(plugin: P) -> ! {
    let filter = std::env::var(LOG_ENV_VAR).unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());
    init_logging(&filter);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start async runtime: {e}");
            std::process::exit(1);
        }
    };

    let code = runtime.block_on(run_shim(&plugin, std::env::args().collect()));
    drop(runtime);
    std::process::exit(code)
}

/// Shim state machine; returns the process exit status
pub async fn run_shim<P: Plugin + ?Sized>(plugin: &P, argv: Vec<String>) -> i32 {
    let config = match StartupConfig::parse(argv) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return 1;
        }
    };

    if let Err(e) = ping_host(config.port).await {
        eprintln!("{e}");
        return 1;
    }

    match config.mode {
        StartupMode::MetadataQuery => match send_metadata(plugin, config.port).await {
            Ok(true) => 0,
            Ok(false) => 1,
            Err(e) => {
                eprintln!("{e}");
                1
            }
        },
        StartupMode::Run { .. } => {
            let connection = CliConnection::new(config.port);
            match plugin.run(&connection, config.plugin_args()).await {
                Ok(()) => 0,
                Err(e) => {
                    eprintln!("{e}");
                    1
                }
            }
        }
    }
}

async fn send_metadata<P: Plugin + ?Sized>(plugin: &P, port: u16) -> CliResult<bool> {
    let mut client = CliRpcClient::connect(port).await?;

    match client.protocol_version().await {
        Ok(version) if version == RPC_PROTOCOL_VERSION => {}
        Ok(version) => {
            return Err(CliError::protocol(format!(
                "host speaks CliRpcCmd protocol version {version}, plugin speaks version {RPC_PROTOCOL_VERSION}"
            )));
        }
        Err(CliError::MethodNotFound(_)) => {
            return Err(CliError::protocol(format!(
                "host does not report a CliRpcCmd protocol version, plugin speaks version {RPC_PROTOCOL_VERSION}"
            )));
        }
        Err(e) => return Err(e),
    }

    let success = client.set_plugin_metadata(&plugin.metadata()).await?;
    client.finish().await;
    Ok(success)
}
