// ! Plugin-to-host handshake
// !
// ! A freshly spawned plugin dials the host's listener to confirm it is up
// ! before any RPC call. The check connection is closed right away.

use crate::core::error::{CliError, CliResult};
use crate::core::logging::ErrorContext;
use crate::core::retry::{RetryConfig, RetryPolicy};
use crate::transport::tcp::{dial, loopback};
use crate::transport::traits::TransportConfig;

/// Dial 127.0.0.1:`port` with the standard handshake budget
pub async fn ping_host(port: u16) -> CliResult<()> {
    ping_host_with(port, RetryConfig::handshake()).await
}

/// Dial 127.0.0.1:`port`, retrying per `retry`
pub async fn ping_host_with(port: u16, retry: RetryConfig) -> CliResult<()> {
    let addr = loopback(port);
    let transport_config = TransportConfig {
        connect_timeout_ms: Some(1_000),
        ..Default::default()
    };
    let context = ErrorContext::new("handshake").with_extra("port", port);

    RetryPolicy::new(retry)
        .execute(
            || {
                let transport_config = transport_config.clone();
                async move {
                    let stream = dial(addr, &transport_config).await?;
                    drop(stream);
                    Ok::<(), CliError>(())
                }
            },
            context,
        )
        .await
        .map_err(|e| CliError::Handshake(format!("host at {addr} unreachable: {e}")))?;

    tracing::debug!("Handshake with host on port {} succeeded", port);
    Ok(())
}
