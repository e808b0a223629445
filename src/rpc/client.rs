// ! Typed CliRpcCmd client
// !
// ! Module wraps a client transport with one method per host operation. Used
// ! by the plugin shim; calls block until the host answers.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::core::error::CliResult;
use crate::protocol::messages::PluginMetadata;
use crate::protocol::methods;
use crate::protocol::types::JsonRpcRequest;
use crate::transport::tcp::TcpClientTransport;
use crate::transport::traits::Transport;

/// Client for the host's CliRpcCmd service
pub struct CliRpcClient {
    transport: Box<dyn Transport>,
    next_id: u64,
}

impl CliRpcClient {
    /// Dial the host on 127.0.0.1:`port`
    pub async fn connect(port: u16) -> CliResult<Self> {
        let transport = TcpClientTransport::connect(port).await?;
        Ok(Self::new(Box::new(transport)))
    }

    /// Wrap an existing transport
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            next_id: 1,
        }
    }

    /// Issue one request and decode its result
    pub async fn call<P, R>(&mut self, method: &str, params: Option<P>) -> CliResult<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let id = self.next_id;
        self.next_id += 1;

        let request = JsonRpcRequest::new(json!(id), method, params)?;
        tracing::debug!("Calling {} (id {})", method, id);
        self.transport.send_request(request).await?.into_result()
    }

    /// Report the plugin's metadata (metadata-query mode)
    pub async fn set_plugin_metadata(&mut self, metadata: &PluginMetadata) -> CliResult<bool> {
        self.call(methods::SET_PLUGIN_METADATA, Some(metadata)).await
    }

    /// Toggle terminal printing on the host for the rest of the session
    pub async fn disable_terminal_output(&mut self, silent: bool) -> CliResult<bool> {
        self.call(methods::DISABLE_TERMINAL_OUTPUT, Some(silent))
            .await
    }

    /// Run a built-in host command; `false` means the command failed
    pub async fn call_core_command(&mut self, args: &[String]) -> CliResult<bool> {
        self.call(methods::CALL_CORE_COMMAND, Some(args)).await
    }

    /// Drain the host's captured output
    pub async fn get_output_and_reset(&mut self, success: bool) -> CliResult<Vec<String>> {
        self.call(methods::GET_OUTPUT_AND_RESET, Some(success))
            .await
    }

    /// Protocol version implemented by the host
    pub async fn protocol_version(&mut self) -> CliResult<u32> {
        self.call(methods::PROTOCOL_VERSION, None::<()>).await
    }

    pub async fn close(mut self) -> CliResult<()> {
        self.transport.close().await
    }

    /// Close once the exchange is done; a failure here is only logged
    pub async fn finish(mut self) {
        if let Err(e) = self.transport.close().await {
            tracing::warn!("Failed to close {}: {}", self.transport.connection_info(), e);
        }
    }
}
