// ! Per-invocation RPC session
// !
// ! Module binds a fresh loopback listener for one plugin interaction and
// ! serves the CliRpcCmd service on it until the session is closed.

use std::sync::Arc;

use crate::core::error::{CliError, CliResult};
use crate::protocol::messages::PluginMetadata;
use crate::rpc::capture::OutputCapture;
use crate::rpc::service::{CliRpcService, CoreCommandRunner};
use crate::transport::tcp::TcpServerTransport;
use crate::transport::traits::{HandlerFuture, ServerRequestHandler, ServerTransport};

/// One host RPC server, bound for the lifetime of a single plugin process
pub struct RpcSession {
    service: Arc<CliRpcService>,
    transport: TcpServerTransport,
    port: u16,
}

impl RpcSession {
    /// Bind a listener and start serving
    ///
    /// When a runner is supplied the shared capture starts recording, so that
    /// core commands run on the plugin's behalf can be drained.
    pub async fn start(
        capture: Arc<OutputCapture>,
        runner: Option<Arc<dyn CoreCommandRunner>>,
    ) -> CliResult<Self> {
        let service = Arc::new(CliRpcService::new(capture, runner));

        let handler_service = service.clone();
        let handler: ServerRequestHandler = Arc::new(move |request| {
            let service = handler_service.clone();
            let response: HandlerFuture =
                Box::pin(async move { service.handle_request(request).await });
            response
        });

        let mut transport = TcpServerTransport::new();
        transport.set_request_handler(handler);
        transport.start().await?;

        let port = transport
            .local_addr()
            .map(|addr| addr.port())
            .ok_or_else(|| CliError::transport("RPC server did not report a bound address"))?;

        if service.can_run_core_commands() {
            service.capture().start_recording();
        }

        tracing::debug!("RPC session started on port {}", port);
        Ok(Self {
            service,
            transport,
            port,
        })
    }

    /// Port the plugin must dial
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn service(&self) -> &Arc<CliRpcService> {
        &self.service
    }

    /// Metadata the plugin reported during this session
    pub fn take_metadata(&self) -> Option<PluginMetadata> {
        self.service.take_metadata()
    }

    /// Stop serving and restore terminal output
    pub async fn close(mut self) -> CliResult<()> {
        let stopped = self.transport.stop().await;
        if self.service.can_run_core_commands() {
            self.service.capture().stop_recording();
        }
        tracing::debug!("RPC session on port {} closed", self.port);
        stopped
    }
}
