// ! Loopback TCP transport
// !
// ! Module carries newline-delimited JSON-RPC over TCP on 127.0.0.1. The host
// ! binds an ephemeral port per RPC session and hands the number to the plugin
// ! process; the plugin dials it once per call sequence.

use async_trait::async_trait;
use std::net::{Ipv4Addr, SocketAddr};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Duration, timeout};

use crate::core::error::{CliError, CliResult};
use crate::protocol::types::{JsonRpcRequest, JsonRpcResponse, error_codes};
use crate::transport::traits::{
    ConnectionState, ServerRequestHandler, ServerTransport, Transport, TransportConfig,
};

/// Socket address of the host listener for `port`
pub fn loopback(port: u16) -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, port))
}

/// TCP transport for RPC clients
#[derive(Debug)]
pub struct TcpClientTransport {
    reader: Option<BufReader<OwnedReadHalf>>,
    writer: Option<BufWriter<OwnedWriteHalf>>,
    peer: SocketAddr,
    config: TransportConfig,
    state: ConnectionState,
}

impl TcpClientTransport {
    /// Dial the host listener on 127.0.0.1:`port`
    pub async fn connect(port: u16) -> CliResult<Self> {
        Self::with_config(loopback(port), TransportConfig::default()).await
    }

    /// Dial `addr` with custom configuration
    pub async fn with_config(addr: SocketAddr, config: TransportConfig) -> CliResult<Self> {
        tracing::debug!("Connecting to RPC server at {}", addr);

        let stream = dial(addr, &config).await?;
        let (read_half, write_half) = stream.into_split();

        Ok(Self {
            reader: Some(BufReader::new(read_half)),
            writer: Some(BufWriter::new(write_half)),
            peer: addr,
            config,
            state: ConnectionState::Connected,
        })
    }

    async fn read_response(&mut self) -> CliResult<JsonRpcResponse> {
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| CliError::transport("Transport not connected"))?;

        let mut line = String::new();
        loop {
            line.clear();
            let read = reader
                .read_line(&mut line)
                .await
                .map_err(|e| CliError::transport(format!("Failed to read response: {e}")))?;
            if read == 0 {
                self.state = ConnectionState::Error("closed by peer".to_string());
                return Err(CliError::transport("Connection closed by peer"));
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if let Some(max) = self.config.max_message_size
                && trimmed.len() > max
            {
                return Err(CliError::protocol(format!(
                    "Response of {} bytes exceeds limit of {max}",
                    trimmed.len()
                )));
            }

            tracing::trace!("Received: {}", trimmed);
            return serde_json::from_str(trimmed).map_err(CliError::serialization);
        }
    }
}

/// Open a TCP connection, bounded by the configured connect timeout
pub(crate) async fn dial(addr: SocketAddr, config: &TransportConfig) -> CliResult<TcpStream> {
    let connecting = TcpStream::connect(addr);
    let result = match config.connect_timeout_ms {
        Some(ms) => timeout(Duration::from_millis(ms), connecting)
            .await
            .map_err(|_| CliError::Timeout(format!("Connecting to {addr} timed out")))?,
        None => connecting.await,
    };
    result.map_err(|e| CliError::connection(format!("Failed to connect to {addr}: {e}")))
}

#[async_trait]
impl Transport for TcpClientTransport {
    async fn send_request(&mut self, request: JsonRpcRequest) -> CliResult<JsonRpcResponse> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| CliError::transport("Transport not connected"))?;

        let request_line = serde_json::to_string(&request).map_err(CliError::serialization)?;

        tracing::trace!("Sending: {}", request_line);

        writer
            .write_all(request_line.as_bytes())
            .await
            .map_err(|e| CliError::transport(format!("Failed to write request: {e}")))?;
        writer
            .write_all(b"\n")
            .await
            .map_err(|e| CliError::transport(format!("Failed to write newline: {e}")))?;
        writer
            .flush()
            .await
            .map_err(|e| CliError::transport(format!("Failed to flush: {e}")))?;

        let response = match self.config.read_timeout_ms {
            Some(ms) => timeout(Duration::from_millis(ms), self.read_response())
                .await
                .map_err(|_| CliError::Timeout("Request timeout".to_string()))??,
            None => self.read_response().await?,
        };

        if response.id != request.id {
            return Err(CliError::protocol(format!(
                "Response id {} does not match request id {}",
                response.id, request.id
            )));
        }

        Ok(response)
    }

    async fn close(&mut self) -> CliResult<()> {
        tracing::debug!("Closing TCP transport to {}", self.peer);

        self.state = ConnectionState::Closing;
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.shutdown().await {
                tracing::debug!("Shutdown of {} failed: {}", self.peer, e);
            }
        }
        self.reader = None;
        self.state = ConnectionState::Disconnected;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        matches!(self.state, ConnectionState::Connected)
    }

    fn connection_info(&self) -> String {
        format!("TCP transport to {} (state: {:?})", self.peer, self.state)
    }
}

/// TCP transport for the host RPC server
///
/// Binds an ephemeral loopback port. Any number of connections may be opened
/// during the server's lifetime; each is served on its own task, with its
/// requests answered strictly in order.
pub struct TcpServerTransport {
    bind_addr: SocketAddr,
    local_addr: Option<SocketAddr>,
    config: TransportConfig,
    request_handler: Option<ServerRequestHandler>,
    shutdown: Option<oneshot::Sender<()>>,
    accept_task: Option<JoinHandle<()>>,
}

impl TcpServerTransport {
    /// Create a server that binds 127.0.0.1 on an ephemeral port
    pub fn new() -> Self {
        Self::with_config(loopback(0), TransportConfig::default())
    }

    /// Create a server with a custom bind address and configuration
    pub fn with_config(bind_addr: SocketAddr, config: TransportConfig) -> Self {
        Self {
            bind_addr,
            local_addr: None,
            config,
            request_handler: None,
            shutdown: None,
            accept_task: None,
        }
    }

    /// Address the listener is bound to, once started
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    async fn accept_loop(
        listener: TcpListener,
        handler: ServerRequestHandler,
        config: TransportConfig,
        mut shutdown: oneshot::Receiver<()>,
    ) {
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::debug!("RPC server shutting down");
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        tracing::debug!("Accepted RPC connection from {}", peer);
                        connections.spawn(Self::serve_connection(
                            stream,
                            handler.clone(),
                            config.clone(),
                        ));
                    }
                    Err(e) => {
                        tracing::warn!("Failed to accept RPC connection: {}", e);
                    }
                },
                Some(finished) = connections.join_next(), if !connections.is_empty() => {
                    if let Err(e) = finished {
                        tracing::warn!("RPC connection task failed: {}", e);
                    }
                }
            }
        }

        connections.shutdown().await;
    }

    async fn serve_connection(
        stream: TcpStream,
        handler: ServerRequestHandler,
        config: TransportConfig,
    ) {
        let (read_half, write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);
        let mut writer = BufWriter::new(write_half);

        let mut line = String::new();
        loop {
            line.clear();

            match reader.read_line(&mut line).await {
                Ok(0) => {
                    tracing::trace!("RPC connection closed by client");
                    break;
                }
                Ok(_) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    tracing::trace!("Received: {}", trimmed);

                    let response = if config
                        .max_message_size
                        .is_some_and(|max| trimmed.len() > max)
                    {
                        JsonRpcResponse::error(
                            serde_json::Value::Null,
                            error_codes::INVALID_REQUEST,
                            "Request exceeds maximum message size",
                        )
                    } else {
                        match serde_json::from_str::<JsonRpcRequest>(trimmed) {
                            Ok(request) => {
                                let id = request.id.clone();
                                match handler(request).await {
                                    Ok(response) => response,
                                    Err(error) => JsonRpcResponse::from_error(id, &error),
                                }
                            }
                            Err(e) => JsonRpcResponse::error(
                                serde_json::Value::Null,
                                error_codes::PARSE_ERROR,
                                format!("Parse error: {e}"),
                            ),
                        }
                    };

                    if let Err(e) = Self::write_response(&mut writer, &response).await {
                        tracing::warn!("Failed to write RPC response: {}", e);
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!("Error reading RPC request: {}", e);
                    break;
                }
            }
        }
    }

    async fn write_response(
        writer: &mut BufWriter<OwnedWriteHalf>,
        response: &JsonRpcResponse,
    ) -> CliResult<()> {
        let response_line = serde_json::to_string(response).map_err(CliError::serialization)?;

        tracing::trace!("Sending: {}", response_line);

        writer.write_all(response_line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        Ok(())
    }
}

impl Default for TcpServerTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServerTransport for TcpServerTransport {
    async fn start(&mut self) -> CliResult<()> {
        if self.accept_task.is_some() {
            return Err(CliError::transport("Server already started"));
        }

        let handler = self
            .request_handler
            .clone()
            .ok_or_else(|| CliError::transport("No request handler installed"))?;

        let listener = TcpListener::bind(self.bind_addr)
            .await
            .map_err(|e| CliError::transport(format!("Failed to bind {}: {e}", self.bind_addr)))?;
        let local_addr = listener.local_addr()?;

        tracing::debug!("RPC server listening on {}", local_addr);

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let config = self.config.clone();
        self.accept_task = Some(tokio::spawn(Self::accept_loop(
            listener,
            handler,
            config,
            shutdown_rx,
        )));
        self.shutdown = Some(shutdown_tx);
        self.local_addr = Some(local_addr);
        Ok(())
    }

    fn set_request_handler(&mut self, handler: ServerRequestHandler) {
        self.request_handler = Some(handler);
    }

    async fn stop(&mut self) -> CliResult<()> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.accept_task.take() {
            task.await
                .map_err(|e| CliError::internal(format!("RPC server task failed: {e}")))?;
        }
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.accept_task.is_some()
    }

    fn server_info(&self) -> String {
        match self.local_addr {
            Some(addr) => format!("TCP server on {addr} (running: {})", self.is_running()),
            None => "TCP server (not started)".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::traits::HandlerFuture;
    use serde_json::json;
    use std::sync::Arc;

    fn echo_handler() -> ServerRequestHandler {
        Arc::new(|request: JsonRpcRequest| {
            let response: HandlerFuture = Box::pin(async move {
                if request.method == "echo" {
                    JsonRpcResponse::success(request.id, request.params).map_err(Into::into)
                } else {
                    Err(CliError::MethodNotFound(request.method))
                }
            });
            response
        })
    }

    async fn started_server() -> TcpServerTransport {
        let mut server = TcpServerTransport::new();
        server.set_request_handler(echo_handler());
        server.start().await.unwrap();
        server
    }

    #[tokio::test]
    async fn test_request_roundtrip() {
        let mut server = started_server().await;
        let port = server.local_addr().unwrap().port();
        assert_ne!(port, 0);

        let mut client = TcpClientTransport::connect(port).await.unwrap();
        let request = JsonRpcRequest::new(json!(1), "echo", Some(json!(["a", "b"]))).unwrap();
        let response = client.send_request(request).await.unwrap();
        assert_eq!(response.result, Some(json!(["a", "b"])));

        client.close().await.unwrap();
        assert!(!client.is_connected());
        server.stop().await.unwrap();
        assert!(!server.is_running());
    }

    #[tokio::test]
    async fn test_sequential_connections_and_ordered_requests() {
        let mut server = started_server().await;
        let port = server.local_addr().unwrap().port();

        for round in 0..3 {
            let mut client = TcpClientTransport::connect(port).await.unwrap();
            for id in 0..3 {
                let request =
                    JsonRpcRequest::new(json!(id), "echo", Some(json!(round * 10 + id))).unwrap();
                let response = client.send_request(request).await.unwrap();
                assert_eq!(response.id, json!(id));
                assert_eq!(response.result, Some(json!(round * 10 + id)));
            }
        }

        server.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_method_yields_error_code() {
        let mut server = started_server().await;
        let port = server.local_addr().unwrap().port();

        let mut client = TcpClientTransport::connect(port).await.unwrap();
        let request = JsonRpcRequest::new(json!(5), "nope", None::<()>).unwrap();
        let response = client.send_request(request).await.unwrap();
        assert_eq!(
            response.error.map(|e| e.code),
            Some(error_codes::METHOD_NOT_FOUND)
        );

        server.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_garbage_line_yields_parse_error() {
        let mut server = started_server().await;
        let port = server.local_addr().unwrap().port();

        let mut stream = TcpStream::connect(loopback(port)).await.unwrap();
        stream.write_all(b"{not json\n").await.unwrap();
        let mut reader = BufReader::new(stream);
        let mut line = String::new();
        reader.read_line(&mut line).await.unwrap();

        let response: JsonRpcResponse = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(
            response.error.map(|e| e.code),
            Some(error_codes::PARSE_ERROR)
        );

        server.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_oversized_response_is_rejected() {
        let mut server = started_server().await;
        let addr = server.local_addr().unwrap();

        let config = TransportConfig {
            max_message_size: Some(64),
            ..Default::default()
        };
        let mut client = TcpClientTransport::with_config(addr, config).await.unwrap();
        let request = JsonRpcRequest::new(json!(1), "echo", Some(json!("x".repeat(200)))).unwrap();

        assert!(matches!(
            client.send_request(request).await,
            Err(CliError::Protocol(_))
        ));

        server.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_start_without_handler_fails() {
        let mut server = TcpServerTransport::new();
        assert!(matches!(server.start().await, Err(CliError::Transport(_))));
        assert_eq!(server.server_info(), "TCP server (not started)");
    }

    #[tokio::test]
    async fn test_connect_to_closed_port_is_connection_error() {
        let listener = TcpListener::bind(loopback(0)).await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = TcpClientTransport::connect(port).await;
        assert!(matches!(result, Err(CliError::Connection(_))));
    }
}
