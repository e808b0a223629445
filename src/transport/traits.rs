// ! Transport layer traits and abstractions
// !
// ! Module defines the transport traits the host RPC server and the plugin
// ! side client are written against.

use crate::core::error::CliResult;
use crate::protocol::types::{JsonRpcRequest, JsonRpcResponse};
use async_trait::async_trait;

/// Transport trait for RPC clients
///
/// One outstanding request at a time: `send_request` writes the request and
/// blocks until the matching response arrives.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a JSON-RPC request and wait for a response
    ///
    /// # Arguments
    /// * `request` - The JSON-RPC request to send
    ///
    /// # Returns
    /// Result containing the JSON-RPC response or an error
    async fn send_request(&mut self, request: JsonRpcRequest) -> CliResult<JsonRpcResponse>;

    /// Close the transport connection
    async fn close(&mut self) -> CliResult<()>;

    /// Check if the transport is connected
    fn is_connected(&self) -> bool {
        true // Default implementation - assume connected
    }

    /// Get connection information for debugging
    fn connection_info(&self) -> String {
        "Unknown transport".to_string()
    }
}

/// Future returned by a server request handler
pub type HandlerFuture = std::pin::Pin<
    Box<dyn std::future::Future<Output = CliResult<JsonRpcResponse>> + Send + 'static>,
>;

/// Server request handler function type
pub type ServerRequestHandler =
    std::sync::Arc<dyn Fn(JsonRpcRequest) -> HandlerFuture + Send + Sync>;

/// Transport trait for RPC servers
///
/// Trait defines the interface for accepting connections and routing each
/// incoming request through the installed handler.
#[async_trait]
pub trait ServerTransport: Send + Sync {
    /// Start the server transport and begin listening for connections
    ///
    /// Returns once the listener is bound; connections are served in the
    /// background until `stop` is called.
    async fn start(&mut self) -> CliResult<()>;

    /// Set the request handler that will process incoming requests
    ///
    /// # Arguments
    /// * `handler` - The request handler function
    fn set_request_handler(&mut self, handler: ServerRequestHandler);

    /// Stop the server transport
    async fn stop(&mut self) -> CliResult<()>;

    /// Check if the server is running
    fn is_running(&self) -> bool {
        true // Default implementation - assume running
    }

    /// Get server information for debugging
    fn server_info(&self) -> String {
        "Unknown server transport".to_string()
    }
}

/// Transport configuration options
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Timeout for a single dial in milliseconds
    pub connect_timeout_ms: Option<u64>,
    /// Read timeout in milliseconds; `None` waits indefinitely
    pub read_timeout_ms: Option<u64>,
    /// Maximum message size in bytes
    pub max_message_size: Option<usize>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: Some(5_000),          // 5 seconds
            read_timeout_ms: None,                    // calls block until answered
            max_message_size: Some(16 * 1024 * 1024), // 16 MB
        }
    }
}

/// Connection state for transports
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionState {
    /// Transport is disconnected
    Disconnected,
    /// Transport is connected and ready
    Connected,
    /// Transport is closing
    Closing,
    /// Transport has encountered an error
    Error(String),
}
