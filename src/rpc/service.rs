// ! Host-side CliRpcCmd service
// !
// ! Module routes each incoming request to the matching operation: metadata
// ! reporting, terminal output control, core command execution and output
// ! draining.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use crate::core::error::{CliError, CliResult};
use crate::core::logging::ErrorContext;
use crate::protocol::messages::{PluginMetadata, RPC_PROTOCOL_VERSION};
use crate::protocol::methods;
use crate::protocol::types::{JsonRpcRequest, JsonRpcResponse};
use crate::rpc::capture::OutputCapture;

/// Executes a built-in command on behalf of a plugin
#[async_trait]
pub trait CoreCommandRunner: Send + Sync {
    /// Run `args` as if the user had typed them after the executable name
    async fn run_core_command(&self, args: Vec<String>) -> CliResult<()>;
}

/// The CliRpcCmd service served to one plugin process
pub struct CliRpcService {
    capture: Arc<OutputCapture>,
    runner: Option<Arc<dyn CoreCommandRunner>>,
    metadata: Mutex<Option<PluginMetadata>>,
}

impl CliRpcService {
    /// Create a service; without a runner `CallCoreCommand` is refused
    pub fn new(capture: Arc<OutputCapture>, runner: Option<Arc<dyn CoreCommandRunner>>) -> Self {
        Self {
            capture,
            runner,
            metadata: Mutex::new(None),
        }
    }

    /// Whether this service can execute core commands
    pub fn can_run_core_commands(&self) -> bool {
        self.runner.is_some()
    }

    pub fn capture(&self) -> &Arc<OutputCapture> {
        &self.capture
    }

    /// Metadata reported by the plugin, if any; leaves `None` behind
    pub fn take_metadata(&self) -> Option<PluginMetadata> {
        self.metadata
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }

    /// Handle one JSON-RPC request
    pub async fn handle_request(&self, request: JsonRpcRequest) -> CliResult<JsonRpcResponse> {
        debug!("Handling RPC request: {}", request.method);

        let id = request.id;
        match request.method.as_str() {
            methods::SET_PLUGIN_METADATA => {
                let metadata: PluginMetadata = parse_params(request.params)?;
                JsonRpcResponse::success(id, self.set_plugin_metadata(metadata)).map_err(Into::into)
            }
            methods::DISABLE_TERMINAL_OUTPUT => {
                let silent: bool = parse_params(request.params)?;
                JsonRpcResponse::success(id, self.disable_terminal_output(silent))
                    .map_err(Into::into)
            }
            methods::CALL_CORE_COMMAND => {
                let args: Vec<String> = parse_params(request.params)?;
                let success = self.call_core_command(args).await?;
                JsonRpcResponse::success(id, success).map_err(Into::into)
            }
            methods::GET_OUTPUT_AND_RESET => {
                let success: bool = parse_params(request.params)?;
                JsonRpcResponse::success(id, self.get_output_and_reset(success))
                    .map_err(Into::into)
            }
            methods::PROTOCOL_VERSION => {
                JsonRpcResponse::success(id, RPC_PROTOCOL_VERSION).map_err(Into::into)
            }
            _ => Err(CliError::MethodNotFound(format!(
                "Unknown method: {}",
                request.method
            ))),
        }
    }

    fn set_plugin_metadata(&self, metadata: PluginMetadata) -> bool {
        info!(
            "Plugin reported metadata: {} ({} commands)",
            metadata.name,
            metadata.commands.len()
        );
        *self
            .metadata
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(metadata);
        true
    }

    fn disable_terminal_output(&self, silent: bool) -> bool {
        self.capture.set_silent(silent);
        true
    }

    async fn call_core_command(&self, args: Vec<String>) -> CliResult<bool> {
        let runner = self.runner.as_ref().ok_or_else(|| {
            CliError::internal("Core commands are not available during this session")
        })?;

        info!("Plugin invoked core command: {:?}", args);
        match runner.run_core_command(args).await {
            Ok(()) => Ok(true),
            Err(error) => {
                error.log_with_context(
                    &ErrorContext::new("core_command").with_method(methods::CALL_CORE_COMMAND),
                );
                Ok(false)
            }
        }
    }

    fn get_output_and_reset(&self, success: bool) -> Vec<String> {
        let lines = self.capture.drain();
        if !success {
            debug!("Draining {} lines from a failed core command", lines.len());
        }
        lines
    }
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> CliResult<T> {
    let params = params.ok_or_else(|| CliError::InvalidParams("Missing params".to_string()))?;
    serde_json::from_value(params).map_err(|e| CliError::InvalidParams(e.to_string()))
}
