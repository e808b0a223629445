// ! Structured logging for the CLI
// !
// ! Module installs the tracing subscriber and provides structured error
// ! logging with categorization and operation context. Log output goes to
// ! stderr; stdout belongs to user-facing output.

use serde_json::{Value, json};
use std::collections::HashMap;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::core::error::CliError;

/// Environment variable holding the log filter directive
pub const LOG_ENV_VAR: &str = "CF_LOG";

/// Filter used when `CF_LOG` is unset or invalid
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// Install the global tracing subscriber.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(filter: &str) {
    let env_filter =
        EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorLogLevel {
    /// Errors that break the current operation
    Error,
    /// Recoverable or environmental issues
    Warning,
    /// User-facing rejections (conflicts, usage mistakes)
    Info,
}

impl From<&CliError> for ErrorLogLevel {
    fn from(error: &CliError) -> Self {
        match error {
            CliError::Internal(_)
            | CliError::Transport(_)
            | CliError::Protocol(_)
            | CliError::Serialization(_)
            | CliError::Handshake(_)
            | CliError::PluginLaunch(_)
            | CliError::Registry(_) => ErrorLogLevel::Error,

            CliError::Connection(_)
            | CliError::Timeout(_)
            | CliError::Io(_)
            | CliError::Http(_)
            | CliError::PluginFailed(_)
            | CliError::CoreCommandFailed { .. } => ErrorLogLevel::Warning,

            CliError::MethodNotFound(_)
            | CliError::InvalidParams(_)
            | CliError::Usage(_)
            | CliError::Url(_)
            | CliError::Conflict(_)
            | CliError::NameTaken(_)
            | CliError::DestinationExists(_)
            | CliError::Resolution(_) => ErrorLogLevel::Info,
        }
    }
}

/// Extended error context for logging
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// Operation being performed when error occurred
    pub operation: String,
    /// RPC method if applicable
    pub method: Option<String>,
    /// Plugin name if applicable
    pub plugin: Option<String>,
    /// Additional context data
    pub extra: HashMap<String, Value>,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            operation: "unknown".to_string(),
            method: None,
            plugin: None,
            extra: HashMap::new(),
        }
    }
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            ..Default::default()
        }
    }

    /// Set method name
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Set plugin name
    pub fn with_plugin(mut self, plugin: impl Into<String>) -> Self {
        self.plugin = Some(plugin.into());
        self
    }

    /// Add extra context data
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Structured error logger
pub struct ErrorLogger;

impl ErrorLogger {
    /// Log an error with full context
    pub fn log_error(error: &CliError, context: &ErrorContext) {
        let category = error.category();
        let recoverable = error.is_recoverable();

        let log_data = json!({
            "error_category": category,
            "error_recoverable": recoverable,
            "error_message": error.to_string(),
            "operation": context.operation,
            "method": context.method,
            "plugin": context.plugin,
            "extra_context": context.extra,
        });
        let log_data = serde_json::to_string(&log_data).unwrap_or_default();

        match ErrorLogLevel::from(error) {
            ErrorLogLevel::Error => {
                error!(
                    error_category = category,
                    error_recoverable = recoverable,
                    operation = context.operation.as_str(),
                    "CLI Error: {} - {}",
                    error,
                    log_data
                );
            }
            ErrorLogLevel::Warning => {
                warn!(
                    error_category = category,
                    error_recoverable = recoverable,
                    operation = context.operation.as_str(),
                    "CLI Warning: {} - {}",
                    error,
                    log_data
                );
            }
            ErrorLogLevel::Info => {
                info!(
                    error_category = category,
                    operation = context.operation.as_str(),
                    "CLI Info: {} - {}",
                    error,
                    log_data
                );
            }
        }
    }

    /// Log a retry attempt with context
    pub fn log_retry_attempt(
        error: &CliError,
        attempt: u32,
        max_attempts: u32,
        will_retry: bool,
        context: &ErrorContext,
    ) {
        if will_retry {
            warn!(
                error_category = error.category(),
                retry_attempt = attempt,
                max_attempts = max_attempts,
                operation = context.operation.as_str(),
                "Retry attempt {}/{}: {}",
                attempt,
                max_attempts,
                error
            );
        } else {
            error!(
                error_category = error.category(),
                retry_attempt = attempt,
                max_attempts = max_attempts,
                operation = context.operation.as_str(),
                "Retry failed (final): {}",
                error
            );
        }
    }
}

impl CliError {
    /// Log this error with structured context
    pub fn log_with_context(&self, context: &ErrorContext) {
        ErrorLogger::log_error(self, context);
    }
}
