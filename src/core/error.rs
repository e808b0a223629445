// ! Error types for the CLI and its plugin subsystem
// !
// ! Module defines every error that can surface from the handshake, the RPC
// ! channel, the installer pipeline and the registry. Errors travel as values up
// ! to `App::run`, which is the only place they are printed.

use thiserror::Error;

use crate::installer::conflict::Conflict;

/// The main error type of the crate
#[derive(Error, Debug, Clone)]
pub enum CliError {
    /// Transport-related errors (socket I/O, closed connections)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Protocol-level errors (invalid messages, unexpected responses)
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Method not found (JSON-RPC error)
    #[error("Method not found: {0}")]
    MethodNotFound(String),

    /// Invalid parameters (JSON-RPC error)
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Dial errors against the host RPC listener
    #[error("Connection error: {0}")]
    Connection(String),

    /// The plugin could not reach the host within the handshake budget
    #[error("Handshake failed: {0}")]
    Handshake(String),

    /// Malformed command line or startup arguments
    #[error("Incorrect Usage: {0}")]
    Usage(String),

    /// I/O errors from the standard library
    #[error("I/O error: {0}")]
    Io(String),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(String),

    /// HTTP errors from the download fallback
    #[error("HTTP error: {0}")]
    Http(String),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// A plugin command or alias collides with an existing name
    #[error("{0}")]
    Conflict(Conflict),

    /// A plugin with the reported name is already installed
    #[error("Plugin name {0} is already taken")]
    NameTaken(String),

    /// The install destination is occupied
    #[error("The file {0} already exists under the plugin directory.")]
    DestinationExists(String),

    /// The plugin binary was found neither locally nor remotely
    #[error("{0}")]
    Resolution(String),

    /// The plugin process could not be started or did not report back
    #[error("Plugin launch error: {0}")]
    PluginLaunch(String),

    /// The plugin process exited unsuccessfully in run mode
    #[error("Plugin failed: {0}")]
    PluginFailed(String),

    /// The host reported a failed core command; carries its captured output
    #[error("Error executing cli core command")]
    CoreCommandFailed { output: Vec<String> },

    /// Registry persistence errors
    #[error("Plugin registry error: {0}")]
    Registry(String),

    /// Internal errors that shouldn't normally occur
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io(err.to_string())
    }
}

impl From<url::ParseError> for CliError {
    fn from(err: url::ParseError) -> Self {
        CliError::Url(err.to_string())
    }
}

impl From<reqwest::Error> for CliError {
    fn from(err: reqwest::Error) -> Self {
        CliError::Http(err.to_string())
    }
}

impl From<Conflict> for CliError {
    fn from(conflict: Conflict) -> Self {
        CliError::Conflict(conflict)
    }
}

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport(message.into())
    }

    /// Create a new protocol error
    pub fn protocol<S: Into<String>>(message: S) -> Self {
        Self::Protocol(message.into())
    }

    /// Create a new connection error
    pub fn connection<S: Into<String>>(message: S) -> Self {
        Self::Connection(message.into())
    }

    /// Create a new usage error
    pub fn usage<S: Into<String>>(message: S) -> Self {
        Self::Usage(message.into())
    }

    /// Create a new registry error
    pub fn registry<S: Into<String>>(message: S) -> Self {
        Self::Registry(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Create a new serialization error from serde_json::Error
    pub fn serialization(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }

    /// Check if this error is recoverable by retrying the same operation
    pub fn is_recoverable(&self) -> bool {
        match self {
            CliError::Connection(_) => true,
            CliError::Timeout(_) => true,
            CliError::Io(_) => true,
            CliError::Http(_) => true,
            CliError::Transport(_)
            | CliError::Protocol(_)
            | CliError::Serialization(_)
            | CliError::MethodNotFound(_)
            | CliError::InvalidParams(_)
            | CliError::Handshake(_)
            | CliError::Usage(_)
            | CliError::Url(_)
            | CliError::Conflict(_)
            | CliError::NameTaken(_)
            | CliError::DestinationExists(_)
            | CliError::Resolution(_)
            | CliError::PluginLaunch(_)
            | CliError::PluginFailed(_)
            | CliError::CoreCommandFailed { .. }
            | CliError::Registry(_)
            | CliError::Internal(_) => false,
        }
    }

    /// Get the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            CliError::Transport(_) => "transport",
            CliError::Protocol(_) => "protocol",
            CliError::Serialization(_) => "serialization",
            CliError::MethodNotFound(_) => "not_found",
            CliError::InvalidParams(_) => "validation",
            CliError::Connection(_) => "connection",
            CliError::Handshake(_) => "handshake",
            CliError::Usage(_) => "usage",
            CliError::Io(_) => "io",
            CliError::Url(_) => "validation",
            CliError::Http(_) => "http",
            CliError::Timeout(_) => "timeout",
            CliError::Conflict(_) => "conflict",
            CliError::NameTaken(_) => "collision",
            CliError::DestinationExists(_) => "collision",
            CliError::Resolution(_) => "resolution",
            CliError::PluginLaunch(_) => "plugin",
            CliError::PluginFailed(_) => "plugin",
            CliError::CoreCommandFailed { .. } => "core_command",
            CliError::Registry(_) => "registry",
            CliError::Internal(_) => "internal",
        }
    }
}
