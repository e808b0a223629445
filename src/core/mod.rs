//! Core building blocks shared by the host and the plugin shim
//!
//! Error handling, structured logging and the retry policy used by the
//! handshake.

pub mod error;
pub mod logging;
pub mod retry;

pub use error::{CliError, CliResult};
pub use logging::{ErrorContext, ErrorLogger, init_logging};
pub use retry::{RetryConfig, RetryPolicy};
