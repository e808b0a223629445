// ! Retry logic for host reachability checks
// !
// ! Module provides a small retry policy driven by error recoverability. The
// ! plugin handshake uses the fixed-delay preset: five attempts, 200ms apart.

use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error};

use crate::core::error::{CliError, CliResult};
use crate::core::logging::{ErrorContext, ErrorLogger};

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt in milliseconds
    pub initial_delay_ms: u64,
    /// Maximum retry delay in milliseconds
    pub max_delay_ms: u64,
    /// Exponential backoff multiplier (1.0 keeps the delay fixed)
    pub backoff_multiplier: f64,
    /// Whether to stop early on non-recoverable errors
    pub respect_recoverability: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1000,
            max_delay_ms: 30000,
            backoff_multiplier: 2.0,
            respect_recoverability: true,
        }
    }
}

impl RetryConfig {
    /// Plugin-to-host handshake: 5 dials, 200ms apart
    pub fn handshake() -> Self {
        Self {
            max_attempts: 5,
            initial_delay_ms: 200,
            max_delay_ms: 200,
            backoff_multiplier: 1.0,
            respect_recoverability: true,
        }
    }

    /// Delay applied after the given (1-based) failed attempt
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let base_delay =
            self.initial_delay_ms as f64 * self.backoff_multiplier.powi(attempt as i32 - 1);
        let capped_delay = base_delay.min(self.max_delay_ms as f64);
        Duration::from_millis(capped_delay as u64)
    }
}

/// Retry policy with error-based decisions
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    /// Create a new retry policy
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Policy configuration
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Execute an operation, retrying recoverable failures
    pub async fn execute<F, Fut, T>(&self, mut operation: F, context: ErrorContext) -> CliResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = CliResult<T>>,
    {
        let start_time = Instant::now();
        let mut last_error = None;

        for attempt in 1..=self.config.max_attempts {
            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(
                            "Operation '{}' succeeded after {} attempts",
                            context.operation, attempt
                        );
                    }
                    return Ok(value);
                }
                Err(error) => {
                    let should_retry = self.should_retry(&error, attempt);
                    ErrorLogger::log_retry_attempt(
                        &error,
                        attempt,
                        self.config.max_attempts,
                        should_retry,
                        &context,
                    );

                    if !should_retry {
                        return Err(error);
                    }

                    last_error = Some(error);
                    sleep(self.config.delay_after(attempt)).await;
                }
            }
        }

        error!(
            "Operation '{}' failed after {} attempts in {:?}",
            context.operation,
            self.config.max_attempts,
            start_time.elapsed()
        );

        Err(last_error
            .unwrap_or_else(|| CliError::internal("Retry loop ran with zero attempts")))
    }

    fn should_retry(&self, error: &CliError, attempt: u32) -> bool {
        if attempt >= self.config.max_attempts {
            return false;
        }

        if self.config.respect_recoverability && !error.is_recoverable() {
            debug!(
                "Not retrying non-recoverable error: {} (category: {})",
                error,
                error.category()
            );
            return false;
        }

        true
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}
