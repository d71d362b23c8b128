//! Bounded retry with backoff
//!
//! Remote calls that time out or hit a transport error are retried up to
//! [`RetryConfig::max_attempts`] times. Non-retryable errors return immediately.
//! Exhaustion hands the last error back together with the number of attempts made,
//! so callers can surface it as [`Error::FetchFailed`](crate::error::Error::FetchFailed).
//!
//! # Example
//!
//! ```no_run
//! use steam_sweep::retry::{IsRetryable, retry_with_backoff};
//! use steam_sweep::config::RetryConfig;
//!
//! #[derive(Debug)]
//! enum MyError {
//!     Transient,
//!     Permanent,
//! }
//!
//! impl std::fmt::Display for MyError {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "{self:?}")
//!     }
//! }
//!
//! impl IsRetryable for MyError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, MyError::Transient)
//!     }
//! }
//!
//! # async fn example() {
//! let config = RetryConfig::default();
//! let result = retry_with_backoff(&config, || async { Ok::<_, MyError>(()) }).await;
//! assert!(result.is_ok());
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::Error;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (timeouts, connection resets, 5xx, garbled bodies) return `true`.
/// Permanent failures (rate limits, bad config, cancellation) return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            // Timeouts, refused connections and truncated bodies all land here
            Error::Network(_) => true,
            Error::HttpStatus { status, .. } => *status != 429,
            // An HTML error page behind a 200 decodes as garbage; the next try usually works
            Error::Decode { .. } => true,
            Error::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::NotConnected
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::Interrupted
            ),
            Error::FetchFailed { .. } => false,
            Error::SinkWriteFailed { .. } => false,
            Error::Config { .. } => false,
            Error::InvalidIdentifier(_) => false,
            Error::Serialization(_) => false,
        }
    }
}

/// Terminal failure from [`retry_with_backoff`]
#[derive(Debug)]
pub struct RetryFailure<E> {
    /// The last error the operation returned
    pub error: E,
    /// Total attempts made, including the first
    pub attempts: u32,
}

impl<E> RetryFailure<E> {
    /// Whether the loop gave up because retries ran out (vs. a permanent error)
    pub fn exhausted(&self) -> bool
    where
        E: IsRetryable,
    {
        self.error.is_retryable()
    }
}

/// Execute an async operation, retrying transient failures with backoff
///
/// # Arguments
///
/// * `config` - Retry configuration (max attempts, delays, backoff multiplier, jitter)
/// * `operation` - Async closure that returns `Result<T, E>` where `E` implements [`IsRetryable`]
///
/// # Returns
///
/// The successful result, or the last error plus the attempt count once a permanent
/// error occurs or `config.max_attempts` retries have been used.
pub async fn retry_with_backoff<F, Fut, T, E>(
    config: &RetryConfig,
    mut operation: F,
) -> Result<T, RetryFailure<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let mut attempt = 0;
    let mut delay = config.initial_delay;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    tracing::debug!(attempts = attempt + 1, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if e.is_retryable() && attempt < config.max_attempts => {
                attempt += 1;

                tracing::warn!(
                    error = %e,
                    attempt = attempt,
                    max_attempts = config.max_attempts,
                    delay_ms = delay.as_millis(),
                    "Request failed, retrying"
                );

                let jittered_delay = if config.jitter {
                    add_jitter(delay)
                } else {
                    delay
                };

                tokio::time::sleep(jittered_delay).await;

                let next_delay =
                    Duration::from_secs_f64(delay.as_secs_f64() * config.backoff_multiplier);
                delay = next_delay.min(config.max_delay);
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::warn!(
                        error = %e,
                        attempts = attempt + 1,
                        "Request failed after all retry attempts exhausted"
                    );
                }
                return Err(RetryFailure {
                    error: e,
                    attempts: attempt + 1,
                });
            }
        }
    }
}

/// Add random jitter to a delay to prevent thundering herd
///
/// The actual delay will be between `delay` and `2 * delay`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    let jittered_secs = delay.as_secs_f64() * (1.0 + jitter_factor);
    Duration::from_secs_f64(jittered_secs)
}
