//! Error types for steam-sweep
//!
//! Every fallible operation in the crate returns [`Result`]. Per-account failures
//! (rate limits, exhausted retries, sink write errors) are carried as variants here
//! but never terminate a scan; the scanner turns them into log lines and counters.

use thiserror::Error;

use crate::api::Endpoint;
use crate::classify::Category;

/// Result type alias for steam-sweep operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for steam-sweep
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "worker_count")
        key: Option<String>,
    },

    /// Malformed account identifier (negative sequence, bad text form, out-of-range id64)
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Network error (connect failure, timeout, body read failure)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Remote endpoint answered with a non-success status other than 429
    #[error("{endpoint} returned HTTP {status}")]
    HttpStatus {
        /// Endpoint that was called
        endpoint: Endpoint,
        /// Status code returned
        status: u16,
    },

    /// Response body did not match the endpoint's expected shape
    #[error("failed to decode {endpoint} response: {source}")]
    Decode {
        /// Endpoint that was called
        endpoint: Endpoint,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Retries were exhausted on timeouts or transport errors
    #[error("{endpoint} failed after {attempts} attempts: {reason}")]
    FetchFailed {
        /// Endpoint that was called
        endpoint: Endpoint,
        /// Total attempts made, including the first
        attempts: u32,
        /// Display form of the last error seen
        reason: String,
    },

    /// Appending a match to its category file failed after bounded retries
    #[error("failed to write {category} record: {reason}")]
    SinkWriteFailed {
        /// Category whose file could not be written
        category: Category,
        /// Display form of the last I/O error
        reason: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a [`Error::Config`] tied to a specific key
    pub(crate) fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }
}
