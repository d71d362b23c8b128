//! # steam-sweep
//!
//! Sweeps a contiguous range of Steam account ids and sorts the accounts it finds into
//! fixed categories using public Web API data.
//!
//! ## How a scan works
//!
//! - [`config::ScanRange`] yields `STEAM_0:a:s` ids in `(sequence, auth_server)` order
//! - [`scanner::Scanner`] hands them to a pool of workers
//! - each worker runs a [`classify::Classifier`] pipeline, which fetches only the
//!   payloads the enabled rules need through a [`api::SteamApi`]
//! - matches are appended to one text file per category by a [`sink::ResultSink`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use steam_sweep::{Config, FileSink, Scanner, SteamWebClient, run_until_signal};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(Config::load("Settings.json")?);
//!     let api = Arc::new(SteamWebClient::from_config(&config)?);
//!     let sink = Arc::new(FileSink::new(&config.output.output_dir).await?);
//!
//!     let scanner = Scanner::new(config, api, sink);
//!     let report = run_until_signal(&scanner).await?;
//!     println!("matched {} accounts", report.matched);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Steam Web API client
pub mod api;
/// Classification rules and pipeline
pub mod classify;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Retry logic with backoff
pub mod retry;
/// Scan driver and worker pool
pub mod scanner;
/// Match record output
pub mod sink;
/// Steam id codec
pub mod steam_id;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use api::{Endpoint, FetchOutcome, RateLimitGate, SteamApi, SteamWebClient};
pub use classify::{Category, Classifier, MatchMode, MatchRecord, PipelineOutcome, Rule, RuleConfig};
pub use config::{Config, DEFAULT_CONFIG_FILE, ScanRange};
pub use error::{Error, Result};
pub use scanner::{ScanReport, Scanner};
pub use sink::{FileSink, ResultSink};
pub use steam_id::{AccountId, AuthServer, SteamId64};

/// Run a scan, cancelling it when a termination signal arrives.
///
/// Returns the report of the (possibly partial) scan once every worker has stopped.
///
/// - **Unix:** SIGTERM or SIGINT; if only one handler can be registered the other is
///   not watched, and if neither can, Ctrl+C is.
/// - **Windows/other:** Ctrl+C via `tokio::signal::ctrl_c()`.
pub async fn run_until_signal(scanner: &Scanner) -> Result<ScanReport> {
    run_until(scanner, stop_signal()).await
}

/// Run a scan, cancelling it once `stop` resolves
///
/// `stop` yields a short label for the log line, such as the signal name. A scan that
/// finishes first is returned as is and `stop` is dropped.
pub async fn run_until<F>(scanner: &Scanner, stop: F) -> Result<ScanReport>
where
    F: Future<Output = &'static str> + Send + 'static,
{
    let cancel_token = scanner.cancel_token();
    let watcher = tokio::spawn(async move {
        let reason = stop.await;
        tracing::info!(reason, "Stop requested, abandoning in-flight accounts");
        cancel_token.cancel();
    });

    let report = scanner.run().await;
    watcher.abort();
    report
}

#[cfg(unix)]
async fn stop_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(mut sigterm), Ok(mut sigint)) => tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv() => "SIGINT",
        },
        (Ok(mut sigterm), Err(e)) => {
            tracing::warn!(error = %e, "No SIGINT handler, the scan stops on SIGTERM only");
            sigterm.recv().await;
            "SIGTERM"
        }
        (Err(e), Ok(mut sigint)) => {
            tracing::warn!(error = %e, "No SIGTERM handler, the scan stops on SIGINT only");
            sigint.recv().await;
            "SIGINT"
        }
        (Err(e), Err(_)) => {
            tracing::warn!(error = %e, "No signal handlers, the scan stops on Ctrl+C only");
            ctrl_c().await
        }
    }
}

#[cfg(not(unix))]
async fn stop_signal() -> &'static str {
    ctrl_c().await
}

async fn ctrl_c() -> &'static str {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Without a listener nothing can stop the scan early; let it run to the end
        tracing::error!(error = %e, "Cannot listen for Ctrl+C, the scan will run to completion");
        std::future::pending::<()>().await;
    }
    "Ctrl+C"
}
