//! Scan driver.
//!
//! A fixed pool of workers pulls account ids from one shared, ordered queue and runs the
//! classification pipeline for each. Workers share the API client (and with it the
//! rate-limit gate), the result sink and a cancellation token; each pipeline's fetch
//! bundle stays private to it.

mod report;


pub use report::ScanReport;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::api::SteamApi;
use crate::classify::{Classifier, PipelineOutcome};
use crate::config::Config;
use crate::error::Result;
use crate::sink::ResultSink;
use crate::steam_id::AccountId;
use report::ScanCounters;

/// Shared, ordered source of account ids
type AccountQueue = Arc<Mutex<Box<dyn Iterator<Item = AccountId> + Send>>>;

/// Runs a full scan over the configured range
pub struct Scanner {
    config: Arc<Config>,
    api: Arc<dyn SteamApi>,
    sink: Arc<dyn ResultSink>,
    classifier: Arc<Classifier>,
    cancel_token: CancellationToken,
}

impl Scanner {
    /// Create a scanner; the classifier is built from the config's rule switches
    pub fn new(config: Arc<Config>, api: Arc<dyn SteamApi>, sink: Arc<dyn ResultSink>) -> Self {
        let classifier = Arc::new(Classifier::new(&config.rules, config.match_mode));
        Self {
            config,
            api,
            sink,
            classifier,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Token that stops the scan when cancelled
    ///
    /// No further accounts are dequeued, pacing sleeps end at once, and in-flight
    /// pipelines are dropped at their next await point. A record whose write has
    /// started is always written in full.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Why this scan would do nothing, if it would
    fn preflight(&self) -> Option<&'static str> {
        if !self.config.rules.any_enabled() {
            Some("no rules enabled")
        } else if self.config.scan.range().is_degenerate() {
            Some("scan range is empty (start_sequence must be below end_sequence)")
        } else if !self.config.has_api_key() {
            Some("no API key configured")
        } else {
            None
        }
    }

    /// Scan every account in the range, or until cancelled
    ///
    /// Per-account problems never fail the scan; they are logged and counted in the
    /// returned report.
    pub async fn run(&self) -> Result<ScanReport> {
        if let Some(reason) = self.preflight() {
            tracing::info!(reason, "Nothing to scan");
            return Ok(ScanReport::default());
        }

        let scan = &self.config.scan;
        let range = scan.range();
        tracing::info!(
            start_sequence = range.start_sequence,
            end_sequence = range.end_sequence,
            accounts = range.len(),
            workers = scan.worker_count,
            rules = ?self.classifier.rules(),
            match_mode = ?self.classifier.mode(),
            endpoints = ?self.classifier.plan(),
            "Starting scan"
        );

        let queue: AccountQueue = Arc::new(Mutex::new(Box::new(range.iter())));
        let counters = Arc::new(ScanCounters::default());

        let mut workers = JoinSet::new();
        for worker_id in 0..scan.worker_count {
            let worker = Worker {
                worker_id,
                queue: Arc::clone(&queue),
                api: Arc::clone(&self.api),
                sink: Arc::clone(&self.sink),
                classifier: Arc::clone(&self.classifier),
                counters: Arc::clone(&counters),
                cancel_token: self.cancel_token.clone(),
                pacing_delay: scan.pacing_delay,
            };
            workers.spawn(worker.run());
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                if e.is_panic() {
                    std::panic::resume_unwind(e.into_panic());
                }
                tracing::error!(error = %e, "Scan worker was aborted");
            }
        }

        let report = counters.snapshot(self.cancel_token.is_cancelled());
        tracing::info!(
            scanned = report.scanned,
            invalid = report.invalid,
            matched = report.matched,
            rate_limited = report.rate_limited,
            failed = report.failed,
            sink_failures = report.sink_failures,
            cancelled = report.cancelled,
            "Scan finished"
        );
        Ok(report)
    }
}

/// One worker's share of the scan
struct Worker {
    worker_id: usize,
    queue: AccountQueue,
    api: Arc<dyn SteamApi>,
    sink: Arc<dyn ResultSink>,
    classifier: Arc<Classifier>,
    counters: Arc<ScanCounters>,
    cancel_token: CancellationToken,
    pacing_delay: Duration,
}

impl Worker {
    async fn run(self) {
        tracing::debug!(worker_id = self.worker_id, "Worker started");

        while !self.cancel_token.is_cancelled() {
            let next = {
                let mut queue = self.queue.lock().await;
                queue.next()
            };
            let Some(account) = next else {
                break;
            };

            let outcome = tokio::select! {
                biased;
                _ = self.cancel_token.cancelled() => {
                    tracing::debug!(
                        worker_id = self.worker_id,
                        steam_id = %account,
                        "Abandoning in-flight account"
                    );
                    break;
                }
                outcome = self.classifier.classify(self.api.as_ref(), account) => outcome,
            };

            self.counters.scanned();
            self.handle(account, outcome).await;

            tokio::select! {
                _ = self.cancel_token.cancelled() => break,
                _ = tokio::time::sleep(self.pacing_delay) => {}
            }
        }

        tracing::debug!(worker_id = self.worker_id, "Worker stopped");
    }

    /// Record matches and count the outcome
    async fn handle(&self, account: AccountId, outcome: PipelineOutcome) {
        match outcome {
            PipelineOutcome::InvalidAccount => self.counters.invalid(),
            PipelineOutcome::NoMatch => {}
            PipelineOutcome::RateLimited(_) => self.counters.rate_limited(),
            PipelineOutcome::FetchFailed(_) => self.counters.failed(),
            PipelineOutcome::Matched(records) => {
                for record in &records {
                    match self.sink.record(record).await {
                        Ok(()) => self.counters.matched(),
                        Err(e) => {
                            tracing::warn!(
                                steam_id = %account,
                                category = %record.category,
                                error = %e,
                                "Could not write match record"
                            );
                            self.counters.sink_failure();
                        }
                    }
                }
            }
        }
    }
}
