//! Scan counters and the end-of-run report.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Totals for one scan
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    /// Accounts whose pipeline ran to completion
    pub scanned: u64,
    /// Ids with no account behind them
    pub invalid: u64,
    /// Records written, one per matching category
    pub matched: u64,
    /// Accounts abandoned because of the rate limit
    pub rate_limited: u64,
    /// Accounts abandoned after exhausted retries
    pub failed: u64,
    /// Records that could not be written
    pub sink_failures: u64,
    /// Whether the scan stopped before the range was drained
    pub cancelled: bool,
}

/// Live counters shared by the workers
#[derive(Debug, Default)]
pub(crate) struct ScanCounters {
    scanned: AtomicU64,
    invalid: AtomicU64,
    matched: AtomicU64,
    rate_limited: AtomicU64,
    failed: AtomicU64,
    sink_failures: AtomicU64,
}

impl ScanCounters {
    pub(crate) fn scanned(&self) {
        self.scanned.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn invalid(&self) {
        self.invalid.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn matched(&self) {
        self.matched.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn sink_failure(&self) {
        self.sink_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Freeze the counters into a report
    pub(crate) fn snapshot(&self, cancelled: bool) -> ScanReport {
        ScanReport {
            scanned: self.scanned.load(Ordering::Relaxed),
            invalid: self.invalid.load(Ordering::Relaxed),
            matched: self.matched.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            sink_failures: self.sink_failures.load(Ordering::Relaxed),
            cancelled,
        }
    }
}
