//! Process-wide rate-limit cooldown
//!
//! When any worker sees a 429, every worker should stop sending requests for a while
//! instead of hammering a key that is already throttled. The gate is a shared deadline:
//! [`trip`](RateLimitGate::trip) pushes it forward, [`wait_ready`](RateLimitGate::wait_ready)
//! sleeps until it has passed.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// Upper bound on a single sleep so a later extension of the deadline is noticed
const MAX_WAIT_SLICE: Duration = Duration::from_millis(500);

/// Cooldown shared by every request made with one API key
///
/// Cloning is cheap; all clones observe the same deadline.
#[derive(Clone, Debug)]
pub struct RateLimitGate {
    /// Length of the pause after each 429
    cooldown: Duration,
    /// Reference point for `resume_at`
    origin: Instant,
    /// Nanoseconds after `origin` before which no request may be sent (0 = open)
    resume_at: Arc<AtomicU64>,
    /// Number of times the gate has been tripped
    trips: Arc<AtomicU64>,
}

impl RateLimitGate {
    /// Create an open gate that closes for `cooldown` on every trip
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use steam_sweep::api::RateLimitGate;
    ///
    /// let gate = RateLimitGate::new(Duration::from_secs(60));
    /// assert!(!gate.is_cooling_down());
    /// gate.trip();
    /// assert!(gate.is_cooling_down());
    /// ```
    #[must_use]
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            origin: Instant::now(),
            resume_at: Arc::new(AtomicU64::new(0)),
            trips: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Close the gate for one cooldown window from now
    ///
    /// Concurrent trips never shorten an existing window.
    pub fn trip(&self) {
        let until = self.now_nanos().saturating_add(self.cooldown.as_nanos() as u64);
        self.resume_at.fetch_max(until, Ordering::SeqCst);
        let trips = self.trips.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::warn!(
            cooldown_secs = self.cooldown.as_secs(),
            trips,
            "Steam API rate limit reached, pausing all requests"
        );
    }

    /// Whether a cooldown is currently in effect
    pub fn is_cooling_down(&self) -> bool {
        self.remaining() > Duration::ZERO
    }

    /// Time left in the current cooldown window
    pub fn remaining(&self) -> Duration {
        let resume = self.resume_at.load(Ordering::SeqCst);
        Duration::from_nanos(resume.saturating_sub(self.now_nanos()))
    }

    /// Total trips since creation
    pub fn trip_count(&self) -> u64 {
        self.trips.load(Ordering::SeqCst)
    }

    /// Sleep until no cooldown is in effect
    ///
    /// Returns immediately when the gate is open.
    pub async fn wait_ready(&self) {
        loop {
            let remaining = self.remaining();
            if remaining.is_zero() {
                return;
            }
            tracing::debug!(
                remaining_ms = remaining.as_millis(),
                "Waiting for rate-limit cooldown"
            );
            tokio::time::sleep(remaining.min(MAX_WAIT_SLICE)).await;
        }
    }

    fn now_nanos(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }
}
