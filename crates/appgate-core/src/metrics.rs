//! Global atomic counters for gate activity.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    requests_evaluated: AtomicU64,
    requests_blocked: AtomicU64,
    requests_passed_through: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            requests_evaluated: AtomicU64::new(0),
            requests_blocked: AtomicU64::new(0),
            requests_passed_through: AtomicU64::new(0),
        }
    }

    /// A mobile app request was evaluated against its platform snapshot.
    pub fn inc_evaluated(&self) {
        self.requests_evaluated.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "requests_evaluated", "counter incremented");
    }

    /// A request was rejected with 426.
    pub fn inc_blocked(&self) {
        self.requests_blocked.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "requests_blocked", "counter incremented");
    }

    /// A request skipped gating (not a mobile app, or gate disabled).
    pub fn inc_passed_through(&self) {
        self.requests_passed_through.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "requests_passed_through", "counter incremented");
    }

    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            requests_evaluated = self.requests_evaluated(),
            requests_blocked = self.requests_blocked(),
            requests_passed_through = self.requests_passed_through(),
        );
    }

    pub fn requests_evaluated(&self) -> u64 {
        self.requests_evaluated.load(Ordering::Relaxed)
    }

    pub fn requests_blocked(&self) -> u64 {
        self.requests_blocked.load(Ordering::Relaxed)
    }

    pub fn requests_passed_through(&self) -> u64 {
        self.requests_passed_through.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.requests_evaluated.store(0, Ordering::Relaxed);
        self.requests_blocked.store(0, Ordering::Relaxed);
        self.requests_passed_through.store(0, Ordering::Relaxed);
    }
}
