//! Junction metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for a single junction instance
#[derive(Debug, Default)]
pub struct JunctionMetrics {
    /// Values pulled from any input stream
    received: AtomicU64,
    /// Snapshots handed to a consumer
    published: AtomicU64,
    /// Values whose target model could not be located
    unresolved: AtomicU64,
    /// Input streams that reported closed
    closed_inputs: AtomicU64,
}

impl JunctionMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get received count
    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    /// Increment received count
    pub fn inc_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    /// Get published count
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    /// Increment published count
    pub fn inc_published(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    /// Get unresolved count
    pub fn unresolved(&self) -> u64 {
        self.unresolved.load(Ordering::Relaxed)
    }

    /// Increment unresolved count
    pub fn inc_unresolved(&self) {
        self.unresolved.fetch_add(1, Ordering::Relaxed);
    }

    /// Get closed input count
    pub fn closed_inputs(&self) -> u64 {
        self.closed_inputs.load(Ordering::Relaxed)
    }

    /// Increment closed input count
    pub fn inc_closed_inputs(&self) {
        self.closed_inputs.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            received: self.received(),
            published: self.published(),
            unresolved: self.unresolved(),
            closed_inputs: self.closed_inputs(),
        }
    }
}

/// Snapshot of junction metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub received: u64,
    pub published: u64,
    pub unresolved: u64,
    pub closed_inputs: u64,
}
