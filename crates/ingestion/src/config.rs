//! Backpressure configuration and metrics

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

pub use contracts::DropPolicy;

/// Backpressure configuration
#[derive(Debug, Clone)]
pub struct BackpressureConfig {
    /// Channel capacity
    pub channel_capacity: usize,

    /// Drop policy when full
    pub drop_policy: DropPolicy,
}

impl Default for BackpressureConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 100,
            drop_policy: DropPolicy::DropNewest,
        }
    }
}

impl BackpressureConfig {
    /// Create new backpressure configuration
    pub fn new(channel_capacity: usize, drop_policy: DropPolicy) -> Self {
        Self {
            channel_capacity,
            drop_policy,
        }
    }
}

/// Ingestion metrics
#[derive(Debug, Default)]
pub struct IngestionMetrics {
    /// Total readings received
    pub readings_received: AtomicU64,

    /// Total readings dropped to backpressure
    pub readings_dropped: AtomicU64,

    /// Total readings rejected by the quality gate
    pub readings_rejected: AtomicU64,

    /// Current queue length
    pub queue_len: AtomicUsize,
}

impl IngestionMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record reading received
    pub fn record_received(&self) {
        self.readings_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record reading dropped
    pub fn record_dropped(&self) {
        self.readings_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record reading rejected at the quality gate
    pub fn record_rejected(&self) {
        self.readings_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Update queue length
    pub fn update_queue_len(&self, len: usize) {
        self.queue_len.store(len, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            readings_received: self.readings_received.load(Ordering::Relaxed),
            readings_dropped: self.readings_dropped.load(Ordering::Relaxed),
            readings_rejected: self.readings_rejected.load(Ordering::Relaxed),
            queue_len: self.queue_len.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Total readings received
    pub readings_received: u64,

    /// Total readings dropped to backpressure
    pub readings_dropped: u64,

    /// Total readings rejected by the quality gate
    pub readings_rejected: u64,

    /// Current queue length
    pub queue_len: usize,
}
