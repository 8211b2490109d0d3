//! Query metrics
//!
//! - Counters only
//! - Monotonic increase
//! - Thread-safe but lock-free

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one bound table
///
/// All counters use Relaxed ordering; values are exact once writers finish.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Range queries sent to the store
    queries_executed: AtomicU64,
    /// Native count calls sent to the store
    native_counts: AtomicU64,
    /// Executions answered by the empty sentinel
    empty_short_circuits: AtomicU64,
    /// Items confirmed deleted
    items_deleted: AtomicU64,
    /// Batch delete calls
    delete_batches: AtomicU64,
    /// Store calls that returned an error
    store_failures: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_queries_executed(&self) {
        self.queries_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_native_counts(&self) {
        self.native_counts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_empty_short_circuits(&self) {
        self.empty_short_circuits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_items_deleted(&self, count: u64) {
        self.items_deleted.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_delete_batches(&self) {
        self.delete_batches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_store_failures(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queries_executed: self.queries_executed.load(Ordering::Relaxed),
            native_counts: self.native_counts.load(Ordering::Relaxed),
            empty_short_circuits: self.empty_short_circuits.load(Ordering::Relaxed),
            items_deleted: self.items_deleted.load(Ordering::Relaxed),
            delete_batches: self.delete_batches.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    pub queries_executed: u64,
    pub native_counts: u64,
    pub empty_short_circuits: u64,
    pub items_deleted: u64,
    pub delete_batches: u64,
    pub store_failures: u64,
}
