//! Thread-safe per-run counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Counters shared by every agent task in a run.
///
/// Increments are atomic; each counter is recorded at the point where the
/// corresponding event is decided, not reconstructed afterwards.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    /// Committed transfers.
    success: AtomicU64,
    /// Unexpected errors caught at the task boundary.
    errors: AtomicU64,
    /// Pessimistic acquisitions that hit the timeout.
    deadlocks_detected: AtomicU64,
    /// Optimistic commit-time validation failures.
    aborts: AtomicU64,
    /// Attempts that exhausted their retry budget.
    failed_retries: AtomicU64,
    /// WAIT verdicts received from the lease authority.
    waits: AtomicU64,
    /// DIE verdicts received from the lease authority.
    dies: AtomicU64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self) {
        self.success.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_deadlock(&self) {
        self.deadlocks_detected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_abort(&self) {
        self.aborts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed_retry(&self) {
        self.failed_retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_wait(&self) {
        self.waits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_die(&self) {
        self.dies.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            success: self.success.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            deadlocks_detected: self.deadlocks_detected.load(Ordering::Relaxed),
            aborts: self.aborts.load(Ordering::Relaxed),
            failed_retries: self.failed_retries.load(Ordering::Relaxed),
            waits: self.waits.load(Ordering::Relaxed),
            dies: self.dies.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of all counters, attached to the run summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub success: u64,
    pub errors: u64,
    pub deadlocks_detected: u64,
    pub aborts: u64,
    pub failed_retries: u64,
    pub waits: u64,
    pub dies: u64,
}
