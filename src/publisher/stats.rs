//! Publisher counters
//!
//! Shared between producer threads and the worker through an `Arc`. All
//! updates are relaxed atomics; a snapshot is not a consistent cut.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct PublisherStats {
    enqueued: AtomicU64,
    dropped_full: AtomicU64,
    published: AtomicU64,
    send_failures: AtomicU64,
    bind_failures: AtomicU64,
    rebinds: AtomicU64,
    skipped_unbound: AtomicU64,
    loop_failures: AtomicU64,
    processed: AtomicU64,
}

/// Point-in-time copy of [`PublisherStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub enqueued: u64,
    pub dropped_full: u64,
    pub published: u64,
    pub send_failures: u64,
    pub bind_failures: u64,
    pub rebinds: u64,
    pub skipped_unbound: u64,
    pub loop_failures: u64,
    /// Events the worker has finished with, whatever the outcome
    pub processed: u64,
}

impl StatsSnapshot {
    /// Events accepted by the queue that the worker has not finished yet
    pub fn outstanding(&self) -> u64 {
        self.enqueued.saturating_sub(self.processed)
    }
}

impl PublisherStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped_full(&self) {
        self.dropped_full.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_published(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_send_failure(&self) {
        self.send_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_bind_failure(&self) {
        self.bind_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rebind(&self) {
        self.rebinds.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_skipped_unbound(&self) {
        self.skipped_unbound.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_loop_failure(&self) {
        self.loop_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            dropped_full: self.dropped_full.load(Ordering::Relaxed),
            published: self.published.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
            bind_failures: self.bind_failures.load(Ordering::Relaxed),
            rebinds: self.rebinds.load(Ordering::Relaxed),
            skipped_unbound: self.skipped_unbound.load(Ordering::Relaxed),
            loop_failures: self.loop_failures.load(Ordering::Relaxed),
            processed: self.processed.load(Ordering::Relaxed),
        }
    }
}
