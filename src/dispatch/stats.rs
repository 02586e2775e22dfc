//! Delivery counters and the statistics snapshot built from them.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub(crate) struct DispatchCounters {
    published: AtomicU64,
    unresolved: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
    submitted: AtomicU64,
    refused: AtomicU64,
    discarded: AtomicU64,
    last_published_at: Mutex<Option<DateTime<Utc>>>,
}

impl DispatchCounters {
    pub(crate) fn record_publish(&self) {
        self.published.fetch_add(1, Ordering::Relaxed);
        *self.last_published_at.lock() = Some(Utc::now());
    }

    pub(crate) fn record_unresolved(&self) {
        self.unresolved.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_refused(&self) {
        self.refused.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_discarded(&self) {
        self.discarded.fetch_add(1, Ordering::Relaxed);
    }
}

/// Statistics about a dispatcher
#[derive(Debug, Clone, Serialize)]
pub struct DispatcherStats {
    pub dispatcher_id: String,
    pub executor: String,
    /// Registered interest types in insertion order
    pub registered_types: Vec<&'static str>,
    pub total_subscribers: usize,
    /// Publish calls of either form, including ones that found no subscriber
    pub published: u64,
    pub unresolved: u64,
    /// Subscriber invocations that returned `Ok`
    pub delivered: u64,
    /// Subscriber invocations that returned `Err` or panicked
    pub failed: u64,
    /// Async invocations accepted by the executor. Each one ends up counted
    /// once in `delivered`, `failed` or `discarded`.
    pub submitted: u64,
    /// Async invocations the executor refused
    pub refused: u64,
    /// Accepted async invocations the executor evicted before they ran
    pub discarded: u64,
    pub last_published_at: Option<DateTime<Utc>>,
}

impl DispatcherStats {
    pub(crate) fn collect(
        dispatcher_id: &str,
        executor: &str,
        registered_types: Vec<&'static str>,
        total_subscribers: usize,
        counters: &DispatchCounters,
    ) -> Self {
        Self {
            dispatcher_id: dispatcher_id.to_string(),
            executor: executor.to_string(),
            registered_types,
            total_subscribers,
            published: counters.published.load(Ordering::Relaxed),
            unresolved: counters.unresolved.load(Ordering::Relaxed),
            delivered: counters.delivered.load(Ordering::Relaxed),
            failed: counters.failed.load(Ordering::Relaxed),
            submitted: counters.submitted.load(Ordering::Relaxed),
            refused: counters.refused.load(Ordering::Relaxed),
            discarded: counters.discarded.load(Ordering::Relaxed),
            last_published_at: *counters.last_published_at.lock(),
        }
    }
}
