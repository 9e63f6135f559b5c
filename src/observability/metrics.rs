//! Process counters
//!
//! Counters only grow and reset on process start. `movies` is the one gauge:
//! it tracks the current mirror size.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct MetricsRegistry {
    movies_created: AtomicU64,
    movies_removed: AtomicU64,
    requests_rejected: AtomicU64,
    filters_served: AtomicU64,
    store_failures: AtomicU64,
    movies: AtomicU64,
}

/// Point-in-time copy of every counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub movies_created: u64,
    pub movies_removed: u64,
    pub requests_rejected: u64,
    pub filters_served: u64,
    pub store_failures: u64,
    pub movies: u64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_created(&self) {
        self.movies_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_removed(&self) {
        self.movies_removed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rejected(&self) {
        self.requests_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_filters(&self) {
        self.filters_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_store_failures(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_movies(&self, count: usize) {
        self.movies.store(count as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            movies_created: self.movies_created.load(Ordering::Relaxed),
            movies_removed: self.movies_removed.load(Ordering::Relaxed),
            requests_rejected: self.requests_rejected.load(Ordering::Relaxed),
            filters_served: self.filters_served.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
            movies: self.movies.load(Ordering::Relaxed),
        }
    }
}
