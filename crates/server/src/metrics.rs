use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Atomic counters tracking request outcomes.
///
/// All counters use relaxed ordering. For a consistent point-in-time view,
/// call [`snapshot`](Self::snapshot).
#[derive(Debug, Default)]
pub struct Metrics {
    /// Audio extractions completed successfully.
    pub downloads_completed: AtomicU64,
    /// Audio extractions that failed at any stage.
    pub downloads_failed: AtomicU64,
    /// Search queries answered.
    pub searches_completed: AtomicU64,
    /// Files streamed out and deleted.
    pub files_served: AtomicU64,
}

impl Metrics {
    /// Increment the completed-downloads counter.
    pub fn increment_downloads_completed(&self) {
        self.downloads_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the failed-downloads counter.
    pub fn increment_downloads_failed(&self) {
        self.downloads_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the completed-searches counter.
    pub fn increment_searches_completed(&self) {
        self.searches_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the files-served counter.
    pub fn increment_files_served(&self) {
        self.files_served.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a consistent point-in-time snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            downloads_completed: self.downloads_completed.load(Ordering::Relaxed),
            downloads_failed: self.downloads_failed.load(Ordering::Relaxed),
            searches_completed: self.searches_completed.load(Ordering::Relaxed),
            files_served: self.files_served.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of the counters, serialized in health responses.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub downloads_completed: u64,
    pub downloads_failed: u64,
    pub searches_completed: u64,
    pub files_served: u64,
}
