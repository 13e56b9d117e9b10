//! Shared counters for the /health endpoint.
//! Updated by the upload handler, read by the API.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Default)]
pub struct HealthState {
    /// Uploads that produced a report.
    pub uploads_processed: AtomicU64,
    /// Uploads rejected with a schema, parse, inference or timeout error.
    pub uploads_rejected: AtomicU64,
    /// Total rows scored across all accepted uploads.
    pub rows_scored: AtomicU64,
    /// Nanosecond timestamp of the last accepted upload (0 = none).
    pub last_upload_at_ns: AtomicU64,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_processed(&self, rows: usize) {
        self.uploads_processed.fetch_add(1, Ordering::Relaxed);
        self.rows_scored.fetch_add(rows as u64, Ordering::Relaxed);
        self.last_upload_at_ns.store(now_ns(), Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.uploads_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uploads_processed(&self) -> u64 {
        self.uploads_processed.load(Ordering::Relaxed)
    }

    pub fn uploads_rejected(&self) -> u64 {
        self.uploads_rejected.load(Ordering::Relaxed)
    }

    pub fn rows_scored(&self) -> u64 {
        self.rows_scored.load(Ordering::Relaxed)
    }

    pub fn last_upload_at_ns(&self) -> u64 {
        self.last_upload_at_ns.load(Ordering::Relaxed)
    }
}

fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}
