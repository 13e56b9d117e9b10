//! Upload processing timings for `/stats/latency`.
//!
//! Two hdrhistograms share one lock: wall time per accepted upload and the
//! same time divided by the upload's row count. The second keeps a handful of
//! large files from hiding how the per-record cost moves.

use std::sync::Mutex;
use std::time::Duration;

use hdrhistogram::Histogram;
use serde::Serialize;

/// Upper bound for both histograms: 1000 s expressed in microseconds.
const MAX_TRACKED_US: u64 = 1_000_000_000;

struct Timings {
    total_us: Histogram<u64>,
    per_row_us: Histogram<u64>,
}

/// What the API reports. Times in milliseconds, per-row cost in microseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatencySnapshot {
    pub samples: u64,
    pub p50_ms: Option<f64>,
    pub p95_ms: Option<f64>,
    pub p99_ms: Option<f64>,
    pub per_row_p50_us: Option<u64>,
}

pub struct UploadLatency {
    inner: Mutex<Timings>,
}

impl UploadLatency {
    pub fn new() -> Self {
        let histogram = || {
            Histogram::new_with_bounds(1, MAX_TRACKED_US, 3).expect("valid histogram bounds")
        };
        Self {
            inner: Mutex::new(Timings {
                total_us: histogram(),
                per_row_us: histogram(),
            }),
        }
    }

    /// Record one accepted upload. Header-only files count toward the total
    /// but not toward the per-row cost.
    pub fn record(&self, elapsed: Duration, rows: usize) {
        let us = u64::try_from(elapsed.as_micros())
            .unwrap_or(MAX_TRACKED_US)
            .clamp(1, MAX_TRACKED_US);
        let Ok(mut t) = self.inner.lock() else {
            return;
        };
        let _ = t.total_us.record(us);
        if rows > 0 {
            let per_row = (us / rows as u64).max(1);
            let _ = t.per_row_us.record(per_row);
        }
    }

    pub fn snapshot(&self) -> LatencySnapshot {
        let Ok(t) = self.inner.lock() else {
            return LatencySnapshot::empty();
        };
        if t.total_us.len() == 0 {
            return LatencySnapshot::empty();
        }
        let ms = |q: f64| Some(t.total_us.value_at_quantile(q) as f64 / 1000.0);
        LatencySnapshot {
            samples: t.total_us.len(),
            p50_ms: ms(0.5),
            p95_ms: ms(0.95),
            p99_ms: ms(0.99),
            per_row_p50_us: (t.per_row_us.len() > 0)
                .then(|| t.per_row_us.value_at_quantile(0.5)),
        }
    }
}

impl LatencySnapshot {
    fn empty() -> Self {
        Self {
            samples: 0,
            p50_ms: None,
            p95_ms: None,
            p99_ms: None,
            per_row_p50_us: None,
        }
    }
}

impl Default for UploadLatency {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_has_no_percentiles() {
        let latency = UploadLatency::new();
        assert_eq!(latency.snapshot(), LatencySnapshot::empty());
    }

    #[test]
    fn percentiles_track_recorded_uploads() {
        let latency = UploadLatency::new();
        for ms in 1..=100u64 {
            latency.record(Duration::from_millis(ms), 10);
        }
        let snap = latency.snapshot();
        assert_eq!(snap.samples, 100);
        let p50 = snap.p50_ms.unwrap();
        assert!((49.0..=51.0).contains(&p50), "p50={p50}");
        assert!(snap.p95_ms.unwrap() >= p50 && snap.p99_ms.unwrap() >= snap.p95_ms.unwrap());
        // 50 ms over 10 rows
        let per_row = snap.per_row_p50_us.unwrap();
        assert!((4_900..=5_100).contains(&per_row), "per_row={per_row}");
    }

    #[test]
    fn header_only_upload_skips_per_row_cost() {
        let latency = UploadLatency::new();
        latency.record(Duration::from_millis(3), 0);
        let snap = latency.snapshot();
        assert_eq!(snap.samples, 1);
        assert_eq!(snap.per_row_p50_us, None);
    }
}
