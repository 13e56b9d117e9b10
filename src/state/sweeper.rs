use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::SESSION_SWEEP_INTERVAL_SECS;
use crate::state::SessionStore;

/// Background task that discards session results idle past the TTL.
pub struct SessionSweeper {
    store: Arc<SessionStore>,
    ttl: Duration,
}

impl SessionSweeper {
    pub fn new(store: Arc<SessionStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub async fn run(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(SESSION_SWEEP_INTERVAL_SECS));
        interval.tick().await; // consume immediate first tick

        loop {
            interval.tick().await;
            self.sweep();
        }
    }

    fn sweep(&self) -> usize {
        let evicted = self.store.evict_older_than(self.ttl);
        if evicted > 0 {
            info!(evicted, remaining = self.store.len(), "Expired session results evicted");
        } else {
            debug!(remaining = self.store.len(), "Session sweep: nothing expired");
        }
        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::classifier::fixed::FixedClassifier;
    use crate::pipeline::process_upload;
    use crate::test_support::csv_with_rows;

    #[test]
    fn sweep_with_zero_ttl_clears_store() {
        let store = SessionStore::new();
        let model = FixedClassifier::new(vec![], vec![]);
        let report = process_upload(&csv_with_rows(None, &[]), &model).unwrap();
        let ticket = store.begin("s1");
        assert!(store.replace("s1", ticket, Arc::new(report)));
        std::thread::sleep(Duration::from_millis(5));

        let sweeper = SessionSweeper::new(Arc::clone(&store), Duration::ZERO);
        assert_eq!(sweeper.sweep(), 1);
        assert_eq!(store.len(), 0);
    }
}
