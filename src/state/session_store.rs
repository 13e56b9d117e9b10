use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::pipeline::Report;

/// The latest accepted upload of one browser session.
#[derive(Debug, Clone)]
pub struct SessionResult {
    pub report: Arc<Report>,
    pub stored_at: Instant,
}

/// Per-session bookkeeping. `ticket` is the number handed to the most recent
/// upload; only that upload may store or clear `result`.
#[derive(Debug)]
struct SessionSlot {
    ticket: u64,
    result: Option<SessionResult>,
    touched_at: Instant,
}

/// session_id → latest report. Sessions never share entries; a new upload
/// supersedes every earlier one still in flight, and idle entries are
/// evicted by the sweeper.
#[derive(Default)]
pub struct SessionStore {
    slots: DashMap<String, SessionSlot>,
}

impl SessionStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a new upload for `session_id` and return its ticket.
    /// Earlier tickets for the session become stale.
    pub fn begin(&self, session_id: &str) -> u64 {
        let mut slot = self
            .slots
            .entry(session_id.to_string())
            .or_insert_with(|| SessionSlot {
                ticket: 0,
                result: None,
                touched_at: Instant::now(),
            });
        slot.ticket += 1;
        slot.touched_at = Instant::now();
        slot.ticket
    }

    /// Store `report` for the upload holding `ticket`, dropping whatever the
    /// session held before. Returns false (and stores nothing) when a newer
    /// upload has started since.
    pub fn replace(&self, session_id: &str, ticket: u64, report: Arc<Report>) -> bool {
        self.settle(session_id, ticket, Some(report))
    }

    /// Forget the session's result after the upload holding `ticket` failed.
    /// A stale ticket leaves the newer upload's state alone.
    pub fn clear(&self, session_id: &str, ticket: u64) -> bool {
        self.settle(session_id, ticket, None)
    }

    fn settle(&self, session_id: &str, ticket: u64, report: Option<Arc<Report>>) -> bool {
        let Some(mut slot) = self.slots.get_mut(session_id) else {
            return false;
        };
        if slot.ticket != ticket {
            return false;
        }
        let now = Instant::now();
        slot.result = report.map(|report| SessionResult {
            report,
            stored_at: now,
        });
        slot.touched_at = now;
        true
    }

    pub fn get(&self, session_id: &str) -> Option<Arc<Report>> {
        self.slots
            .get(session_id)
            .and_then(|slot| slot.result.as_ref().map(|r| Arc::clone(&r.report)))
    }

    /// Sessions currently holding a result.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.result.is_some()).count()
    }

    /// Remove sessions untouched for longer than `ttl`. Returns how many went.
    pub fn evict_older_than(&self, ttl: Duration) -> usize {
        self.evict_touched_before(Instant::now().checked_sub(ttl))
    }

    fn evict_touched_before(&self, cutoff: Option<Instant>) -> usize {
        let Some(cutoff) = cutoff else {
            return 0;
        };
        let before = self.slots.len();
        self.slots.retain(|_, slot| slot.touched_at >= cutoff);
        before.saturating_sub(self.slots.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::classifier::fixed::FixedClassifier;
    use crate::pipeline::process_upload;
    use crate::test_support::{csv_with_rows, numeric_row};

    fn report(rows: usize) -> Arc<Report> {
        let data: Vec<Vec<String>> = (0..rows).map(numeric_row).collect();
        let model = FixedClassifier::new(vec![0; rows], vec![0.2; rows]);
        Arc::new(process_upload(&csv_with_rows(None, &data), &model).unwrap())
    }

    fn store_now(store: &SessionStore, session_id: &str, report: Arc<Report>) {
        let ticket = store.begin(session_id);
        assert!(store.replace(session_id, ticket, report));
    }

    #[test]
    fn replace_overwrites_previous_upload() {
        let store = SessionStore::new();
        store_now(&store, "s1", report(2));
        store_now(&store, "s1", report(5));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("s1").unwrap().table.len(), 5);
    }

    #[test]
    fn older_upload_cannot_overwrite_newer_one() {
        let store = SessionStore::new();
        let slow = store.begin("s1");
        let fast = store.begin("s1");

        assert!(store.replace("s1", fast, report(1)));
        assert!(!store.replace("s1", slow, report(4)));
        assert!(!store.clear("s1", slow));
        assert_eq!(store.get("s1").unwrap().table.len(), 1);
    }

    #[test]
    fn in_flight_upload_has_no_result_yet() {
        let store = SessionStore::new();
        store_now(&store, "s1", report(1));
        let _pending = store.begin("s1");

        // the previous result stays until the new upload settles
        assert!(store.get("s1").is_some());
        assert!(!store.replace("s2", 1, report(1)));
    }

    #[test]
    fn sessions_are_isolated() {
        let store = SessionStore::new();
        store_now(&store, "s1", report(1));

        assert!(store.get("s2").is_none());
        let other = store.begin("s2");
        store.clear("s2", other);
        assert!(store.get("s1").is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn clear_removes_result() {
        let store = SessionStore::new();
        store_now(&store, "s1", report(1));
        let ticket = store.begin("s1");
        assert!(store.clear("s1", ticket));
        assert!(store.get("s1").is_none());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn eviction_drops_only_stale_entries() {
        let store = SessionStore::new();
        store_now(&store, "old", report(1));
        std::thread::sleep(Duration::from_millis(20));
        let cutoff = Instant::now();
        store_now(&store, "fresh", report(1));

        assert_eq!(store.evict_touched_before(Some(cutoff)), 1);
        assert!(store.get("old").is_none());
        assert!(store.get("fresh").is_some());
    }

    #[test]
    fn long_ttl_keeps_everything() {
        let store = SessionStore::new();
        store_now(&store, "s1", report(1));
        assert_eq!(store.evict_older_than(Duration::from_secs(3600)), 0);
        assert_eq!(store.len(), 1);
    }
}
