//! Bounded record of incidents that have already been notified.

use indexmap::IndexSet;
use tokio::sync::Mutex;

/// Default number of incident keys retained.
pub const DEFAULT_DEDUPE_CAPACITY: usize = 1000;

/// Build the dedupe key of an incident.
///
/// Ids are namespaced by feed URL so two feeds never share dedupe state.
pub fn incident_key(feed_url: &str, incident_id: &str) -> String {
    format!("{}#{}", feed_url, incident_id)
}

/// Insertion-ordered set of seen incident keys with oldest-first eviction.
///
/// The capacity must exceed the number of items a feed exposes at once,
/// otherwise evicted items would be notified again on the next cycle.
#[derive(Debug)]
pub struct DedupeIndex {
    seen: Mutex<IndexSet<String>>,
    capacity: usize,
}

impl Default for DedupeIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl DedupeIndex {
    /// Create an index with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_DEDUPE_CAPACITY)
    }

    /// Create an index retaining at most `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            seen: Mutex::new(IndexSet::with_capacity(capacity)),
            capacity,
        }
    }

    /// Record a key, returning true if it was not already present.
    pub async fn mark_if_new(&self, key: &str) -> bool {
        let mut seen = self.seen.lock().await;

        if seen.contains(key) {
            return false;
        }

        seen.insert(key.to_string());
        while seen.len() > self.capacity {
            seen.shift_remove_index(0);
        }

        true
    }

    /// Check whether a key has been recorded.
    pub async fn contains(&self, key: &str) -> bool {
        self.seen.lock().await.contains(key)
    }

    /// Number of keys currently retained.
    pub async fn len(&self) -> usize {
        self.seen.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.seen.lock().await.is_empty()
    }

    /// Maximum number of keys retained.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
