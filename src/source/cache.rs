use super::Document;
use instant::Instant;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Default lifetime of a fetched document.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    fetched_at: Instant,
}

/// Time-bounded memo of remote documents, keyed by document.
///
/// Expiry is checked on every access; an expired entry is dropped and the
/// caller fetches again.
#[derive(Debug)]
pub struct FetchCache {
    ttl: Duration,
    entries: HashMap<Document, CacheEntry>,
}

impl FetchCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&mut self, document: Document) -> Option<Value> {
        self.get_at(document, Instant::now())
    }

    pub fn insert(&mut self, document: Document, value: Value) {
        self.insert_at(document, value, Instant::now());
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn get_at(&mut self, document: Document, now: Instant) -> Option<Value> {
        let fresh = match self.entries.get(&document) {
            Some(entry) => now.saturating_duration_since(entry.fetched_at) < self.ttl,
            None => return None,
        };
        if fresh {
            self.entries.get(&document).map(|entry| entry.value.clone())
        } else {
            self.entries.remove(&document);
            None
        }
    }

    fn insert_at(&mut self, document: Document, value: Value, fetched_at: Instant) {
        self.entries.insert(document, CacheEntry { value, fetched_at });
    }
}
