use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::engine::RankedResult;

struct CacheEntry {
    results: Vec<RankedResult>,
    expires_at: Instant,
}

/// Memoizes ranked results keyed by (query signature, limit).
///
/// Invalidation is coarse: any index mutation clears every entry. There is
/// no dependency tracking between cached queries and the terms or documents
/// that changed.
pub struct ResultCache {
    ttl: Duration,
    entries: Mutex<HashMap<(String, usize), CacheEntry>>,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: Mutex::new(HashMap::new()) }
    }

    /// Returns the cached results if present and not expired. Expired
    /// entries read as misses and are evicted on the spot.
    pub fn get(&self, signature: &str, limit: usize) -> Option<Vec<RankedResult>> {
        let mut entries = self.entries.lock();
        let key = (signature.to_string(), limit);
        match entries.get(&key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.results.clone()),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, signature: String, limit: usize, results: Vec<RankedResult>) {
        let entry = CacheEntry { results, expires_at: Instant::now() + self.ttl };
        self.entries.lock().insert((signature, limit), entry);
    }

    pub fn invalidate_all(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
