//! Generic in-memory TTL cache
//!
//! A time-to-live map guarded by a mutex. Expired entries are evicted
//! lazily on access. There is no background sweeper and no LRU policy;
//! callers that need fresher data simply invalidate.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;
use std::time::{Duration, Instant};

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// A mutex-guarded map whose entries expire after a fixed TTL.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, Entry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Look up a value. Expired entries count as misses and are removed.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.entries.lock().expect("cache mutex poisoned");

        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store a value, restarting its TTL.
    pub fn insert(&self, key: K, value: V) {
        let now = Instant::now();
        let mut entries = self.entries.lock().expect("cache mutex poisoned");

        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key,
            Entry {
                value,
                expires_at: now + self.ttl,
            },
        );
    }

    /// Drop a single entry.
    pub fn invalidate(&self, key: &K) {
        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        entries.remove(key);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().expect("cache mutex poisoned").len()
    }
}
