// SPDX-License-Identifier: MIT

//! In-memory TTL cache shared by the gate and the streak service.
//!
//! Not write-through: callers explicitly cache after computing and check
//! before recomputing. Expired entries are evicted on read.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::hash::Hash;

/// Cached value with its expiry instant.
#[derive(Clone)]
struct CachedEntry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

/// Simple TTL map over a concurrent hash map.
pub struct TtlCache<K, V> {
    entries: DashMap<K, CachedEntry<V>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Insert a value that expires `ttl_secs` from now.
    pub fn insert(&self, key: K, value: V, ttl_secs: i64) {
        self.entries.insert(
            key,
            CachedEntry {
                value,
                expires_at: Utc::now() + Duration::seconds(ttl_secs),
            },
        );
    }

    /// Get a live value; an expired entry is removed and reported as a miss.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Utc::now();
        let expired = match self.entries.get(key) {
            Some(entry) if now < entry.expires_at => return Some(entry.value.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }

    /// Drop a cached value, forcing the next read to recompute.
    pub fn invalidate(&self, key: &K) {
        self.entries.remove(key);
    }
}

impl<K, V> Default for TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
