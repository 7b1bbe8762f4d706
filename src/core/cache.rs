//! Bounded LRU cache from normalized allocation requests to pooled units.
//!
//! The cache holds identifiers of idle units, keyed by the shape of the
//! request each unit last served. The owning tier stays the source of truth:
//! a lookup is only a candidate until the caller re-validates it, so hits and
//! misses are recorded by the caller once that decision is made.

use std::num::NonZeroUsize;

use lru::LruCache;
use serde::Serialize;

use crate::util::serde::{Priority, ResourceId};

/// Reference to a unit owned by a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CachedResource {
    /// Unit identifier.
    pub id: ResourceId,
    /// Tier owning the unit.
    pub priority: Priority,
}

/// Hit/miss counters and occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CacheStats {
    /// Lookups that served a unit.
    pub hits: u64,
    /// Lookups that found nothing usable.
    pub misses: u64,
    /// Entries currently stored.
    pub size: usize,
    /// Maximum entries.
    pub capacity: usize,
}

impl CacheStats {
    /// Share of lookups that hit, or 0 before any lookup.
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// LRU cache keyed by request keys (see [`crate::core::AllocationRequest::cache_key`]).
pub struct PoolCache {
    entries: LruCache<String, CachedResource>,
    hits: u64,
    misses: u64,
}

impl std::fmt::Debug for PoolCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolCache").field("stats", &self.stats()).finish()
    }
}

impl PoolCache {
    /// Create a cache holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Look up `key`, refreshing its recency. Counters are untouched.
    pub fn get(&mut self, key: &str) -> Option<CachedResource> {
        self.entries.get(key).copied()
    }

    /// Count a lookup that served a unit.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Count a lookup that found nothing usable.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Insert or replace `key`, evicting the least recently used entry when
    /// full. Returns the evicted entry, not a replaced value for the same key.
    pub fn put(&mut self, key: String, value: CachedResource) -> Option<CachedResource> {
        let inserted = key.clone();
        self.entries.push(key, value).and_then(|(old_key, old)| {
            if old_key == inserted {
                None
            } else {
                tracing::trace!(key = %old_key, "cache entry evicted");
                Some(old)
            }
        })
    }

    /// Remove the entry for `key`.
    pub fn remove(&mut self, key: &str) -> Option<CachedResource> {
        self.entries.pop(key)
    }

    /// Remove the entry for `key` only if it still points at `id`.
    pub fn remove_if(&mut self, key: &str, id: ResourceId) -> bool {
        if self.entries.peek(key).is_some_and(|entry| entry.id == id) {
            self.entries.pop(key);
            true
        } else {
            false
        }
    }

    /// Remove every entry pointing at `id`. Returns how many were removed.
    pub fn remove_resource(&mut self, id: ResourceId) -> usize {
        let keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.id == id)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &keys {
            self.entries.pop(key);
        }
        keys.len()
    }

    /// Drop all entries and reset counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Counters and occupancy.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            size: self.entries.len(),
            capacity: self.entries.cap().get(),
        }
    }
}
