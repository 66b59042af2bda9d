//! In-memory LRU cache with lazy TTL expiry.

use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

use crate::error::{GatewayError, Result};

#[derive(Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) > ttl
    }
}

struct Inner<V> {
    entries: LruCache<String, CacheEntry<V>>,
    hits: u64,
    misses: u64,
}

/// Capacity- and age-bounded key/value store shared by all resolvers.
///
/// Expired entries are never returned, but they are only physically dropped
/// when a new key arrives at a full store or when they fall off the LRU end.
pub struct CacheStore<V> {
    inner: Mutex<Inner<V>>,
    capacity: NonZeroUsize,
    ttl: Duration,
}

impl<V: Clone> CacheStore<V> {
    pub fn new(capacity: usize, ttl: Duration) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity).ok_or_else(|| {
            GatewayError::Config("cache capacity must be greater than zero".to_string())
        })?;

        Ok(Self {
            inner: Mutex::new(Inner {
                entries: LruCache::new(capacity),
                hits: 0,
                misses: 0,
            }),
            capacity,
            ttl,
        })
    }

    /// Returns the value for `key` if present and not older than the TTL.
    ///
    /// A hit marks the key as most recently used; an expired entry is left
    /// in place and keeps its position.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut inner = self.inner.lock();

        let fresh = inner
            .entries
            .peek(key)
            .map(|entry| !entry.is_expired(self.ttl, now))
            .unwrap_or(false);

        if !fresh {
            inner.misses += 1;
            return None;
        }

        inner.hits += 1;
        inner.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Inserts or overwrites `key`, evicting the least recently used entry
    /// when a new key would exceed capacity.
    pub fn set(&self, key: &str, value: V) {
        let now = Instant::now();
        let mut inner = self.inner.lock();

        if !inner.entries.contains(key) && inner.entries.len() >= self.capacity.get() {
            let expired: Vec<String> = inner
                .entries
                .iter()
                .filter(|(_, entry)| entry.is_expired(self.ttl, now))
                .map(|(k, _)| k.clone())
                .collect();
            for k in &expired {
                inner.entries.pop(k);
            }
            if !expired.is_empty() {
                trace!(dropped = expired.len(), "Dropped expired cache entries");
            }
        }

        if let Some((evicted, _)) = inner.entries.push(
            key.to_string(),
            CacheEntry {
                value,
                inserted_at: now,
            },
        ) {
            if evicted != key {
                trace!(key = %evicted, "Evicted least recently used cache entry");
            }
        }
    }

    /// Number of physically stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Drops every entry. Hit/miss counters are kept.
    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        CacheStats {
            entries: inner.entries.len(),
            capacity: self.capacity.get(),
            hits: inner.hits,
            misses: inner.misses,
        }
    }
}

/// Cache statistics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}
