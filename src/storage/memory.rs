//! Bounded in-memory backend.
//!
//! The default backend for tests and single-process deployments: an LRU
//! cache with lazy TTL expiry. Capacity bounds memory, the TTL bounds
//! staleness; an entry evicted early only means a future reshare goes
//! unrecognized.

use crate::Result;
use crate::storage::KeyValueBackend;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Default number of tracked entries.
const DEFAULT_CAPACITY: usize = 4096;

/// A stored value with its expiry instant.
#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Instant::now())
    }
}

/// In-memory key-value backend.
///
/// # Thread Safety
///
/// Uses `RwLock` for interior mutability; safe to share across async
/// tasks.
///
/// # Lock Poisoning
///
/// Handled with fail-open semantics: a poisoned lock makes reads return
/// `None` and writes silently skip. Link tracking is soft state; blocking
/// message processing over a transient panic elsewhere would be worse than
/// missing a duplicate notification.
#[derive(Debug)]
pub struct InMemoryBackend {
    entries: RwLock<LruCache<String, Entry>>,
}

impl InMemoryBackend {
    /// Creates a backend bounded at `capacity` entries.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    #[must_use]
    #[allow(clippy::expect_used)] // documented panic for invalid input
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).expect("capacity must be > 0");
        Self {
            entries: RwLock::new(LruCache::new(cap)),
        }
    }

    /// Creates a backend with the default capacity.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }

    /// Returns the number of entries, including not-yet-evicted expired
    /// ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().map(|cache| cache.len()).unwrap_or(0)
    }

    /// Returns true when no entries are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl KeyValueBackend for InMemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let Ok(mut cache) = self.entries.write() else {
            return Ok(None);
        };

        // Expired entries are dropped lazily, on the read that finds them.
        if cache.get(key).is_some_and(Entry::is_expired) {
            cache.pop(key);
            return Ok(None);
        }
        Ok(cache.peek(key).map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let entry = Entry {
            value: value.to_string(),
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        };
        if let Ok(mut cache) = self.entries.write() {
            cache.put(key.to_string(), entry);
            metrics::gauge!("relink_memory_backend_entries").set(cache.len() as f64);
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        if let Ok(mut cache) = self.entries.write() {
            cache.pop(key);
        }
        Ok(())
    }
}
