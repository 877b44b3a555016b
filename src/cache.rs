//! TTL result cache (thread-safe, async).
//!
//! Uses DashMap for concurrent access with per-shard locking. Expiry is
//! evaluated lazily on read; entries are never swept, only superseded by the
//! next successful computation for the same key.
//!
//! Concurrent misses on one key are *not* coalesced: every caller that misses
//! runs its own computation and the last one to finish wins the slot.

use crate::key::{CacheKeyBuilder, KeyArg};
use crate::observability::{CacheObserver, LogObserver};
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Cached result with its insertion time.
struct CacheEntry<V> {
    value: V,
    created_at: Instant,
}

impl<V> CacheEntry<V> {
    fn new(value: V) -> Self {
        CacheEntry {
            value,
            created_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() >= ttl
    }
}

/// Outcome of a key lookup, before any computation.
enum Lookup<V> {
    Fresh(V),
    Expired,
    Absent,
}

/// Growth policy for a [`ResultCache`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CapacityPolicy {
    /// Never evict. Distinct keys accumulate for the cache's lifetime.
    #[default]
    Unbounded,

    /// Keep at most this many entries. Inserting a new key past the bound
    /// drops expired entries first, then the oldest ones. `MaxEntries(0)`
    /// disables storage entirely.
    ///
    /// While several tasks insert at once the store may briefly hold more
    /// than `n` entries; every insert trims it back before returning.
    MaxEntries(usize),
}

/// Thread-safe memoization store with a single TTL shared by all entries.
///
/// Clones share the same store, so one instance can be handed to every
/// component that needs it.
///
/// # Example
///
/// ```no_run
/// use aspect_kit::cache::ResultCache;
/// use aspect_kit::key::KeyArg;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let cache: ResultCache<String> = ResultCache::new(Duration::from_secs(60));
///
///     let name = cache
///         .get_or_compute("user", &[KeyArg::from(42)], || async {
///             Ok::<_, std::io::Error>(Some("Alice".to_string()))
///         })
///         .await
///         .unwrap();
///     assert_eq!(name.as_deref(), Some("Alice"));
/// }
/// ```
pub struct ResultCache<V> {
    store: Arc<DashMap<String, CacheEntry<V>>>,
    ttl: Duration,
    capacity: CapacityPolicy,
    observer: Arc<dyn CacheObserver>,
}

impl<V> Clone for ResultCache<V> {
    fn clone(&self) -> Self {
        ResultCache {
            store: Arc::clone(&self.store),
            ttl: self.ttl,
            capacity: self.capacity,
            observer: Arc::clone(&self.observer),
        }
    }
}

impl<V: Clone + Send + Sync> ResultCache<V> {
    /// Create an unbounded cache that logs its transitions.
    pub fn new(ttl: Duration) -> Self {
        ResultCache {
            store: Arc::new(DashMap::new()),
            ttl,
            capacity: CapacityPolicy::default(),
            observer: Arc::new(LogObserver),
        }
    }

    /// Replace the diagnostic sink.
    pub fn with_observer(mut self, observer: Arc<dyn CacheObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Set the growth policy.
    pub fn with_capacity_policy(mut self, capacity: CapacityPolicy) -> Self {
        self.capacity = capacity;
        self
    }

    /// Configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached result for `cache_name` + `args`, or run `compute`.
    ///
    /// - Fresh entry: returned as-is, `compute` is not called.
    /// - Missing or expired entry: `compute` runs. `Ok(Some(v))` is stored
    ///   and returned, `Ok(None)` is returned without being stored.
    /// - `Err(e)` from `compute` is returned unchanged and nothing is written;
    ///   an expired entry for the key stays where it was.
    ///
    /// # Errors
    ///
    /// Only the error produced by `compute` itself.
    pub async fn get_or_compute<F, Fut, E>(
        &self,
        cache_name: &str,
        args: &[KeyArg],
        compute: F,
    ) -> Result<Option<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<V>, E>>,
    {
        let key = CacheKeyBuilder::build(cache_name, args);
        self.get_or_compute_key(key, compute).await
    }

    /// Same as [`get_or_compute`](Self::get_or_compute) with a prebuilt key.
    pub async fn get_or_compute_key<F, Fut, E>(&self, key: String, compute: F) -> Result<Option<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<V>, E>>,
    {
        match self.lookup(&key) {
            Lookup::Fresh(value) => {
                self.observer.record_hit(&key);
                return Ok(Some(value));
            }
            Lookup::Expired => self.observer.record_expired(&key),
            Lookup::Absent => self.observer.record_miss(&key),
        }

        let result = compute().await?;

        if let Some(value) = &result {
            self.put(key, value.clone());
        }

        Ok(result)
    }

    /// Peek at a fresh entry without computing or reporting anything.
    pub fn get(&self, key: &str) -> Option<V> {
        match self.lookup(key) {
            Lookup::Fresh(value) => Some(value),
            Lookup::Expired | Lookup::Absent => None,
        }
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Check if the cache holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Entry statistics.
    pub fn stats(&self) -> CacheStats {
        let expired_entries = self
            .store
            .iter()
            .filter(|entry| entry.is_expired(self.ttl))
            .count();

        CacheStats {
            total_entries: self.store.len(),
            expired_entries,
        }
    }

    /// Print cache statistics to debug log.
    pub fn log_stats(&self) {
        let stats = self.stats();
        debug!(
            "ResultCache Stats: {} entries ({} expired), ttl {:?}",
            stats.total_entries, stats.expired_entries, self.ttl
        );
    }

    // The shard guard must be released before the caller awaits anything.
    fn lookup(&self, key: &str) -> Lookup<V> {
        match self.store.get(key) {
            Some(entry) if !entry.is_expired(self.ttl) => Lookup::Fresh(entry.value.clone()),
            Some(_) => Lookup::Expired,
            None => Lookup::Absent,
        }
    }

    fn put(&self, key: String, value: V) {
        if let CapacityPolicy::MaxEntries(max) = self.capacity {
            if max == 0 {
                return;
            }
        }

        self.store.insert(key.clone(), CacheEntry::new(value));
        self.observer.record_put(&key);

        if let CapacityPolicy::MaxEntries(max) = self.capacity {
            self.enforce_bound(max, &key);
        }
    }

    // Runs after every insert, so the last writer to finish always leaves
    // the store within `max` even when inserts race.
    fn enforce_bound(&self, max: usize, keep: &str) {
        if self.store.len() <= max {
            return;
        }

        let expired: Vec<String> = self
            .store
            .iter()
            .filter(|entry| entry.key() != keep && entry.is_expired(self.ttl))
            .map(|entry| entry.key().clone())
            .collect();

        for key in expired {
            if self.store.remove(&key).is_some() {
                self.observer.record_evicted(&key);
            }
        }

        while self.store.len() > max {
            let oldest = self
                .store
                .iter()
                .filter(|entry| entry.key() != keep)
                .min_by_key(|entry| entry.created_at)
                .map(|entry| entry.key().clone());

            match oldest {
                Some(key) => {
                    if self.store.remove(&key).is_some() {
                        self.observer.record_evicted(&key);
                    }
                }
                None => break,
            }
        }
    }
}

/// Cache statistics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
}
