//! Diagnostic hooks for cache transitions.
//!
//! Every [`ResultCache`](crate::cache::ResultCache) lookup ends in exactly one
//! of hit, expired or miss, and every successful recompute adds a put.
//! Implement [`CacheObserver`] to forward these to your monitoring system:
//!
//! ```ignore
//! use aspect_kit::observability::CacheObserver;
//!
//! struct PrometheusObserver;
//!
//! impl CacheObserver for PrometheusObserver {
//!     fn record_hit(&self, _key: &str) {
//!         // counter!("result_cache_hits").increment(1);
//!     }
//!     // ... implement other methods
//! }
//!
//! // let cache = ResultCache::new(ttl).with_observer(Arc::new(PrometheusObserver));
//! ```
//!
//! Default behavior is [`LogObserver`], which writes one `info` line per
//! transition via the `log` crate.

/// Sink for cache state transitions.
pub trait CacheObserver: Send + Sync {
    /// A fresh entry was served.
    fn record_hit(&self, key: &str) {
        info!("CACHE_HIT key={}", key);
    }

    /// An entry was found but its TTL had elapsed.
    fn record_expired(&self, key: &str) {
        info!("CACHE_EXPIRED key={}", key);
    }

    /// No entry existed for the key.
    fn record_miss(&self, key: &str) {
        info!("CACHE_MISS key={}", key);
    }

    /// A computed value was stored.
    fn record_put(&self, key: &str) {
        info!("CACHE_PUT key={}", key);
    }

    /// An entry was dropped to respect a capacity bound.
    fn record_evicted(&self, key: &str) {
        debug!("CACHE_EVICTED key={}", key);
    }
}

/// Default observer: logs every transition.
#[derive(Clone, Default)]
pub struct LogObserver;

impl CacheObserver for LogObserver {}

/// Silent observer.
#[derive(Clone, Default)]
pub struct NoOpObserver;

impl CacheObserver for NoOpObserver {
    fn record_hit(&self, _key: &str) {}
    fn record_expired(&self, _key: &str) {}
    fn record_miss(&self, _key: &str) {}
    fn record_put(&self, _key: &str) {}
    fn record_evicted(&self, _key: &str) {}
}
