//! Cache-on-call aspect.

use crate::cache::ResultCache;
use crate::joinpoint::JoinPoint;
use crate::settings::AspectSettings;
use std::future::Future;

/// Memoizes an operation's result by cache name and arguments.
///
/// Holds one [`ResultCache`] per value type; clone the aspect (cheap) to
/// share the store between call sites.
///
/// # Example
///
/// ```ignore
/// let cached: CachedAspect<User> = CachedAspect::new(ResultCache::new(ttl));
///
/// let jp = JoinPoint::new("UserRepository::find_by_id(id: i64)").arg(id);
/// let user = cached
///     .around("user", &jp, || repo.find_by_id(id))
///     .await?;
/// ```
#[derive(Clone)]
pub struct CachedAspect<V> {
    cache: ResultCache<V>,
}

impl<V: Clone + Send + Sync> CachedAspect<V> {
    pub fn new(cache: ResultCache<V>) -> Self {
        CachedAspect { cache }
    }

    /// Aspect with a fresh cache using the configured TTL.
    pub fn from_settings(settings: &AspectSettings) -> Self {
        Self::new(ResultCache::new(settings.cache_ttl()))
    }

    pub fn cache(&self) -> &ResultCache<V> {
        &self.cache
    }

    /// Serve a fresh cached result or run `op` and remember what it returns.
    ///
    /// `Ok(None)` results are passed through uncached. Errors from `op` are
    /// returned unchanged and leave the cache untouched.
    ///
    /// # Errors
    ///
    /// Only the error produced by `op`.
    pub async fn around<F, Fut, E>(
        &self,
        cache_name: &str,
        join_point: &JoinPoint,
        op: F,
    ) -> Result<Option<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<V>, E>>,
    {
        trace!(
            "Cached call {} in cache {}",
            join_point.short_signature(),
            cache_name
        );
        self.cache
            .get_or_compute(cache_name, &join_point.key_args(), op)
            .await
    }
}
