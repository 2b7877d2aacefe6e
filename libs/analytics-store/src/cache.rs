//! In-process TTL cache
//!
//! One `moka` cache per [`CacheNamespace`], each with its own time-to-live and
//! entry bound. Values of any type are stored behind `Arc<dyn Any>` under a
//! string key.

use std::{any::Any, future::Future, sync::Arc, time::Duration};

use moka::future::Cache;

use crate::settings::CacheSettings;

/// Longest lifetime any namespace is given
const MAX_TTL: Duration = Duration::from_secs(365 * 86_400);

/// Key namespaces with independently configured lifetimes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheNamespace {
    /// Windowed on-chain queries
    Recent,
    /// Full-history aggregates
    AllTime,
    /// Third-party API responses
    External,
}

type Erased = Arc<dyn Any + Send + Sync>;

pub struct TtlCache {
    recent: Cache<String, Erased>,
    all_time: Cache<String, Erased>,
    external: Cache<String, Erased>,
}

fn build(max_entries: usize, ttl: Duration) -> Cache<String, Erased> {
    Cache::builder()
        .max_capacity(max_entries.max(1) as u64)
        .time_to_live(ttl.min(MAX_TTL))
        .build()
}

impl TtlCache {
    pub fn new(settings: &CacheSettings) -> Self {
        Self {
            recent: build(settings.max_entries, settings.recent_ttl),
            all_time: build(settings.max_entries, settings.all_time_ttl),
            external: build(settings.max_entries, settings.external_ttl),
        }
    }

    fn namespace(&self, namespace: CacheNamespace) -> &Cache<String, Erased> {
        match namespace {
            CacheNamespace::Recent => &self.recent,
            CacheNamespace::AllTime => &self.all_time,
            CacheNamespace::External => &self.external,
        }
    }

    /// Fresh value under `key`, if it exists and has type `T`
    pub async fn get<T: Any + Send + Sync>(&self, namespace: CacheNamespace, key: &str) -> Option<Arc<T>> {
        self.namespace(namespace)
            .get(key)
            .await
            .and_then(|value| value.downcast::<T>().ok())
    }

    pub async fn insert<T: Any + Send + Sync>(
        &self,
        namespace: CacheNamespace,
        key: &str,
        value: T,
    ) -> Arc<T> {
        let value = Arc::new(value);
        self.namespace(namespace)
            .insert(key.to_string(), value.clone() as Erased)
            .await;
        value
    }

    /// Return the cached value or run `fetch`, caching only a successful result.
    ///
    /// Two concurrent misses on the same key both fetch and the last one wins.
    pub async fn get_or_try_fetch<T, E, F, Fut>(
        &self,
        namespace: CacheNamespace,
        key: &str,
        fetch: F,
    ) -> Result<Arc<T>, E>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get::<T>(namespace, key).await {
            tracing::debug!(key, "Cache hit");
            return Ok(hit);
        }

        let value = fetch().await?;
        Ok(self.insert(namespace, key, value).await)
    }

    pub async fn remove(&self, namespace: CacheNamespace, key: &str) {
        self.namespace(namespace).invalidate(key).await;
    }

    /// Drop every entry; the next read of any key re-fetches
    pub fn clear(&self) {
        self.recent.invalidate_all();
        self.all_time.invalidate_all();
        self.external.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    fn settings(ttl: Duration) -> CacheSettings {
        CacheSettings {
            recent_ttl: ttl,
            all_time_ttl: MINUTE,
            external_ttl: MINUTE,
            max_entries: 10,
        }
    }

    #[tokio::test]
    async fn test_insert_then_get_returns_same_value() {
        let cache = TtlCache::new(&settings(MINUTE));
        let stored = cache
            .insert(CacheNamespace::Recent, "nlp_transfers_30", vec![1u64, 2, 3])
            .await;

        let hit = cache
            .get::<Vec<u64>>(CacheNamespace::Recent, "nlp_transfers_30")
            .await
            .unwrap();
        assert!(Arc::ptr_eq(&stored, &hit));
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let cache = TtlCache::new(&settings(Duration::from_millis(20)));
        cache.insert(CacheNamespace::Recent, "k", 7u32).await;

        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(cache.get::<u32>(CacheNamespace::Recent, "k").await.is_none());
    }

    #[tokio::test]
    async fn test_type_mismatch_is_a_miss() {
        let cache = TtlCache::new(&settings(MINUTE));
        cache.insert(CacheNamespace::Recent, "k", 7u32).await;

        assert!(cache.get::<String>(CacheNamespace::Recent, "k").await.is_none());
    }

    #[tokio::test]
    async fn test_namespaces_are_separate() {
        let cache = TtlCache::new(&settings(MINUTE));
        cache.insert(CacheNamespace::Recent, "k", 1u8).await;

        assert!(cache.get::<u8>(CacheNamespace::External, "k").await.is_none());
    }

    #[tokio::test]
    async fn test_huge_ttl_is_clamped() {
        let cache = TtlCache::new(&settings(Duration::from_secs(u64::MAX)));
        cache.insert(CacheNamespace::Recent, "k", 1u8).await;

        assert_eq!(cache.get::<u8>(CacheNamespace::Recent, "k").await.as_deref(), Some(&1));
    }

    #[tokio::test]
    async fn test_second_fetch_within_ttl_is_served_from_cache() {
        let cache = TtlCache::new(&settings(MINUTE));
        let calls = AtomicUsize::new(0);
        let counter = &calls;

        let fetch = move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(vec!["swap".to_string()])
        };

        let first = cache
            .get_or_try_fetch(CacheNamespace::Recent, "pendle_swaps_7", fetch)
            .await
            .unwrap();
        let second = cache
            .get_or_try_fetch(CacheNamespace::Recent, "pendle_swaps_7", fetch)
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let cache = TtlCache::new(&settings(MINUTE));
        let calls = AtomicUsize::new(0);
        let counter = &calls;

        let failing = move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err::<u32, _>("upstream down")
        };

        assert!(cache.get_or_try_fetch(CacheNamespace::Recent, "k", failing).await.is_err());
        assert!(cache.get_or_try_fetch(CacheNamespace::Recent, "k", failing).await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_clear_forces_refetch() {
        let cache = TtlCache::new(&settings(MINUTE));
        cache.insert(CacheNamespace::Recent, "a", 1u8).await;
        cache.insert(CacheNamespace::External, "b", 2u8).await;

        cache.clear();

        assert!(cache.get::<u8>(CacheNamespace::Recent, "a").await.is_none());
        assert!(cache.get::<u8>(CacheNamespace::External, "b").await.is_none());
    }

    #[tokio::test]
    async fn test_remove_drops_one_key() {
        let cache = TtlCache::new(&settings(MINUTE));
        cache.insert(CacheNamespace::AllTime, "a", 1u8).await;
        cache.insert(CacheNamespace::AllTime, "b", 2u8).await;

        cache.remove(CacheNamespace::AllTime, "a").await;

        assert!(cache.get::<u8>(CacheNamespace::AllTime, "a").await.is_none());
        assert_eq!(cache.get::<u8>(CacheNamespace::AllTime, "b").await.as_deref(), Some(&2));
    }
}
