//! Read-through cache for normalized platform stats.
//!
//! Entries are keyed `stats_<platform>` and live for the configured TTL.
//! Concurrent misses for the same key each hit the vendor; the last write wins.

use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::error::StatsError;
use crate::platforms::{Platform, StatsResult};

struct CachedStats {
    stats: StatsResult,
    fetched_at: Instant,
}

pub struct StatsCache {
    entries: RwLock<HashMap<String, CachedStats>>,
    /// `None` disables caching entirely.
    ttl: Option<Duration>,
}

impl StatsCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: Some(ttl).filter(|t| !t.is_zero()),
        }
    }

    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.ttl.is_some()
    }

    /// Fresh cached stats for `platform`, if any.
    pub async fn get(&self, platform: Platform) -> Option<StatsResult> {
        let ttl = self.ttl?;
        let entries = self.entries.read().await;
        entries
            .get(&platform.cache_key())
            .filter(|e| e.fetched_at.elapsed() < ttl)
            .map(|e| e.stats.clone())
    }

    pub async fn put(&self, platform: Platform, stats: StatsResult) {
        if self.ttl.is_none() {
            return;
        }
        let mut entries = self.entries.write().await;
        entries.insert(
            platform.cache_key(),
            CachedStats {
                stats,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Serve from cache, or run `fetch` and remember a successful result.
    /// Errors are returned as-is and never cached.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        platform: Platform,
        fetch: F,
    ) -> Result<StatsResult, StatsError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<StatsResult, StatsError>>,
    {
        if let Some(hit) = self.get(platform).await {
            tracing::debug!(%platform, "Stats cache hit");
            return Ok(hit);
        }

        let stats = fetch().await?;
        self.put(platform, stats.clone()).await;
        Ok(stats)
    }

    /// Drop expired entries.
    pub async fn purge_expired(&self) -> usize {
        let Some(ttl) = self.ttl else {
            return 0;
        };
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| e.fetched_at.elapsed() < ttl);
        before - entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn counted(calls: &AtomicUsize, subscribers: u64) -> Result<StatsResult, StatsError> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(StatsResult::subscribers(subscribers))
    }

    #[tokio::test]
    async fn test_second_read_is_served_from_cache() {
        let cache = StatsCache::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);

        let first = cache
            .get_or_fetch(Platform::X, || counted(&calls, 10))
            .await
            .unwrap();
        let second = cache
            .get_or_fetch(Platform::X, || counted(&calls, 20))
            .await
            .unwrap();

        assert_eq!(first.subscribers, 10);
        assert_eq!(second.subscribers, 10);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_keys_are_per_platform() {
        let cache = StatsCache::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);

        cache
            .get_or_fetch(Platform::X, || counted(&calls, 1))
            .await
            .unwrap();
        let other = cache
            .get_or_fetch(Platform::Telegram, || counted(&calls, 2))
            .await
            .unwrap();

        assert_eq!(other.subscribers, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_expired_entry_is_refetched() {
        let cache = StatsCache::new(Duration::from_millis(10));
        let calls = AtomicUsize::new(0);

        cache
            .get_or_fetch(Platform::Youtube, || counted(&calls, 1))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.purge_expired().await, 1);

        let fresh = cache
            .get_or_fetch(Platform::Youtube, || counted(&calls, 2))
            .await
            .unwrap();
        assert_eq!(fresh.subscribers, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache = StatsCache::new(Duration::from_secs(60));

        let err = cache
            .get_or_fetch(Platform::Pinterest, || async {
                Err(StatsError::UpstreamStatus {
                    platform: "Pinterest",
                    status: 500,
                })
            })
            .await;
        assert!(err.is_err());
        assert_eq!(cache.get(Platform::Pinterest).await, None);
    }

    #[tokio::test]
    async fn test_disabled_cache_always_fetches() {
        for cache in [StatsCache::disabled(), StatsCache::new(Duration::ZERO)] {
            assert!(!cache.is_enabled());
            let calls = AtomicUsize::new(0);
            for _ in 0..3 {
                cache
                    .get_or_fetch(Platform::Tiktok, || counted(&calls, 5))
                    .await
                    .unwrap();
            }
            assert_eq!(calls.load(Ordering::SeqCst), 3);
        }
    }
}
