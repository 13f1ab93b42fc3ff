//! In-process TTL cache
//!
//! Default `DetailCache` implementation. Expiry is lazy on read plus a
//! periodic sweep; deletes are handled by explicit prefix eviction since
//! TTL alone would leave orphaned entries around for hours.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use super::DetailCache;

struct Entry {
    value: String,
    expires_at: Instant,
}

/// Thread-safe in-memory cache with per-entry TTL
#[derive(Clone, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired entry; returns how many were removed
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| e.expires_at > now);
        before - entries.len()
    }

    /// Number of live (possibly expired, not yet swept) entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl DetailCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(e) if e.expires_at > Instant::now() => return Ok(Some(e.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Expired: drop it so the map does not accumulate dead keys
        let mut entries = self.entries.write().await;
        if let Some(e) = entries.get(key) {
            if e.expires_at <= Instant::now() {
                entries.remove(key);
            }
        }
        Ok(None)
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn remove_prefix(&self, prefix: &str) -> Result<usize> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|k, _| !k.starts_with(prefix));
        Ok(before - entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_put_get() {
        let cache = MemoryCache::new();
        cache
            .put("writing_question:a:uncomplete:1", "{}".to_string(), LONG)
            .await
            .unwrap();

        let hit = cache.get("writing_question:a:uncomplete:1").await.unwrap();
        assert_eq!(hit.as_deref(), Some("{}"));

        let miss = cache.get("writing_question:a:complete:1").await.unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let cache = MemoryCache::new();
        cache
            .put("k", "v".to_string(), Duration::from_millis(10))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;

        assert!(cache.get("k").await.unwrap().is_none());
        // Lazy eviction removed the dead key
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_overwrite_refreshes_value() {
        let cache = MemoryCache::new();
        cache.put("k", "old".to_string(), LONG).await.unwrap();
        cache.put("k", "new".to_string(), LONG).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("new"));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove_prefix() {
        let cache = MemoryCache::new();
        cache
            .put("writing_question:a:uncomplete:1", "1".to_string(), LONG)
            .await
            .unwrap();
        cache
            .put("writing_question:a:complete:2", "2".to_string(), LONG)
            .await
            .unwrap();
        cache
            .put("writing_question:b:complete:1", "3".to_string(), LONG)
            .await
            .unwrap();

        let removed = cache.remove_prefix("writing_question:a:").await.unwrap();
        assert_eq!(removed, 2);
        assert!(cache
            .get("writing_question:a:complete:2")
            .await
            .unwrap()
            .is_none());
        assert!(cache
            .get("writing_question:b:complete:1")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_sweep_purges_expired_only() {
        let cache = MemoryCache::new();
        cache
            .put("dead", "x".to_string(), Duration::from_millis(10))
            .await
            .unwrap();
        cache.put("live", "y".to_string(), LONG).await.unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(cache.sweep().await, 1);
        assert_eq!(cache.len().await, 1);
        assert!(cache.get("live").await.unwrap().is_some());
    }
}
