//! Local and Redis implementations of [`ReadCache`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bannerd_core::{Banner, BannerKey};
use dashmap::DashMap;
use deadpool_redis::Pool;
use redis::AsyncCommands;

use super::ReadCache;
use super::error::CacheError;

/// A cached banner with TTL support.
///
/// The banner is wrapped in `Arc` so hits clone a pointer, not the content.
#[derive(Clone, Debug)]
pub struct CachedEntry {
    pub banner: Arc<Banner>,
    pub cached_at: Instant,
    pub ttl: Duration,
}

impl CachedEntry {
    pub fn new(banner: Banner, ttl: Duration) -> Self {
        Self {
            banner: Arc::new(banner),
            cached_at: Instant::now(),
            ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.cached_at.elapsed() >= self.ttl
    }
}

#[derive(Clone)]
pub enum CacheBackend {
    /// Single instance: in-process map.
    Local(Arc<DashMap<BannerKey, CachedEntry>>),

    /// Shared across instances. Values are banner JSON under `banner:{f}:{t}`.
    Redis(Pool),
}

impl CacheBackend {
    pub fn new_local() -> Self {
        CacheBackend::Local(Arc::new(DashMap::new()))
    }

    pub fn new_redis(redis_pool: Pool) -> Self {
        CacheBackend::Redis(redis_pool)
    }

    pub fn stats(&self) -> CacheStats {
        match self {
            CacheBackend::Local(map) => CacheStats {
                entries: Some(map.len()),
                mode: "local",
            },
            CacheBackend::Redis(_) => CacheStats {
                entries: None,
                mode: "redis",
            },
        }
    }

    /// Readiness probe: the local backend is always available.
    pub async fn is_available(&self) -> bool {
        match self {
            CacheBackend::Local(_) => true,
            CacheBackend::Redis(redis) => redis.get().await.is_ok(),
        }
    }
}

#[async_trait]
impl ReadCache for CacheBackend {
    async fn set(&self, key: BannerKey, banner: &Banner, ttl: Duration) -> Result<(), CacheError> {
        match self {
            CacheBackend::Local(map) => {
                map.insert(key, CachedEntry::new(banner.clone(), ttl));
                Ok(())
            }
            CacheBackend::Redis(redis) => {
                let payload = serde_json::to_vec(banner)?;
                let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
                let mut conn = redis.get().await?;
                conn.pset_ex::<_, _, ()>(key.to_string(), payload, ttl_ms)
                    .await?;
                Ok(())
            }
        }
    }

    async fn get(&self, key: BannerKey) -> Result<Banner, CacheError> {
        match self {
            CacheBackend::Local(map) => {
                let Some(entry) = map.get(&key) else {
                    return Err(CacheError::miss(key));
                };
                if entry.is_expired() {
                    drop(entry);
                    map.remove_if(&key, |_, e| e.is_expired());
                    return Err(CacheError::miss(key));
                }
                Ok(Banner::clone(&entry.banner))
            }
            CacheBackend::Redis(redis) => {
                let mut conn = redis.get().await?;
                let data: Option<Vec<u8>> = conn.get(key.to_string()).await?;
                match data {
                    Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
                    None => Err(CacheError::miss(key)),
                }
            }
        }
    }

    async fn delete(&self, key: BannerKey) -> Result<(), CacheError> {
        match self {
            CacheBackend::Local(map) => {
                map.remove(&key);
                Ok(())
            }
            CacheBackend::Redis(redis) => {
                let mut conn = redis.get().await?;
                conn.del::<_, ()>(key.to_string()).await?;
                Ok(())
            }
        }
    }

    // Redis expires keys itself.
    fn purge_expired(&self) -> usize {
        match self {
            CacheBackend::Local(map) => {
                let before = map.len();
                map.retain(|_, entry| !entry.is_expired());
                before.saturating_sub(map.len())
            }
            CacheBackend::Redis(_) => 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Entry count; unknown for Redis.
    pub entries: Option<usize>,
    pub mode: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn banner(id: i64) -> Banner {
        Banner {
            id,
            feature_id: 7,
            tag_ids: vec![3, 5],
            content: Default::default(),
            is_active: true,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[tokio::test]
    async fn local_set_get_delete() {
        let cache = CacheBackend::new_local();
        let key = BannerKey::new(7, 3);

        assert!(cache.get(key).await.unwrap_err().is_miss());

        cache.set(key, &banner(1), Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get(key).await.unwrap(), banner(1));
        assert!(cache.get(BannerKey::new(3, 7)).await.unwrap_err().is_miss());

        cache.set(key, &banner(2), Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get(key).await.unwrap().id, 2);

        cache.delete(key).await.unwrap();
        assert!(cache.get(key).await.unwrap_err().is_miss());
    }

    #[tokio::test]
    async fn local_expiry() {
        let cache = CacheBackend::new_local();
        let key = BannerKey::new(7, 3);

        cache.set(key, &banner(1), Duration::from_millis(50)).await.unwrap();
        cache
            .set(BannerKey::new(7, 5), &banner(1), Duration::from_secs(60))
            .await
            .unwrap();
        assert!(cache.get(key).await.is_ok());

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(cache.get(key).await.unwrap_err().is_miss());
        assert_eq!(cache.purge_expired(), 0);
        assert_eq!(cache.stats().entries, Some(1));
    }

    #[tokio::test]
    async fn purge_drops_only_expired() {
        let cache = CacheBackend::new_local();
        cache
            .set(BannerKey::new(1, 1), &banner(1), Duration::from_millis(10))
            .await
            .unwrap();
        cache
            .set(BannerKey::new(1, 2), &banner(1), Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.purge_expired(), 1);
        assert!(cache.is_available().await);
        assert_eq!(cache.stats().mode, "local");
    }
}
