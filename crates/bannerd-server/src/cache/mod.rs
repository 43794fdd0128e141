//! Read cache of synchronized banner snapshots.
//!
//! Entries are keyed by resolved `(feature, tag)` pairs, so a banner with N
//! tags occupies N entries. Only the cache synchronizer writes; the
//! retrieval path only reads.
//!
//! ## Backends
//!
//! - **Local**: `DashMap` in this process. Per-key atomic, expiry checked on read.
//! - **Redis**: shared across instances, expiry enforced by Redis.
//!
//! If Redis is disabled or unreachable at startup, the local backend is used.

pub mod backend;
pub mod error;

use std::time::Duration;

use async_trait::async_trait;
use bannerd_core::{Banner, BannerKey};

pub use backend::{CacheBackend, CacheStats, CachedEntry};
pub use error::CacheError;

use crate::config::RedisConfig;

/// Key/value store of banner snapshots with a fixed time-to-live.
#[async_trait]
pub trait ReadCache: Send + Sync {
    /// Stores `banner` under `key`, overwriting any previous entry.
    async fn set(&self, key: BannerKey, banner: &Banner, ttl: Duration) -> Result<(), CacheError>;

    /// Reads the entry under `key`. An absent or expired entry is [`CacheError::Miss`].
    async fn get(&self, key: BannerKey) -> Result<Banner, CacheError>;

    async fn delete(&self, key: BannerKey) -> Result<(), CacheError>;

    /// Drops expired entries the store does not expire by itself.
    ///
    /// Returns the number of entries removed.
    fn purge_expired(&self) -> usize {
        0
    }
}

/// Creates the cache backend for the given configuration.
///
/// Falls back to the local backend when Redis is disabled or the first
/// connection fails.
pub async fn create_cache_backend(config: &RedisConfig) -> CacheBackend {
    if !config.enabled {
        tracing::info!("Redis disabled, using local read cache");
        return CacheBackend::new_local();
    }

    tracing::info!(url = %config.url, "Connecting to Redis");

    let mut redis_config = deadpool_redis::Config::from_url(&config.url);
    let timeout = Some(Duration::from_millis(config.timeout_ms));
    let mut pool_config = deadpool_redis::PoolConfig::new(config.pool_size);
    pool_config.timeouts.wait = timeout;
    pool_config.timeouts.create = timeout;
    pool_config.timeouts.recycle = timeout;
    redis_config.pool = Some(pool_config);

    let pool = match redis_config.create_pool(Some(deadpool_redis::Runtime::Tokio1)) {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to create Redis pool, falling back to local cache");
            return CacheBackend::new_local();
        }
    };

    match pool.get().await {
        Ok(_) => {
            tracing::info!("Connected to Redis");
            CacheBackend::new_redis(pool)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Redis unreachable, falling back to local cache");
            CacheBackend::new_local()
        }
    }
}
