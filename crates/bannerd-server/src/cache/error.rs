use bannerd_core::BannerKey;

/// Read cache failures.
///
/// A miss is an expected outcome, not a failure of the cache; callers
/// branch on [`CacheError::is_miss`].
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache miss for {key}")]
    Miss { key: BannerKey },

    #[error("cache entry could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("cache transport error: {message}")]
    Transport { message: String },
}

impl CacheError {
    #[must_use]
    pub fn miss(key: BannerKey) -> Self {
        Self::Miss { key }
    }

    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_miss(&self) -> bool {
        matches!(self, Self::Miss { .. })
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        Self::transport(err.to_string())
    }
}

impl From<deadpool_redis::PoolError> for CacheError {
    fn from(err: deadpool_redis::PoolError) -> Self {
        Self::transport(err.to_string())
    }
}
