pub mod bootstrap;
pub mod cache;
pub mod config;
pub mod error;
pub mod handlers;
pub mod observability;
pub mod server;
pub mod service;

pub use cache::{CacheBackend, CacheError, CachedEntry, ReadCache, create_cache_backend};
pub use config::{AppConfig, CacheConfig, RedisConfig, StorageBackend};
pub use error::ApiError;
pub use observability::init_tracing;
pub use server::{AppState, BannerServer, ServerBuilder, build_app, build_state};
pub use service::{BannerService, CacheSynchronizer, ServiceError, SweepReport, SyncHandle};
