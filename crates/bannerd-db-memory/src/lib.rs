//! In-memory storage backend for bannerd.
//!
//! Implements [`BannerStorage`] and [`UserStorage`] from `bannerd-storage`
//! without any external service. Used for development mode and tests.
//!
//! # Example
//!
//! ```ignore
//! use bannerd_db_memory::InMemoryStorage;
//! use bannerd_storage::{BannerFilter, BannerStorage};
//!
//! let storage = InMemoryStorage::new();
//! let banner = storage.create(&new_banner, bannerd_core::now_utc()).await?;
//! let all = storage.list(&BannerFilter::new()).await?;
//! ```

pub mod storage;

pub use bannerd_storage::{BannerStorage, StorageError, UserStorage};
pub use storage::InMemoryStorage;

/// Creates a new in-memory storage behind a shareable handle.
pub fn create_storage() -> std::sync::Arc<InMemoryStorage> {
    std::sync::Arc::new(InMemoryStorage::new())
}
