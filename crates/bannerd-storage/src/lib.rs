//! # bannerd-storage
//!
//! Primary store contract for bannerd.
//!
//! This crate defines the traits and types that every catalog backend must
//! implement. It does not contain any implementations; those live in
//! `bannerd-db-postgres` and `bannerd-db-memory`.
//!
//! ## Overview
//!
//! [`BannerStorage`] is the durable banner catalog:
//! - filtered listing with optional feature/tag/limit/offset
//! - a point lookup that fuses the tag-ownership check with existence
//! - atomic create/update/delete of a banner together with its tags
//!
//! [`UserStorage`] resolves user names to their admin flag and owned tags.
//!
//! ## Example
//!
//! ```ignore
//! use bannerd_storage::{BannerFilter, BannerStorage, StorageError};
//!
//! async fn first_page(storage: &dyn BannerStorage) -> Result<Vec<Banner>, StorageError> {
//!     storage.list(&BannerFilter::new().with_limit(10)).await
//! }
//! ```

mod error;
mod traits;
mod types;

pub use error::{ErrorCategory, StorageError};
pub use traits::{BannerStorage, UserStorage};
pub use types::BannerFilter;

/// Type alias for a storage result.
pub type StorageResult<T> = Result<T, StorageError>;

/// Shared banner catalog handle.
pub type DynBannerStorage = std::sync::Arc<dyn BannerStorage>;

/// Shared user store handle.
pub type DynUserStorage = std::sync::Arc<dyn UserStorage>;
