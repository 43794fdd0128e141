//! Storage traits for the primary store.

use async_trait::async_trait;
use bannerd_core::{Banner, BannerId, BannerPatch, FeatureId, NewBanner, TagId, User};
use time::OffsetDateTime;

use crate::error::StorageError;
use crate::types::BannerFilter;

/// The durable banner catalog.
///
/// Writes touch the banner row and its tag associations in one atomic unit.
/// Implementations must be thread-safe (`Send + Sync`).
#[async_trait]
pub trait BannerStorage: Send + Sync {
    /// Creates a banner and its tag associations.
    ///
    /// The caller supplies the timestamp; it becomes both `created_at` and
    /// `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if another banner already claims
    /// one of the `(feature, tag)` pairs.
    async fn create(&self, banner: &NewBanner, now: OffsetDateTime)
    -> Result<Banner, StorageError>;

    /// Applies a partial update.
    ///
    /// Only supplied fields change; `updated_at` is always refreshed. A
    /// supplied tag set replaces the existing one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no banner has this id.
    /// Returns `StorageError::AlreadyExists` if the new feature/tags collide
    /// with another banner.
    async fn update(
        &self,
        id: BannerId,
        patch: &BannerPatch,
        now: OffsetDateTime,
    ) -> Result<(), StorageError>;

    /// Lists banners matching the filter, ascending by id, each with its full
    /// tag set. Pagination is applied by the backend.
    async fn list(&self, filter: &BannerFilter) -> Result<Vec<Banner>, StorageError>;

    /// Fetches the banner for `(feature_id, tag_id)` if the named user may see it.
    ///
    /// The visibility check and the existence check are one query, so an
    /// unknown user, a user who owns neither the tag nor admin rights, and a
    /// missing banner all produce `StorageError::NotFound`.
    async fn get_authorized(
        &self,
        feature_id: FeatureId,
        tag_id: TagId,
        user_name: &str,
    ) -> Result<Banner, StorageError>;

    /// Deletes a banner and its tag associations.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no banner has this id.
    async fn delete(&self, id: BannerId) -> Result<(), StorageError>;

    /// Returns the name of this storage backend for logging.
    fn backend_name(&self) -> &'static str;
}

/// User lookup and provisioning.
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Finds a user by name. Returns `None` if the user does not exist.
    async fn find_by_name(&self, name: &str) -> Result<Option<User>, StorageError>;

    /// Creates a user with its owned tags.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::AlreadyExists` if the name is taken.
    async fn create_user(&self, user: &User) -> Result<(), StorageError>;
}
