use std::sync::Arc;

use bannerd_core::{
    Banner, BannerId, BannerKey, BannerPatch, Caller, FeatureId, NewBanner, TagId, can_view,
    is_visible, now_utc,
};
use bannerd_storage::{BannerFilter, DynBannerStorage};
use tracing::{debug, instrument};

use super::error::ServiceError;
use crate::cache::ReadCache;

/// Answers banner requests from the primary store or the read cache.
///
/// Never writes the cache: after a create, update or delete, the cache path
/// serves the old state until the next synchronizer sweep.
#[derive(Clone)]
pub struct BannerService {
    storage: DynBannerStorage,
    cache: Arc<dyn ReadCache>,
}

impl BannerService {
    pub fn new(storage: DynBannerStorage, cache: Arc<dyn ReadCache>) -> Self {
        Self { storage, cache }
    }

    /// Fetches the banner for `(feature_id, tag_id)` as seen by `caller`.
    ///
    /// With `use_last_revision` the answer comes only from the read cache and
    /// a miss is `NotFound`; otherwise it comes only from the primary store,
    /// which fuses the ownership check into its lookup. Either way an
    /// inactive banner is `Forbidden` to non-admins.
    #[instrument(skip(self, caller), fields(user = %caller.name))]
    pub async fn get_one_for_user(
        &self,
        caller: &Caller,
        feature_id: FeatureId,
        tag_id: TagId,
        use_last_revision: bool,
    ) -> Result<Banner, ServiceError> {
        let banner = if use_last_revision {
            // Same answer as the fused store check, decided from token claims.
            if !can_view(caller, feature_id, tag_id) {
                return Err(ServiceError::NotFound);
            }
            self.cache.get(BannerKey::new(feature_id, tag_id)).await?
        } else {
            self.storage
                .get_authorized(feature_id, tag_id, &caller.name)
                .await?
        };

        if !is_visible(caller, &banner) {
            debug!(banner_id = banner.id, "inactive banner hidden from user");
            return Err(ServiceError::Forbidden);
        }
        Ok(banner)
    }

    /// Lists the catalog. Callers must already be admin-gated.
    pub async fn list_for_admin(&self, filter: &BannerFilter) -> Result<Vec<Banner>, ServiceError> {
        Ok(self.storage.list(filter).await?)
    }

    #[instrument(skip(self, banner), fields(feature_id = banner.feature_id))]
    pub async fn create(&self, banner: NewBanner) -> Result<Banner, ServiceError> {
        banner.validate()?;
        let created = self.storage.create(&banner, now_utc()).await?;
        debug!(banner_id = created.id, "banner created");
        Ok(created)
    }

    /// Applies only the fields present in `patch`; `updated_at` always moves.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, id: BannerId, patch: BannerPatch) -> Result<(), ServiceError> {
        patch.validate()?;
        self.storage.update(id, &patch, now_utc()).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: BannerId) -> Result<(), ServiceError> {
        self.storage.delete(id).await?;
        Ok(())
    }
}
