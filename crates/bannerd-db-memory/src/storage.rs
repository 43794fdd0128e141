use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use bannerd_core::{
    Banner, BannerId, BannerKey, BannerPatch, FeatureId, NewBanner, TagId, User, can_view,
};
use bannerd_storage::{BannerFilter, BannerStorage, StorageError, UserStorage};
use papaya::HashMap as PapayaHashMap;
use time::OffsetDateTime;
use tokio::sync::RwLock;

/// Banner rows plus the `(feature, tag)` ownership index.
///
/// Both live under one lock so a write and its tag associations land
/// together, the way a single database transaction would.
#[derive(Debug, Default)]
struct Catalog {
    banners: BTreeMap<BannerId, Banner>,
    pairs: HashMap<BannerKey, BannerId>,
    next_id: BannerId,
}

impl Catalog {
    fn keys(feature_id: FeatureId, tag_ids: &[TagId]) -> impl Iterator<Item = BannerKey> + '_ {
        tag_ids
            .iter()
            .map(move |&tag_id| BannerKey::new(feature_id, tag_id))
    }

    /// Fails if any pair is owned by a banner other than `owner`.
    fn check_free(
        &self,
        feature_id: FeatureId,
        tag_ids: &[TagId],
        owner: Option<BannerId>,
    ) -> Result<(), StorageError> {
        for key in Self::keys(feature_id, tag_ids) {
            match self.pairs.get(&key) {
                Some(&id) if Some(id) != owner => {
                    return Err(StorageError::already_exists("banner tag", key));
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn unlink(&mut self, banner: &Banner) {
        for key in Self::keys(banner.feature_id, &banner.tag_ids) {
            self.pairs.remove(&key);
        }
    }

    fn link(&mut self, banner: &Banner) {
        for key in Self::keys(banner.feature_id, &banner.tag_ids) {
            self.pairs.insert(key, banner.id);
        }
    }
}

/// In-memory banner catalog and user store.
///
/// Banners sit behind a `tokio::sync::RwLock`; users are read far more often
/// than written and use a papaya lock-free map.
#[derive(Debug)]
pub struct InMemoryStorage {
    catalog: Arc<RwLock<Catalog>>,
    users: Arc<PapayaHashMap<String, User>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            catalog: Arc::new(RwLock::new(Catalog {
                next_id: 1,
                ..Catalog::default()
            })),
            users: Arc::new(PapayaHashMap::new()),
        }
    }

    /// Number of stored banners.
    pub async fn banner_count(&self) -> usize {
        self.catalog.read().await.banners.len()
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BannerStorage for InMemoryStorage {
    async fn create(
        &self,
        banner: &NewBanner,
        now: OffsetDateTime,
    ) -> Result<Banner, StorageError> {
        let mut catalog = self.catalog.write().await;
        catalog.check_free(banner.feature_id, &banner.tag_ids, None)?;

        let id = catalog.next_id;
        catalog.next_id += 1;

        let stored = Banner {
            id,
            feature_id: banner.feature_id,
            tag_ids: banner.tag_ids.clone(),
            content: banner.content.clone(),
            is_active: banner.is_active,
            created_at: now,
            updated_at: now,
        };
        catalog.link(&stored);
        catalog.banners.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(
        &self,
        id: BannerId,
        patch: &BannerPatch,
        now: OffsetDateTime,
    ) -> Result<(), StorageError> {
        let mut catalog = self.catalog.write().await;
        let Some(current) = catalog.banners.get(&id).cloned() else {
            return Err(StorageError::not_found("banner", id));
        };

        let mut updated = current.clone();
        updated.apply(patch, now);
        catalog.check_free(updated.feature_id, &updated.tag_ids, Some(id))?;

        catalog.unlink(&current);
        catalog.link(&updated);
        catalog.banners.insert(id, updated);
        Ok(())
    }

    async fn list(&self, filter: &BannerFilter) -> Result<Vec<Banner>, StorageError> {
        let catalog = self.catalog.read().await;
        let offset = filter.offset.unwrap_or(0) as usize;
        let limit = filter.limit.map_or(usize::MAX, |l| l as usize);

        Ok(catalog
            .banners
            .values()
            .filter(|b| filter.feature_id.is_none_or(|f| b.feature_id == f))
            .filter(|b| filter.tag_id.is_none_or(|t| b.has_tag(t)))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn get_authorized(
        &self,
        feature_id: FeatureId,
        tag_id: TagId,
        user_name: &str,
    ) -> Result<Banner, StorageError> {
        let key = BannerKey::new(feature_id, tag_id);
        let allowed = self
            .users
            .pin()
            .get(user_name)
            .is_some_and(|user| can_view(user, feature_id, tag_id));
        if !allowed {
            return Err(StorageError::not_found("banner", key));
        }

        let catalog = self.catalog.read().await;
        catalog
            .pairs
            .get(&key)
            .and_then(|id| catalog.banners.get(id))
            .cloned()
            .ok_or_else(|| StorageError::not_found("banner", key))
    }

    async fn delete(&self, id: BannerId) -> Result<(), StorageError> {
        let mut catalog = self.catalog.write().await;
        let Some(removed) = catalog.banners.remove(&id) else {
            return Err(StorageError::not_found("banner", id));
        };
        catalog.unlink(&removed);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[async_trait]
impl UserStorage for InMemoryStorage {
    async fn find_by_name(&self, name: &str) -> Result<Option<User>, StorageError> {
        Ok(self.users.pin().get(name).cloned())
    }

    async fn create_user(&self, user: &User) -> Result<(), StorageError> {
        let users = self.users.pin();
        if users.try_insert(user.name.clone(), user.clone()).is_err() {
            return Err(StorageError::already_exists("user", &user.name));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bannerd_core::BannerContent;
    use serde_json::json;

    fn content(title: &str) -> BannerContent {
        json!({ "title": title }).as_object().cloned().unwrap()
    }

    fn new_banner(feature_id: FeatureId, tag_ids: &[TagId]) -> NewBanner {
        NewBanner {
            feature_id,
            tag_ids: tag_ids.to_vec(),
            content: content("hello"),
            is_active: true,
        }
    }

    fn now() -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }

    #[tokio::test]
    async fn test_create_assigns_ids_and_timestamps() {
        let storage = InMemoryStorage::new();
        let at = now();

        let first = storage.create(&new_banner(1, &[1, 2]), at).await.unwrap();
        let second = storage.create(&new_banner(2, &[1]), at).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.created_at, at);
        assert_eq!(first.updated_at, at);
        assert_eq!(first.tag_ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_create_rejects_claimed_pair() {
        let storage = InMemoryStorage::new();
        storage.create(&new_banner(7, &[3, 5]), now()).await.unwrap();

        let err = storage
            .create(&new_banner(7, &[5, 9]), now())
            .await
            .unwrap_err();
        assert!(err.is_already_exists());
        assert_eq!(storage.banner_count().await, 1);

        // Same tag under another feature is a different pair.
        storage.create(&new_banner(8, &[5]), now()).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_partial_fields() {
        let storage = InMemoryStorage::new();
        let created = storage.create(&new_banner(7, &[3]), now()).await.unwrap();

        let patch = BannerPatch {
            is_active: Some(false),
            ..Default::default()
        };
        storage.update(created.id, &patch, now()).await.unwrap();

        let listed = storage.list(&BannerFilter::new()).await.unwrap();
        assert_eq!(listed[0].feature_id, 7);
        assert_eq!(listed[0].content, created.content);
        assert!(!listed[0].is_active);
        assert!(listed[0].updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_update_replaces_tags_and_reindexes() {
        let storage = InMemoryStorage::new();
        let created = storage.create(&new_banner(7, &[3, 5]), now()).await.unwrap();

        let patch = BannerPatch {
            tag_ids: Some(vec![9]),
            ..Default::default()
        };
        storage.update(created.id, &patch, now()).await.unwrap();

        // The released pair can be claimed again.
        storage.create(&new_banner(7, &[3]), now()).await.unwrap();
        let err = storage
            .create(&new_banner(7, &[9]), now())
            .await
            .unwrap_err();
        assert!(err.is_already_exists());
    }

    #[tokio::test]
    async fn test_update_conflict_leaves_banner_untouched() {
        let storage = InMemoryStorage::new();
        let a = storage.create(&new_banner(7, &[3]), now()).await.unwrap();
        storage.create(&new_banner(7, &[5]), now()).await.unwrap();

        let patch = BannerPatch {
            tag_ids: Some(vec![5]),
            ..Default::default()
        };
        let err = storage.update(a.id, &patch, now()).await.unwrap_err();
        assert!(err.is_already_exists());

        let listed = storage
            .list(&BannerFilter::new().with_tag(3))
            .await
            .unwrap();
        assert_eq!(listed, vec![a]);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let storage = InMemoryStorage::new();
        storage.create(&new_banner(1, &[1]), now()).await.unwrap();

        let err = storage
            .update(42, &BannerPatch::default(), now())
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = storage.delete(42).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(storage.banner_count().await, 1);
    }

    #[tokio::test]
    async fn test_delete_releases_pairs() {
        let storage = InMemoryStorage::new();
        let created = storage.create(&new_banner(1, &[1]), now()).await.unwrap();

        storage.delete(created.id).await.unwrap();
        assert_eq!(storage.banner_count().await, 0);
        storage.create(&new_banner(1, &[1]), now()).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_filters_and_pages() {
        let storage = InMemoryStorage::new();
        for feature in 1..=3 {
            storage
                .create(&new_banner(feature, &[feature, 10]), now())
                .await
                .unwrap();
        }
        storage.create(&new_banner(4, &[4]), now()).await.unwrap();

        let by_tag = storage.list(&BannerFilter::new().with_tag(10)).await.unwrap();
        assert_eq!(by_tag.iter().map(|b| b.id).collect::<Vec<_>>(), vec![1, 2, 3]);

        let by_both = storage
            .list(&BannerFilter::new().with_feature(2).with_tag(10))
            .await
            .unwrap();
        assert_eq!(by_both.len(), 1);
        assert_eq!(by_both[0].tag_ids, vec![2, 10]);

        let page = storage
            .list(&BannerFilter::new().with_limit(2).with_offset(3))
            .await
            .unwrap();
        assert_eq!(page.iter().map(|b| b.id).collect::<Vec<_>>(), vec![4]);
    }

    #[tokio::test]
    async fn test_get_authorized_fuses_permission_and_existence() {
        let storage = InMemoryStorage::new();
        let banner = storage.create(&new_banner(7, &[3, 5]), now()).await.unwrap();
        storage
            .create_user(&User {
                name: "alice".into(),
                is_admin: false,
                tags: vec![3],
            })
            .await
            .unwrap();
        storage
            .create_user(&User {
                name: "root".into(),
                is_admin: true,
                tags: vec![],
            })
            .await
            .unwrap();

        assert_eq!(storage.get_authorized(7, 3, "alice").await.unwrap(), banner);
        assert!(storage.get_authorized(7, 5, "alice").await.unwrap_err().is_not_found());
        assert!(storage.get_authorized(7, 3, "nobody").await.unwrap_err().is_not_found());
        assert_eq!(storage.get_authorized(7, 5, "root").await.unwrap(), banner);
        assert!(storage.get_authorized(8, 5, "root").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_users() {
        let storage = InMemoryStorage::new();
        let user = User {
            name: "alice".into(),
            is_admin: false,
            tags: vec![1, 2],
        };
        storage.create_user(&user).await.unwrap();

        assert_eq!(storage.find_by_name("alice").await.unwrap(), Some(user.clone()));
        assert_eq!(storage.find_by_name("bob").await.unwrap(), None);
        assert!(storage.create_user(&user).await.unwrap_err().is_already_exists());
    }

    #[test]
    fn test_backend_name() {
        assert_eq!(InMemoryStorage::new().backend_name(), "memory");
    }
}
