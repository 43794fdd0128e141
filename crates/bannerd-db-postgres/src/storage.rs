//! PostgreSQL implementation of the storage traits.

use async_trait::async_trait;
use bannerd_core::{Banner, BannerId, BannerPatch, FeatureId, NewBanner, TagId, User};
use bannerd_storage::{BannerFilter, BannerStorage, StorageError, UserStorage};
use sqlx_postgres::PgPool;
use time::OffsetDateTime;
use tracing::instrument;

use crate::config::PostgresConfig;
use crate::queries::{banner, user};
use crate::{migrations, pool};

/// PostgreSQL-backed banner catalog and user store.
#[derive(Debug, Clone)]
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    /// Creates a new `PostgresStorage` with the given configuration.
    ///
    /// Creates the connection pool, then runs migrations if configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection pool cannot be created
    /// or if migrations fail.
    pub async fn new(config: PostgresConfig) -> Result<Self, StorageError> {
        let pool = pool::create_pool(&config).await?;

        if config.run_migrations {
            migrations::run(&pool).await?;
        }

        Ok(Self { pool })
    }

    /// Creates a new `PostgresStorage` from an existing connection pool.
    ///
    /// Migrations are not run automatically when using this constructor.
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Checks that the database answers.
    pub async fn ping(&self) -> Result<(), StorageError> {
        pool::ping(&self.pool).await.map_err(StorageError::from)
    }
}

#[async_trait]
impl BannerStorage for PostgresStorage {
    #[instrument(skip(self, banner), fields(feature_id = banner.feature_id))]
    async fn create(
        &self,
        banner: &NewBanner,
        now: OffsetDateTime,
    ) -> Result<Banner, StorageError> {
        banner::create(&self.pool, banner, now).await
    }

    #[instrument(skip(self, patch))]
    async fn update(
        &self,
        id: BannerId,
        patch: &BannerPatch,
        now: OffsetDateTime,
    ) -> Result<(), StorageError> {
        banner::update(&self.pool, id, patch, now).await
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: &BannerFilter) -> Result<Vec<Banner>, StorageError> {
        banner::list(&self.pool, filter).await
    }

    #[instrument(skip(self))]
    async fn get_authorized(
        &self,
        feature_id: FeatureId,
        tag_id: TagId,
        user_name: &str,
    ) -> Result<Banner, StorageError> {
        banner::get_authorized(&self.pool, feature_id, tag_id, user_name).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: BannerId) -> Result<(), StorageError> {
        banner::delete(&self.pool, id).await
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

#[async_trait]
impl UserStorage for PostgresStorage {
    async fn find_by_name(&self, name: &str) -> Result<Option<User>, StorageError> {
        user::find_by_name(&self.pool, name).await
    }

    async fn create_user(&self, new_user: &User) -> Result<(), StorageError> {
        user::create(&self.pool, new_user).await
    }
}
