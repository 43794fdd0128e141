//! Banner reads and writes.
//!
//! Writes take a transaction so the banner row and its `banner_tags` rows
//! change together.

use bannerd_core::{Banner, BannerId, BannerKey, BannerPatch, FeatureId, NewBanner, TagId};
use bannerd_storage::{BannerFilter, StorageError};
use serde_json::Value;
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use sqlx_postgres::{PgConnection, PgPool};
use time::OffsetDateTime;

use super::catalog::{BANNER_COLUMNS, CatalogQuery};
use crate::error::classify;

/// `(id, feature_id, tag_ids, content, is_active, created_at, updated_at)`
type BannerRow = (
    i64,
    i64,
    Vec<i64>,
    Value,
    bool,
    OffsetDateTime,
    OffsetDateTime,
);

fn into_banner(row: BannerRow) -> Result<Banner, StorageError> {
    let (id, feature_id, tag_ids, content, is_active, created_at, updated_at) = row;
    let Value::Object(content) = content else {
        return Err(StorageError::internal(format!(
            "banner {id} content is not a JSON object"
        )));
    };
    Ok(Banner {
        id,
        feature_id,
        tag_ids,
        content,
        is_active,
        created_at,
        updated_at,
    })
}

async fn insert_tags(
    conn: &mut PgConnection,
    banner_id: BannerId,
    feature_id: FeatureId,
    tag_ids: &[TagId],
) -> Result<(), StorageError> {
    query(
        "INSERT INTO banner_tags (banner_id, feature_id, tag_id, position) \
         SELECT $1, $2, t.tag_id, t.ord::int \
         FROM UNNEST($3::bigint[]) WITH ORDINALITY AS t(tag_id, ord)",
    )
    .bind(banner_id)
    .bind(feature_id)
    .bind(tag_ids)
    .execute(conn)
    .await
    .map_err(classify)?;
    Ok(())
}

pub async fn create(
    pool: &PgPool,
    banner: &NewBanner,
    now: OffsetDateTime,
) -> Result<Banner, StorageError> {
    let mut tx = pool.begin().await.map_err(classify)?;

    let (id,): (i64,) = query_as(
        "INSERT INTO banners (feature_id, content, is_active, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $4) RETURNING id",
    )
    .bind(banner.feature_id)
    .bind(Value::Object(banner.content.clone()))
    .bind(banner.is_active)
    .bind(now)
    .fetch_one(&mut *tx)
    .await
    .map_err(classify)?;

    insert_tags(&mut *tx, id, banner.feature_id, &banner.tag_ids).await?;

    tx.commit()
        .await
        .map_err(|e| StorageError::transaction_error(e.to_string()))?;

    Ok(Banner {
        id,
        feature_id: banner.feature_id,
        tag_ids: banner.tag_ids.clone(),
        content: banner.content.clone(),
        is_active: banner.is_active,
        created_at: now,
        updated_at: now,
    })
}

pub async fn update(
    pool: &PgPool,
    id: BannerId,
    patch: &BannerPatch,
    now: OffsetDateTime,
) -> Result<(), StorageError> {
    let mut tx = pool.begin().await.map_err(classify)?;

    let content: Option<Value> = patch.content.clone().map(Value::Object);
    let updated: Option<(i64,)> = query_as(
        "UPDATE banners SET \
             feature_id = COALESCE($2, feature_id), \
             content = COALESCE($3, content), \
             is_active = COALESCE($4, is_active), \
             updated_at = $5 \
         WHERE id = $1 RETURNING feature_id",
    )
    .bind(id)
    .bind(patch.feature_id)
    .bind(content)
    .bind(patch.is_active)
    .bind(now)
    .fetch_optional(&mut *tx)
    .await
    .map_err(classify)?;

    // Zero rows affected; dropping `tx` rolls back.
    let Some((feature_id,)) = updated else {
        return Err(StorageError::not_found("banner", id));
    };

    match (&patch.tag_ids, patch.feature_id) {
        (Some(tag_ids), _) => {
            query("DELETE FROM banner_tags WHERE banner_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(classify)?;
            insert_tags(&mut *tx, id, feature_id, tag_ids).await?;
        }
        (None, Some(_)) => {
            query("UPDATE banner_tags SET feature_id = $2 WHERE banner_id = $1")
                .bind(id)
                .bind(feature_id)
                .execute(&mut *tx)
                .await
                .map_err(classify)?;
        }
        (None, None) => {}
    }

    tx.commit()
        .await
        .map_err(|e| StorageError::transaction_error(e.to_string()))
}

pub async fn list(pool: &PgPool, filter: &BannerFilter) -> Result<Vec<Banner>, StorageError> {
    let built = CatalogQuery::new(*filter).build();

    let mut q = query_as::<_, BannerRow>(&built.sql);
    for param in built.params {
        q = q.bind(param);
    }

    let rows = q.fetch_all(pool).await.map_err(classify)?;
    rows.into_iter().map(into_banner).collect()
}

/// Returns the banner for the pair only if the user is an admin or owns the tag.
pub async fn get_authorized(
    pool: &PgPool,
    feature_id: FeatureId,
    tag_id: TagId,
    user_name: &str,
) -> Result<Banner, StorageError> {
    let sql = format!(
        "SELECT {BANNER_COLUMNS} \
         FROM banner_tags t \
         JOIN banners b ON b.id = t.banner_id \
         JOIN users u ON u.name = $3 \
         WHERE t.feature_id = $1 AND t.tag_id = $2 \
           AND (u.is_admin OR EXISTS ( \
               SELECT 1 FROM user_tags ut WHERE ut.user_id = u.id AND ut.tag_id = $2))"
    );

    let row: Option<BannerRow> = query_as(&sql)
        .bind(feature_id)
        .bind(tag_id)
        .bind(user_name)
        .fetch_optional(pool)
        .await
        .map_err(classify)?;

    match row {
        Some(row) => into_banner(row),
        None => Err(StorageError::not_found(
            "banner",
            BannerKey::new(feature_id, tag_id),
        )),
    }
}

pub async fn delete(pool: &PgPool, id: BannerId) -> Result<(), StorageError> {
    // banner_tags rows go with the banner via ON DELETE CASCADE.
    let result = query("DELETE FROM banners WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(classify)?;

    if result.rows_affected() == 0 {
        return Err(StorageError::not_found("banner", id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bannerd_core::BannerContent;
    use serde_json::json;

    fn row(content: Value) -> BannerRow {
        (
            1,
            7,
            vec![5, 3],
            content,
            true,
            OffsetDateTime::UNIX_EPOCH,
            OffsetDateTime::UNIX_EPOCH,
        )
    }

    #[test]
    fn test_into_banner_keeps_tag_order() {
        let banner = into_banner(row(json!({ "title": "t" }))).unwrap();
        assert_eq!(banner.tag_ids, vec![5, 3]);
        assert_eq!(banner.content, BannerContent::from_iter([("title".into(), json!("t"))]));
    }

    #[test]
    fn test_into_banner_rejects_non_object_as_internal() {
        let err = into_banner(row(json!([1, 2]))).unwrap_err();
        assert!(matches!(err, StorageError::Internal { .. }));
        assert!(err.is_internal());
    }
}
