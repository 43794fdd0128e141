use bannerd_core::User;
use bannerd_storage::StorageError;
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use sqlx_postgres::PgPool;

use crate::error::{classify, is_unique_violation};

pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<User>, StorageError> {
    let row: Option<(String, bool, Vec<i64>)> = query_as(
        "SELECT u.name, u.is_admin, \
             ARRAY(SELECT ut.tag_id FROM user_tags ut WHERE ut.user_id = u.id ORDER BY ut.tag_id) \
         FROM users u WHERE u.name = $1",
    )
    .bind(name)
    .fetch_optional(pool)
    .await
    .map_err(classify)?;

    Ok(row.map(|(name, is_admin, tags)| User {
        name,
        is_admin,
        tags,
    }))
}

pub async fn create(pool: &PgPool, user: &User) -> Result<(), StorageError> {
    let mut tx = pool.begin().await.map_err(classify)?;

    let (id,): (i64,) = query_as("INSERT INTO users (name, is_admin) VALUES ($1, $2) RETURNING id")
        .bind(&user.name)
        .bind(user.is_admin)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StorageError::already_exists("user", &user.name)
            } else {
                classify(e)
            }
        })?;

    query(
        "INSERT INTO user_tags (user_id, tag_id) \
         SELECT $1, t FROM UNNEST($2::bigint[]) AS t ON CONFLICT DO NOTHING",
    )
    .bind(id)
    .bind(user.tags.as_slice())
    .execute(&mut *tx)
    .await
    .map_err(classify)?;

    tx.commit()
        .await
        .map_err(|e| StorageError::transaction_error(e.to_string()))
}
