//! Read cache against a real Redis.
//!
//! Tests use testcontainers to spin up a Redis instance shared by the file.

use std::sync::Arc;
use std::time::Duration;

use bannerd_core::{Banner, BannerKey, NewBanner, now_utc};
use bannerd_db_memory::InMemoryStorage;
use bannerd_server::cache::ReadCache;
use bannerd_server::service::CacheSynchronizer;
use bannerd_server::{RedisConfig, create_cache_backend};
use bannerd_storage::BannerStorage;
use serde_json::json;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::redis::Redis;
use tokio::sync::OnceCell;

// Shared Redis container for all tests
static SHARED_REDIS: OnceCell<(ContainerAsync<Redis>, String)> = OnceCell::const_new();

async fn get_redis_url() -> String {
    let (_, url) = SHARED_REDIS
        .get_or_init(|| async {
            let container = Redis::default()
                .start()
                .await
                .expect("start redis container");

            let host_port = container.get_host_port_ipv4(6379).await.expect("get port");
            let url = format!("redis://127.0.0.1:{host_port}");

            (container, url)
        })
        .await;

    url.clone()
}

async fn redis_config() -> RedisConfig {
    RedisConfig {
        enabled: true,
        url: get_redis_url().await,
        ..RedisConfig::default()
    }
}

fn banner(id: i64, feature_id: i64, tag_ids: &[i64]) -> Banner {
    Banner {
        id,
        feature_id,
        tag_ids: tag_ids.to_vec(),
        content: json!({ "title": "redis" }).as_object().cloned().unwrap(),
        is_active: true,
        created_at: now_utc(),
        updated_at: now_utc(),
    }
}

#[tokio::test]
async fn test_redis_backend_is_selected() {
    let cache = create_cache_backend(&redis_config().await).await;
    assert_eq!(cache.stats().mode, "redis");
    assert!(cache.is_available().await);
}

#[tokio::test]
async fn test_redis_set_get_delete() {
    let cache = create_cache_backend(&redis_config().await).await;
    let key = BannerKey::new(101, 1);
    let stored = banner(1, 101, &[1]);

    cache.set(key, &stored, Duration::from_secs(60)).await.unwrap();
    assert_eq!(cache.get(key).await.unwrap(), stored);

    cache.delete(key).await.unwrap();
    assert!(cache.get(key).await.unwrap_err().is_miss());
}

#[tokio::test]
async fn test_redis_entries_expire() {
    let cache = create_cache_backend(&redis_config().await).await;
    let key = BannerKey::new(102, 1);

    cache
        .set(key, &banner(2, 102, &[1]), Duration::from_millis(200))
        .await
        .unwrap();
    assert!(cache.get(key).await.is_ok());

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(cache.get(key).await.unwrap_err().is_miss());
}

#[tokio::test]
async fn test_redis_shared_between_backends() {
    let config = redis_config().await;
    let writer = create_cache_backend(&config).await;
    let reader = create_cache_backend(&config).await;

    let storage = Arc::new(InMemoryStorage::new());
    let created = storage
        .create(
            &NewBanner {
                feature_id: 103,
                tag_ids: vec![1, 2],
                content: json!({ "title": "shared" }).as_object().cloned().unwrap(),
                is_active: true,
            },
            now_utc(),
        )
        .await
        .unwrap();

    let sync = CacheSynchronizer::new(
        storage,
        Arc::new(writer),
        Duration::from_secs(60),
        Duration::from_secs(30),
    )
    .unwrap();
    let report = sync.sweep().await;
    assert_eq!(report.written, 2);
    assert_eq!(report.failed, 0);

    assert_eq!(reader.get(BannerKey::new(103, 1)).await.unwrap(), created);
    assert_eq!(reader.get(BannerKey::new(103, 2)).await.unwrap(), created);
}

#[tokio::test]
async fn test_unreachable_redis_falls_back_to_local() {
    let config = RedisConfig {
        enabled: true,
        url: "redis://127.0.0.1:1".into(),
        timeout_ms: 200,
        ..RedisConfig::default()
    };
    let cache = create_cache_backend(&config).await;
    assert_eq!(cache.stats().mode, "local");
}
