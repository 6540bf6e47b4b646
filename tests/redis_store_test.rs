//! Integration tests against a live Redis server
//!
//! These need a reachable Redis instance and are ignored by default:
//!   docker run -d -p 6379:6379 redis:7
//!   cargo test --test redis_store_test -- --ignored
//!
//! Connection settings come from REDIS_HOST / REDIS_PORT / REDIS_DB.

use redis_memo::{
    cache, cache_clear, cache_update, CallArgs, RedisBackend, StoreAdapter, StoreConfig,
};
use std::sync::Arc;
use std::time::Duration;

fn redis_config() -> StoreConfig {
    StoreConfig::from_env().expect("invalid REDIS_* environment")
}

// Namespaces are unique per test run so parallel tests never collide
fn unique_namespace(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("redis-memo-test:{}:{}", prefix, nanos)
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let backend = RedisBackend::new(redis_config()).unwrap();

    assert!(backend.health_check().await.unwrap());
    assert!(backend.is_connected().await);

    backend.shutdown().await;
    assert!(!backend.is_connected().await);
    assert!(backend.health_check().await.unwrap_err().is_store_unavailable());
}

#[tokio::test]
#[ignore]
async fn test_set_get_clear_roundtrip() {
    let store = StoreAdapter::redis(redis_config()).unwrap();
    let ns = unique_namespace("roundtrip");

    store.set(&ns, "1", "a", Some(30)).await.unwrap();
    store.set(&ns, "2", "b", None).await.unwrap();

    assert_eq!(store.get(&ns, "1").await.unwrap(), Some("a".to_string()));
    assert_eq!(store.get(&ns, "missing").await.unwrap(), None);

    assert_eq!(store.clear(&ns).await.unwrap(), 2);
    assert_eq!(store.get(&ns, "1").await.unwrap(), None);
    assert_eq!(store.clear(&ns).await.unwrap(), 0);

    store.shutdown().await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_namespace_expiry() {
    let store = StoreAdapter::redis(redis_config()).unwrap();
    let ns = unique_namespace("expiry");

    store.set(&ns, "1", "a", Some(1)).await.unwrap();
    store.set(&ns, "2", "b", None).await.unwrap();

    tokio::time::sleep(Duration::from_millis(1500)).await;

    assert_eq!(store.get(&ns, "1").await.unwrap(), None);
    assert_eq!(store.get(&ns, "2").await.unwrap(), None);
}

#[tokio::test]
#[ignore]
async fn test_decorators_against_redis() {
    let backend = Arc::new(RedisBackend::new(redis_config()).unwrap());
    let store = StoreAdapter::new(backend.clone());
    let ns = unique_namespace("decorators");

    let reader = cache(&store, Some(ns.as_str()), 30)
        .unwrap()
        .decorate(|| async { Ok::<_, anyhow::Error>(49) });
    let updater = cache_update(&store, &ns, 30)
        .unwrap()
        .decorate(|| async { Ok::<_, anyhow::Error>(50) });
    let clear = cache_clear(&store, &ns).unwrap().decorate(|| ());
    let args = CallArgs::new().arg(7);

    assert!(!reader.call(&args).await.unwrap().is_hit());
    assert_eq!(reader.call(&args).await.unwrap().into_string(), "49");

    assert_eq!(updater.call(&args).await.unwrap(), 50);
    assert_eq!(reader.call(&args).await.unwrap().into_string(), "50");

    clear.call(&args).await.unwrap();
    assert!(!reader.call(&args).await.unwrap().is_hit());

    clear.call(&args).await.unwrap();
    backend.shutdown().await;
}
