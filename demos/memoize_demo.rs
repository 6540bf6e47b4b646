//! Memoization Demo Application
//!
//! Walks through read-through caching, forced refresh and invalidation
//! against a live Redis server.
//!
//! Usage:
//!   cargo run --example memoize_demo
//!
//! Environment variables:
//!   REDIS_HOST - Redis host (default: localhost)
//!   REDIS_PORT - Redis port (default: 6379)
//!   REDIS_DB   - Logical database index (default: 0)
//!   RUST_LOG   - Log filter (default: info)

use redis_memo::{cache, cache_clear, cache_update, signature, CallArgs, StoreAdapter, StoreConfig};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("=== Redis Memoization Demo ===");

    let config = StoreConfig::from_env()?;
    let store = StoreAdapter::redis(config)?;

    if !store.health_check().await? {
        anyhow::bail!("redis did not answer PING");
    }

    let x = Arc::new(AtomicU64::new(7));

    info!("\n--- Read-through cache (ttl 5s, derived namespace) ---");
    let decorator = cache(&store, None, 5)?;
    let compute = {
        let x = x.clone();
        decorator.decorate_with_signature(signature!(compute(x)), move || {
            let value = x.load(Ordering::SeqCst);
            info!("  compute({}) running", value);
            async move { Ok::<_, anyhow::Error>(value * value) }
        })
    };

    let first = compute.call(&CallArgs::new().arg(7)).await?;
    info!("x=7 -> {:?}", first);
    let second = compute.call(&CallArgs::new().arg(7)).await?;
    info!("x=7 again -> {:?}", second);

    x.store(8, Ordering::SeqCst);
    let third = compute.call(&CallArgs::new().arg(8)).await?;
    info!("x=8 -> {:?}", third);

    let namespace = compute
        .namespace()
        .map(str::to_string)
        .unwrap_or_default();
    info!("Derived namespace: {}", namespace);

    info!("\n--- Forced refresh ---");
    x.store(9, Ordering::SeqCst);
    let refresh = {
        let x = x.clone();
        cache_update(&store, &namespace, 5)?.decorate(move || {
            let value = x.load(Ordering::SeqCst);
            async move { Ok::<_, anyhow::Error>(value * value) }
        })
    };
    let updated = refresh.call(&CallArgs::new().arg(7)).await?;
    info!("x=7 refreshed -> {}", updated);
    info!("x=7 read back -> {:?}", compute.call(&CallArgs::new().arg(7)).await?);

    info!("\n--- Invalidation ---");
    let clear = cache_clear(&store, &namespace)?.decorate(|| ());
    clear.call(&CallArgs::new()).await?;
    info!("After clear, get({}, \"7\") -> {:?}", namespace, store.get(&namespace, "7").await?);

    info!("\nStats: {}", serde_json::to_string(&compute.stats())?);

    store.shutdown().await?;
    info!("=== Demo complete ===");
    Ok(())
}
