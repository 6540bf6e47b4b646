//! # redis-memo
//!
//! Function-level memoization backed by Redis hashes with per-namespace expiry.
//!
//! ## Features
//!
//! - Read-through caching, forced refresh and namespace invalidation decorators
//! - One Redis hash per namespace; every write restarts the whole namespace's ttl
//! - Namespace auto-derivation from call site, function name and parameter names
//! - Lazily connected, reused Redis connection with explicit shutdown
//! - In-process backend with identical semantics for tests and local runs
//!
//! ## Store layout
//!
//! A cached call lands in the hash `namespace` under the field built from its
//! positional arguments (`"7"`, `"1-abc"`, ...). Values are stored as strings
//! and come back as strings on a hit.
//!
//! ## Usage
//!
//! ```no_run
//! use redis_memo::{cache, cache_update, CallArgs, StoreAdapter, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = StoreAdapter::redis(StoreConfig::from_env()?)?;
//!
//!     let user_id = 42;
//!     let load_profile = cache(&store, Some("profiles"), 60)?
//!         .decorate(move || async move { Ok::<_, anyhow::Error>(format!("profile-{}", user_id)) });
//!
//!     let args = CallArgs::new().arg(user_id);
//!     let profile = load_profile.call(&args).await?.into_string();
//!     println!("profile: {}", profile);
//!
//!     // Refresh the entry and restart the namespace ttl
//!     let refresh = cache_update(&store, "profiles", 60)?
//!         .decorate(move || async move { Ok::<_, anyhow::Error>(format!("profile-{}-v2", user_id)) });
//!     refresh.call(&args).await?;
//!
//!     store.shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod connection;
pub mod error;
pub mod store;

// Re-export main types for convenience
pub use cache::{
    cache, cache_clear, cache_update, CacheConfig, CacheConfigBuilder, CacheDecorator, CacheRead,
    CacheStats, CachedFn, CallArgs, ClearDecorator, ClearingFn, FunctionSignature, UpdateDecorator,
    UpdatingFn, DEFAULT_TTL_SECS,
};
pub use connection::{RedisBackend, StoreConfig};
pub use error::{CacheError, Result};
pub use store::{HashBackend, MemoryBackend, StoreAdapter};
