//! # Caching Policy Layer
//!
//! Three decorators over a [`StoreAdapter`](crate::store::StoreAdapter):
//!
//! - [`cache`]: read-through. Hits return the stored string; misses run the
//!   wrapped thunk, store `to_string()` of the result and reset the namespace ttl.
//! - [`cache_update`]: always runs the thunk and overwrites the entry.
//! - [`cache_clear`]: deletes every field in the namespace without running anything.
//!
//! ## Keys
//!
//! The field key is the positional arguments joined with `-`; keyword
//! arguments never take part. Without an explicit name, `cache` derives the
//! namespace as `{file}-{function}-{params}` from the first call site and the
//! supplied [`FunctionSignature`], and keeps it for the decorator's lifetime.
//!
//! ## Example
//!
//! ```rust
//! use redis_memo::cache::{cache, cache_clear, CallArgs};
//! use redis_memo::StoreAdapter;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let store = StoreAdapter::memory();
//!
//! let x = 7;
//! let square = cache(&store, Some("squares"), 5)?
//!     .decorate(move || async move { Ok::<_, anyhow::Error>(x * x) });
//!
//! let args = CallArgs::new().arg(x);
//! assert!(!square.call(&args).await?.is_hit());
//! assert_eq!(square.call(&args).await?.into_string(), "49");
//!
//! cache_clear(&store, "squares")?.decorate(|| ()).call(&args).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod decorators;
pub mod key;
pub mod types;

pub use config::{CacheConfig, CacheConfigBuilder, DEFAULT_TTL_SECS, MAX_TTL_SECS};
pub use decorators::{
    cache, cache_clear, cache_update, CacheDecorator, CachedFn, ClearDecorator, ClearingFn,
    UpdateDecorator, UpdatingFn,
};
pub use key::{derive_namespace, CallArgs, FunctionSignature, KEY_DELIMITER};
pub use types::{CacheRead, CacheStats};
