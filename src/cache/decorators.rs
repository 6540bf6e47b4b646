//! `cache`, `cache_update` and `cache_clear`
//!
//! Each constructor returns a decorator; `decorate` wraps a thunk into a
//! callable taking [`CallArgs`]. The thunk is never given the arguments: they
//! only select the field key, so the thunk must already close over whatever
//! it needs.

use crate::cache::config::CacheConfig;
use crate::cache::key::{derive_namespace, CallArgs, FunctionSignature};
use crate::cache::types::{CacheRead, CacheStats, StatsRecorder};
use crate::error::{CacheError, Result};
use crate::store::StoreAdapter;
use std::future::Future;
use std::panic::Location;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

/// Read-through decorator. `cache_name = None` derives the namespace on first call.
pub fn cache(store: &StoreAdapter, cache_name: Option<&str>, ttl_secs: u64) -> Result<CacheDecorator> {
    let mut builder = CacheConfig::builder().ttl_secs(ttl_secs);
    if let Some(name) = cache_name {
        builder = builder.cache_name(name);
    }
    CacheDecorator::new(store.clone(), builder.build())
}

/// Forced-refresh decorator for an existing namespace
pub fn cache_update(store: &StoreAdapter, cache_name: &str, ttl_secs: u64) -> Result<UpdateDecorator> {
    let config = CacheConfig::builder()
        .cache_name(cache_name)
        .ttl_secs(ttl_secs)
        .build();
    UpdateDecorator::new(store.clone(), config)
}

/// Invalidation decorator: wipes every field of `cache_name`
pub fn cache_clear(store: &StoreAdapter, cache_name: &str) -> Result<ClearDecorator> {
    let config = CacheConfig::builder().cache_name(cache_name).build();
    ClearDecorator::new(store.clone(), config)
}

/// Read-through cache decorator.
///
/// The namespace lives on the decorator: an auto-derived name is computed by
/// the first call of any wrapper it produced, and every wrapper keeps using it
/// afterwards regardless of where later calls come from.
#[derive(Debug)]
pub struct CacheDecorator {
    store: StoreAdapter,
    ttl_secs: u64,
    namespace: Arc<OnceLock<String>>,
}

impl CacheDecorator {
    pub fn new(store: StoreAdapter, config: CacheConfig) -> Result<Self> {
        config.validate()?;

        let namespace = OnceLock::new();
        if let Some(name) = config.cache_name {
            let _ = namespace.set(name);
        }

        Ok(Self {
            store,
            ttl_secs: config.ttl_secs,
            namespace: Arc::new(namespace),
        })
    }

    /// Wrap a thunk. Without an explicit cache name, calls fail with a
    /// configuration error because there is nothing to derive a name from.
    pub fn decorate<F>(&self, func: F) -> CachedFn<F> {
        self.wrap(None, func)
    }

    /// Wrap a thunk whose name and parameter names feed namespace derivation
    pub fn decorate_with_signature<F>(&self, signature: FunctionSignature, func: F) -> CachedFn<F> {
        self.wrap(Some(signature), func)
    }

    /// Current namespace; `None` until derived
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.get().map(String::as_str)
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    fn wrap<F>(&self, signature: Option<FunctionSignature>, func: F) -> CachedFn<F> {
        CachedFn {
            store: self.store.clone(),
            ttl_secs: self.ttl_secs,
            namespace: Arc::clone(&self.namespace),
            signature,
            func,
            stats: StatsRecorder::default(),
        }
    }
}

/// A thunk wrapped by [`CacheDecorator`]
pub struct CachedFn<F> {
    store: StoreAdapter,
    ttl_secs: u64,
    namespace: Arc<OnceLock<String>>,
    signature: Option<FunctionSignature>,
    func: F,
    stats: StatsRecorder,
}

impl<F> CachedFn<F> {
    /// Current namespace; `None` until derived
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.get().map(String::as_str)
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    fn resolve_namespace(&self, location: &'static Location<'static>) -> Result<&str> {
        if let Some(name) = self.namespace.get() {
            return Ok(name.as_str());
        }

        let signature = self.signature.as_ref().ok_or_else(|| {
            CacheError::ConfigError(
                "no cache_name given and no function signature to derive one from".to_string(),
            )
        })?;

        let derived = derive_namespace(location.file(), signature);
        let name = self.namespace.get_or_init(|| derived);
        info!("Derived cache namespace: {}", name);
        Ok(name.as_str())
    }
}

impl<F, Fut, T> CachedFn<F>
where
    F: Fn() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
    T: ToString,
{
    /// Return the stored value for `args`, or run the thunk, store its string
    /// form with the namespace ttl, and return the fresh value.
    ///
    /// Concurrent misses on the same key all run the thunk; the last write wins.
    #[track_caller]
    pub fn call(&self, args: &CallArgs) -> impl Future<Output = Result<CacheRead<T>>> + '_ {
        let location = Location::caller();
        let field = args.field_key();

        async move {
            let namespace = self.resolve_namespace(location)?;

            if let Some(value) = self.store.get(namespace, &field).await? {
                debug!("Cache hit: {}[{}]", namespace, field);
                self.stats.record_hit();
                return Ok(CacheRead::Hit(value));
            }

            debug!("Cache miss: {}[{}]", namespace, field);
            self.stats.record_miss();

            let result = (self.func)().await.map_err(CacheError::ComputeError)?;
            self.store
                .set(namespace, &field, &result.to_string(), Some(self.ttl_secs))
                .await?;
            Ok(CacheRead::Computed(result))
        }
    }
}

/// Forced-refresh decorator
#[derive(Debug)]
pub struct UpdateDecorator {
    store: StoreAdapter,
    cache_name: String,
    ttl_secs: u64,
}

impl UpdateDecorator {
    pub fn new(store: StoreAdapter, config: CacheConfig) -> Result<Self> {
        config.validate()?;
        let cache_name = config.require_name()?.to_string();

        Ok(Self {
            store,
            cache_name,
            ttl_secs: config.ttl_secs,
        })
    }

    pub fn decorate<F>(&self, func: F) -> UpdatingFn<F> {
        UpdatingFn {
            store: self.store.clone(),
            cache_name: self.cache_name.clone(),
            ttl_secs: self.ttl_secs,
            func,
            stats: StatsRecorder::default(),
        }
    }

    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }
}

/// A thunk wrapped by [`UpdateDecorator`]
pub struct UpdatingFn<F> {
    store: StoreAdapter,
    cache_name: String,
    ttl_secs: u64,
    func: F,
    stats: StatsRecorder,
}

impl<F> UpdatingFn<F> {
    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }
}

impl<F, Fut, T> UpdatingFn<F>
where
    F: Fn() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
    T: ToString,
{
    /// Run the thunk, overwrite `(cache_name, key(args))` and restart the
    /// namespace ttl. The cached value is never read.
    pub async fn call(&self, args: &CallArgs) -> Result<T> {
        let result = (self.func)().await.map_err(CacheError::ComputeError)?;
        let field = args.field_key();

        self.store
            .set(&self.cache_name, &field, &result.to_string(), Some(self.ttl_secs))
            .await?;
        self.stats.record_update();
        debug!("Cache update: {}[{}]", self.cache_name, field);

        Ok(result)
    }
}

/// Invalidation decorator
#[derive(Debug)]
pub struct ClearDecorator {
    store: StoreAdapter,
    cache_name: String,
}

impl ClearDecorator {
    pub fn new(store: StoreAdapter, config: CacheConfig) -> Result<Self> {
        config.validate()?;
        let cache_name = config.require_name()?.to_string();
        Ok(Self { store, cache_name })
    }

    pub fn decorate<F>(&self, func: F) -> ClearingFn<F> {
        ClearingFn {
            store: self.store.clone(),
            cache_name: self.cache_name.clone(),
            func,
            stats: StatsRecorder::default(),
        }
    }

    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }
}

/// A function wrapped by [`ClearDecorator`]; calling it never runs the function
pub struct ClearingFn<F> {
    store: StoreAdapter,
    cache_name: String,
    func: F,
    stats: StatsRecorder,
}

impl<F> ClearingFn<F> {
    /// Delete every field in the namespace. Arguments are accepted and ignored.
    pub async fn call(&self, _args: &CallArgs) -> Result<()> {
        let removed = self.store.clear(&self.cache_name).await?;
        self.stats.record_clear();
        debug!("Cache clear: {} ({} fields)", self.cache_name, removed);
        Ok(())
    }

    /// The wrapped function, untouched
    pub fn inner(&self) -> &F {
        &self.func
    }

    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }
}
