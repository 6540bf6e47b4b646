//! Namespace-scoped field storage with expiry

use crate::cache::config::MAX_TTL_SECS;
use crate::connection::{RedisBackend, StoreConfig};
use crate::error::{CacheError, Result};
use crate::store::backend::HashBackend;
use crate::store::memory::MemoryBackend;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Thin adapter over a `HashBackend`. Cloning shares the same backend.
#[derive(Clone)]
pub struct StoreAdapter {
    backend: Arc<dyn HashBackend>,
}

impl std::fmt::Debug for StoreAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreAdapter")
            .field("backend", &self.backend.backend_type())
            .finish()
    }
}

impl StoreAdapter {
    pub fn new(backend: Arc<dyn HashBackend>) -> Self {
        Self { backend }
    }

    /// Adapter over a lazily connected Redis backend
    pub fn redis(config: StoreConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(RedisBackend::new(config)?)))
    }

    /// Adapter over a fresh in-process backend
    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    pub fn backend(&self) -> &Arc<dyn HashBackend> {
        &self.backend
    }

    /// Write `value` under `field`; with `ttl_secs`, reset the whole namespace's expiry.
    /// Without it the existing expiry is left alone.
    pub async fn set(&self, namespace: &str, field: &str, value: &str, ttl_secs: Option<u64>) -> Result<()> {
        // ttl is validated before HSET
        if let Some(ttl) = ttl_secs {
            check_ttl(ttl)?;
        }

        self.backend.hset(namespace, field, value).await?;
        if let Some(ttl) = ttl_secs {
            self.set_expiry(namespace, ttl).await?;
        }
        debug!("Stored {}[{}] (ttl: {:?})", namespace, field, ttl_secs);
        Ok(())
    }

    /// Stored value, or `None` when the namespace or field is absent
    pub async fn get(&self, namespace: &str, field: &str) -> Result<Option<String>> {
        self.backend.hget(namespace, field).await
    }

    /// Set or reset the namespace time-to-live
    ///
    /// A missing namespace is left missing; a ttl of 0 deletes the namespace.
    pub async fn set_expiry(&self, namespace: &str, ttl_secs: u64) -> Result<()> {
        check_ttl(ttl_secs)?;
        self.backend.expire(namespace, ttl_secs).await
    }

    /// Delete every field currently in `namespace`, one at a time.
    ///
    /// Enumerate-then-delete is not atomic: a field written after the listing
    /// survives. Returns how many fields were actually removed.
    pub async fn clear(&self, namespace: &str) -> Result<usize> {
        let fields = self.backend.hkeys(namespace).await?;
        let mut removed = 0;

        for field in &fields {
            if self.backend.hdel(namespace, field).await? {
                removed += 1;
            }
        }

        if removed > 0 {
            info!("Cleared {} fields from namespace {}", removed, namespace);
        } else {
            debug!("Namespace {} already empty", namespace);
        }
        Ok(removed)
    }

    /// Backend liveness check
    pub async fn health_check(&self) -> Result<bool> {
        self.backend.ping().await
    }

    /// Release the backend's connection
    pub async fn shutdown(&self) -> Result<()> {
        if let Err(e) = self.backend.close().await {
            warn!("Failed to close {} backend: {}", self.backend.backend_type(), e);
            return Err(e);
        }
        Ok(())
    }
}

fn check_ttl(ttl_secs: u64) -> Result<()> {
    if ttl_secs > MAX_TTL_SECS {
        return Err(CacheError::ConfigError(format!(
            "ttl must be at most {} seconds, got {}",
            MAX_TTL_SECS, ttl_secs
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn adapter() -> (StoreAdapter, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        (StoreAdapter::new(backend.clone()), backend)
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let (store, _) = adapter();

        store.set("myns", "1", "a", None).await.unwrap();
        assert_eq!(store.get("myns", "1").await.unwrap(), Some("a".to_string()));
        assert_eq!(store.get("myns", "missing").await.unwrap(), None);
        assert_eq!(store.get("missing", "1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clear_deletes_every_field() {
        let (store, _) = adapter();
        store.set("myns", "1", "a", None).await.unwrap();
        store.set("myns", "2", "b", None).await.unwrap();
        store.set("other", "1", "z", None).await.unwrap();

        let removed = store.clear("myns").await.unwrap();

        assert_eq!(removed, 2);
        assert_eq!(store.get("myns", "1").await.unwrap(), None);
        assert_eq!(store.get("myns", "2").await.unwrap(), None);
        assert_eq!(store.get("other", "1").await.unwrap(), Some("z".to_string()));
    }

    #[tokio::test]
    async fn test_clear_empty_namespace_is_noop() {
        let (store, _) = adapter();
        assert_eq!(store.clear("nothing-here").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_set_with_ttl_resets_namespace_expiry() {
        let (store, backend) = adapter();

        store.set("ns", "1", "a", Some(100)).await.unwrap();
        store.set("ns", "2", "b", Some(10)).await.unwrap();

        let ttl = backend.ttl("ns").await.unwrap();
        assert!(ttl <= Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_set_without_ttl_keeps_expiry() {
        let (store, backend) = adapter();

        store.set("ns", "1", "a", Some(100)).await.unwrap();
        store.set("ns", "2", "b", None).await.unwrap();

        let ttl = backend.ttl("ns").await.unwrap();
        assert!(ttl > Duration::from_secs(90));
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_expiry_resets_namespace_ttl() {
        let (store, backend) = adapter();
        store.set("ns", "1", "a", Some(100)).await.unwrap();
        store.set("ns", "2", "b", None).await.unwrap();

        tokio::time::advance(Duration::from_secs(60)).await;
        store.set_expiry("ns", 5).await.unwrap();
        assert_eq!(backend.ttl("ns").await, Some(Duration::from_secs(5)));

        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(store.get("ns", "2").await.unwrap(), Some("b".to_string()));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(store.get("ns", "1").await.unwrap(), None);
        assert_eq!(store.get("ns", "2").await.unwrap(), None);
        assert_eq!(backend.ttl("ns").await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_expiry_on_missing_namespace_is_noop() {
        let (store, backend) = adapter();

        store.set_expiry("ghost", 5).await.unwrap();
        assert_eq!(backend.ttl("ghost").await, None);

        // A later write without ttl must not inherit an expiry
        store.set("ghost", "1", "a", None).await.unwrap();
        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(store.get("ghost", "1").await.unwrap(), Some("a".to_string()));
        assert_eq!(backend.ttl("ghost").await, None);
    }

    #[tokio::test]
    async fn test_out_of_range_ttl_writes_nothing() {
        let (store, backend) = adapter();

        let err = store.set("ns", "1", "a", Some(u64::MAX)).await.unwrap_err();
        assert!(err.is_config_error());
        assert_eq!(store.get("ns", "1").await.unwrap(), None);
        assert_eq!(backend.write_count(), 0);

        assert!(store.set_expiry("ns", MAX_TTL_SECS + 1).await.unwrap_err().is_config_error());
    }

    #[tokio::test]
    async fn test_unavailable_store_propagates() {
        let (store, backend) = adapter();
        backend.set_available(false);

        assert!(store.set("ns", "1", "a", Some(5)).await.unwrap_err().is_store_unavailable());
        assert!(store.get("ns", "1").await.unwrap_err().is_store_unavailable());
        assert!(store.clear("ns").await.unwrap_err().is_store_unavailable());
    }
}
