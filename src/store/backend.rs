//! Store protocol: the hash-map primitives the adapter is built on

use crate::error::Result;
use async_trait::async_trait;

/// A remote (or in-process) store with Redis hash semantics.
///
/// A namespace is a hash; fields live inside it and share one expiry. A
/// namespace whose last field is deleted stops existing, expiry included.
#[async_trait]
pub trait HashBackend: Send + Sync {
    /// Write `value` under `field`, creating the namespace if needed
    async fn hset(&self, namespace: &str, field: &str, value: &str) -> Result<()>;

    /// Read one field; `Ok(None)` when the namespace or field is missing
    async fn hget(&self, namespace: &str, field: &str) -> Result<Option<String>>;

    /// Delete one field, returning whether it existed
    async fn hdel(&self, namespace: &str, field: &str) -> Result<bool>;

    /// All field names currently in the namespace
    async fn hkeys(&self, namespace: &str) -> Result<Vec<String>>;

    /// Set or reset the namespace time-to-live. No-op for a missing namespace.
    async fn expire(&self, namespace: &str, ttl_secs: u64) -> Result<()>;

    /// Liveness check
    async fn ping(&self) -> Result<bool>;

    /// Release the underlying connection. Later calls fail with `StoreUnavailable`.
    async fn close(&self) -> Result<()> {
        Ok(())
    }

    /// Short backend name for logs
    fn backend_type(&self) -> &'static str;
}
