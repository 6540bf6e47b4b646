//! In-process hash store with namespace-wide expiry
//!
//! Mirrors the Redis behaviors the policy layer depends on: hashes vanish with
//! their last field, `EXPIRE` on a missing key does nothing, and a plain field
//! write keeps whatever expiry the hash already had. Time is read from
//! `tokio::time::Instant`, so a paused test runtime controls expiry.

use crate::error::{CacheError, Result};
use crate::store::backend::HashBackend;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

/// One hash: its fields and the shared deadline
#[derive(Debug, Default)]
struct Namespace {
    fields: HashMap<String, String>,
    expires_at: Option<Instant>,
}

impl Namespace {
    fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(deadline) if now >= deadline)
    }
}

/// Memory-backed `HashBackend`
#[derive(Debug)]
pub struct MemoryBackend {
    namespaces: RwLock<HashMap<String, Namespace>>,
    available: AtomicBool,
    writes: AtomicU64,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            namespaces: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
            writes: AtomicU64::new(0),
        }
    }

    /// Simulate the store going away (`false`) or coming back (`true`)
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of field writes served so far
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Remaining time-to-live of a namespace, `None` if it is missing or has no expiry
    pub async fn ttl(&self, namespace: &str) -> Option<Duration> {
        let now = Instant::now();
        let namespaces = self.namespaces.read().await;
        namespaces
            .get(namespace)
            .filter(|ns| !ns.is_expired(now))
            .and_then(|ns| ns.expires_at)
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    fn check_available(&self) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CacheError::StoreUnavailable(
                "memory backend marked unavailable".to_string(),
            ))
        }
    }

    /// Internal: drop the namespace if its deadline has passed
    fn purge_if_expired(namespaces: &mut HashMap<String, Namespace>, namespace: &str) {
        let now = Instant::now();
        if namespaces.get(namespace).is_some_and(|ns| ns.is_expired(now)) {
            debug!("Namespace expired: {}", namespace);
            namespaces.remove(namespace);
        }
    }
}

#[async_trait]
impl HashBackend for MemoryBackend {
    async fn hset(&self, namespace: &str, field: &str, value: &str) -> Result<()> {
        self.check_available()?;
        let mut namespaces = self.namespaces.write().await;
        Self::purge_if_expired(&mut namespaces, namespace);

        namespaces
            .entry(namespace.to_string())
            .or_default()
            .fields
            .insert(field.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn hget(&self, namespace: &str, field: &str) -> Result<Option<String>> {
        self.check_available()?;
        let mut namespaces = self.namespaces.write().await;
        Self::purge_if_expired(&mut namespaces, namespace);

        Ok(namespaces
            .get(namespace)
            .and_then(|ns| ns.fields.get(field))
            .cloned())
    }

    async fn hdel(&self, namespace: &str, field: &str) -> Result<bool> {
        self.check_available()?;
        let mut namespaces = self.namespaces.write().await;
        Self::purge_if_expired(&mut namespaces, namespace);

        let Some(ns) = namespaces.get_mut(namespace) else {
            return Ok(false);
        };
        let removed = ns.fields.remove(field).is_some();
        if ns.fields.is_empty() {
            namespaces.remove(namespace);
        }
        Ok(removed)
    }

    async fn hkeys(&self, namespace: &str) -> Result<Vec<String>> {
        self.check_available()?;
        let mut namespaces = self.namespaces.write().await;
        Self::purge_if_expired(&mut namespaces, namespace);

        Ok(namespaces
            .get(namespace)
            .map(|ns| ns.fields.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn expire(&self, namespace: &str, ttl_secs: u64) -> Result<()> {
        self.check_available()?;
        let mut namespaces = self.namespaces.write().await;
        Self::purge_if_expired(&mut namespaces, namespace);

        if ttl_secs == 0 {
            // Redis deletes the key outright for a non-positive ttl
            namespaces.remove(namespace);
        } else if let Some(ns) = namespaces.get_mut(namespace) {
            let deadline = Instant::now()
                .checked_add(Duration::from_secs(ttl_secs))
                .ok_or_else(|| CacheError::CommandError(format!("invalid expire time: {}", ttl_secs)))?;
            ns.expires_at = Some(deadline);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<bool> {
        Ok(self.available.load(Ordering::SeqCst))
    }

    fn backend_type(&self) -> &'static str {
        "memory"
    }
}
