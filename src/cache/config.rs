//! Configuration for the caching decorators

use crate::error::{CacheError, Result};
use serde::{Deserialize, Serialize};

/// Default namespace time-to-live in seconds
pub const DEFAULT_TTL_SECS: u64 = 30;

/// Largest ttl accepted for a namespace.
///
/// Redis turns an `EXPIRE` into an absolute millisecond timestamp held in an
/// `i64` and rejects anything that would overflow it; half that range stays
/// clear of the current wall-clock offset.
pub const MAX_TTL_SECS: u64 = (i64::MAX / 2_000) as u64;

/// Settings shared by `cache`, `cache_update` and `cache_clear`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Explicit namespace; `None` lets `cache` derive one on first call
    pub cache_name: Option<String>,

    /// Namespace time-to-live applied on every write, in seconds
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_name: None,
            ttl_secs: DEFAULT_TTL_SECS,
        }
    }
}

impl CacheConfig {
    /// Create a new builder for cache configuration
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.ttl_secs == 0 {
            return Err(CacheError::ConfigError(
                "ttl must be greater than 0".to_string(),
            ));
        }

        if self.ttl_secs > MAX_TTL_SECS {
            return Err(CacheError::ConfigError(format!(
                "ttl must be at most {} seconds, got {}",
                MAX_TTL_SECS, self.ttl_secs
            )));
        }

        if matches!(self.cache_name.as_deref(), Some(name) if name.is_empty()) {
            return Err(CacheError::ConfigError(
                "cache_name must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// The explicit cache name, or a configuration error for decorators that need one
    pub fn require_name(&self) -> Result<&str> {
        self.cache_name.as_deref().ok_or_else(|| {
            CacheError::ConfigError("cache_name is required".to_string())
        })
    }
}

/// Builder for cache configuration
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    cache_name: Option<String>,
    ttl_secs: Option<u64>,
}

impl CacheConfigBuilder {
    /// Set an explicit namespace
    pub fn cache_name(mut self, name: impl Into<String>) -> Self {
        self.cache_name = Some(name.into());
        self
    }

    /// Set the namespace time-to-live in seconds
    pub fn ttl_secs(mut self, ttl: u64) -> Self {
        self.ttl_secs = Some(ttl);
        self
    }

    /// Build the cache configuration
    pub fn build(self) -> CacheConfig {
        let defaults = CacheConfig::default();

        CacheConfig {
            cache_name: self.cache_name.or(defaults.cache_name),
            ttl_secs: self.ttl_secs.unwrap_or(defaults.ttl_secs),
        }
    }
}
