//! Error types for cache operations
//!
//! Store transport failures are kept apart from everything else so callers can
//! tell "Redis is down" from a misconfigured decorator or a failing function.

use thiserror::Error;

/// Main error type for the store adapter and the caching decorators
#[derive(Error, Debug)]
pub enum CacheError {
    /// Store unreachable: connection refused, I/O failure, timeout or a shut down client
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// The store answered but rejected the command (e.g. WRONGTYPE)
    #[error("Store command failed: {0}")]
    CommandError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The wrapped function returned an error; nothing was cached
    #[error("Wrapped function failed: {0}")]
    ComputeError(anyhow::Error),
}

impl CacheError {
    /// True for transport/connectivity failures
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, CacheError::StoreUnavailable(_))
    }

    /// True for configuration problems (invalid ttl, missing cache name)
    pub fn is_config_error(&self) -> bool {
        matches!(self, CacheError::ConfigError(_))
    }
}

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

impl From<redis::RedisError> for CacheError {
    fn from(e: redis::RedisError) -> Self {
        if e.is_io_error() || e.is_connection_refusal() || e.is_connection_dropped() || e.is_timeout() {
            CacheError::StoreUnavailable(e.to_string())
        } else {
            CacheError::CommandError(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = CacheError::StoreUnavailable("connection refused".to_string());
        assert_eq!(error.to_string(), "Store unavailable: connection refused");

        let config_error = CacheError::ConfigError("ttl must be greater than 0".to_string());
        assert!(config_error.to_string().contains("ttl must be greater than 0"));

        let compute_error = CacheError::ComputeError(anyhow::anyhow!("boom"));
        assert_eq!(compute_error.to_string(), "Wrapped function failed: boom");
    }

    #[test]
    fn test_redis_command_error_is_not_unavailable() {
        let wrong_type = redis::RedisError::from((
            redis::ErrorKind::UnexpectedReturnType,
            "WRONGTYPE Operation against a key holding the wrong kind of value",
        ));
        let error: CacheError = wrong_type.into();
        assert!(matches!(error, CacheError::CommandError(_)));
        assert!(!error.is_store_unavailable());
    }

    #[test]
    fn test_redis_io_error_is_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let error: CacheError = redis::RedisError::from(io).into();
        assert!(error.is_store_unavailable());
    }

    #[test]
    fn test_error_predicates() {
        assert!(CacheError::ConfigError("x".into()).is_config_error());
        assert!(!CacheError::CommandError("x".into()).is_store_unavailable());
    }
}
