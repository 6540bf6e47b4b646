//! Redis connection management
//!
//! `RedisBackend` is the shared store handle. It is built explicitly from a
//! `StoreConfig`, connects on first use, reuses one multiplexed connection for
//! later commands, and is closed explicitly with `shutdown`. A connection that
//! fails at the transport level is discarded; the next command reconnects.

use crate::error::{CacheError, Result};
use crate::store::backend::HashBackend;
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{Client, Cmd, FromRedisValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Connection parameters for the Redis store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Redis host
    pub host: String,
    /// Redis port
    pub port: u16,
    /// Logical database index
    pub db: i64,
    /// Upper bound on establishing the connection
    pub connect_timeout: Duration,
    /// Upper bound on a single command round-trip
    pub response_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            db: 0,
            connect_timeout: Duration::from_secs(5),
            response_timeout: Duration::from_secs(5),
        }
    }
}

impl StoreConfig {
    /// Load configuration from the environment (and a `.env` file if present)
    ///
    /// Reads `REDIS_HOST`, `REDIS_PORT`, `REDIS_DB`, `REDIS_CONNECT_TIMEOUT_MS`
    /// and `REDIS_RESPONSE_TIMEOUT_MS`; anything unset keeps its default.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        let defaults = Self::default();

        Ok(Self {
            host: std::env::var("REDIS_HOST").unwrap_or(defaults.host),
            port: env_parse("REDIS_PORT")?.unwrap_or(defaults.port),
            db: env_parse("REDIS_DB")?.unwrap_or(defaults.db),
            connect_timeout: env_parse("REDIS_CONNECT_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.connect_timeout),
            response_timeout: env_parse("REDIS_RESPONSE_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.response_timeout),
        })
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_db(mut self, db: i64) -> Self {
        self.db = db;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Connection URL in `redis://host:port/db` form
    pub fn url(&self) -> String {
        format!("redis://{}:{}/{}", self.host, self.port, self.db)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(CacheError::ConfigError("host must not be empty".to_string()));
        }
        if self.db < 0 {
            return Err(CacheError::ConfigError(format!(
                "db index must be non-negative, got {}",
                self.db
            )));
        }
        if self.connect_timeout.is_zero() || self.response_timeout.is_zero() {
            return Err(CacheError::ConfigError(
                "timeouts must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| CacheError::ConfigError(format!("{} has an invalid value: {:?}", key, raw))),
        Err(_) => Ok(None),
    }
}

enum ConnectionState {
    /// Not connected yet, or the last connection broke
    Idle,
    Connected(MultiplexedConnection),
    /// `shutdown` was called; no reconnects
    Closed,
}

/// Redis-backed `HashBackend`
pub struct RedisBackend {
    client: Client,
    config: StoreConfig,
    state: Mutex<ConnectionState>,
}

impl RedisBackend {
    /// Create a backend; no connection is opened until the first command
    pub fn new(config: StoreConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::open(config.url())
            .map_err(|e| CacheError::ConfigError(format!("invalid redis url {}: {}", config.url(), e)))?;

        Ok(Self {
            client,
            config,
            state: Mutex::new(ConnectionState::Idle),
        })
    }

    /// Get the store configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Whether a live connection is currently held
    pub async fn is_connected(&self) -> bool {
        matches!(*self.state.lock().await, ConnectionState::Connected(_))
    }

    /// Send `PING`; `Ok(true)` if the server answered `PONG`
    pub async fn health_check(&self) -> Result<bool> {
        debug!("Executing redis health check (PING)");
        let pong: String = self.query(redis::cmd("PING")).await?;
        Ok(pong == "PONG")
    }

    /// Drop the connection; every later command fails with `StoreUnavailable`
    pub async fn shutdown(&self) {
        let mut state = self.state.lock().await;
        if matches!(*state, ConnectionState::Connected(_)) {
            info!("Closing redis connection to {}", self.config.url());
        }
        *state = ConnectionState::Closed;
    }

    /// Internal: return the shared connection, opening it on first use
    async fn connection(&self) -> Result<MultiplexedConnection> {
        let mut state = self.state.lock().await;

        match &*state {
            ConnectionState::Connected(conn) => return Ok(conn.clone()),
            ConnectionState::Closed => {
                return Err(CacheError::StoreUnavailable(
                    "redis client has been shut down".to_string(),
                ))
            }
            ConnectionState::Idle => {}
        }

        info!("Connecting to redis at {}", self.config.url());

        let conn = timeout(
            self.config.connect_timeout,
            self.client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| {
            CacheError::StoreUnavailable(format!(
                "connecting to {} timed out after {:?}",
                self.config.url(),
                self.config.connect_timeout
            ))
        })?
        .map_err(|e| {
            warn!("Redis connection to {} failed: {}", self.config.url(), e);
            CacheError::StoreUnavailable(format!("failed to connect to {}: {}", self.config.url(), e))
        })?;

        info!("Successfully connected to redis");
        *state = ConnectionState::Connected(conn.clone());
        Ok(conn)
    }

    /// Internal: forget a connection that failed at the transport level.
    /// `Closed` stays closed.
    async fn discard_connection(&self) {
        let mut state = self.state.lock().await;
        if matches!(*state, ConnectionState::Connected(_)) {
            warn!("Dropping broken redis connection to {}", self.config.url());
            *state = ConnectionState::Idle;
        }
    }

    /// Internal: run one command with the response timeout applied
    async fn query<T: FromRedisValue>(&self, cmd: Cmd) -> Result<T> {
        let mut conn = self.connection().await?;

        let err = match timeout(self.config.response_timeout, cmd.query_async::<T>(&mut conn)).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => CacheError::from(e),
            Err(_) => CacheError::StoreUnavailable(format!(
                "redis command timed out after {:?}",
                self.config.response_timeout
            )),
        };

        warn!("Redis command failed: {}", err);
        if err.is_store_unavailable() {
            self.discard_connection().await;
        }
        Err(err)
    }
}

#[async_trait]
impl HashBackend for RedisBackend {
    async fn hset(&self, namespace: &str, field: &str, value: &str) -> Result<()> {
        let mut cmd = redis::cmd("HSET");
        cmd.arg(namespace).arg(field).arg(value);
        self.query::<()>(cmd).await
    }

    async fn hget(&self, namespace: &str, field: &str) -> Result<Option<String>> {
        let mut cmd = redis::cmd("HGET");
        cmd.arg(namespace).arg(field);
        self.query(cmd).await
    }

    async fn hdel(&self, namespace: &str, field: &str) -> Result<bool> {
        let mut cmd = redis::cmd("HDEL");
        cmd.arg(namespace).arg(field);
        let removed: i64 = self.query(cmd).await?;
        Ok(removed > 0)
    }

    async fn hkeys(&self, namespace: &str) -> Result<Vec<String>> {
        let mut cmd = redis::cmd("HKEYS");
        cmd.arg(namespace);
        self.query(cmd).await
    }

    async fn expire(&self, namespace: &str, ttl_secs: u64) -> Result<()> {
        let mut cmd = redis::cmd("EXPIRE");
        cmd.arg(namespace).arg(ttl_secs);
        self.query::<()>(cmd).await
    }

    async fn ping(&self) -> Result<bool> {
        self.health_check().await
    }

    async fn close(&self) -> Result<()> {
        self.shutdown().await;
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "redis"
    }
}
