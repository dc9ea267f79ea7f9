//! Redis-backed maintenance store.
//!
//! Maintenance sets are plain Redis sets read with `SMEMBERS`. A key that does
//! not exist comes back as an empty set, which is exactly the semantics the
//! resolver wants.
//!
//! # Features
//!
//! - **Connection pooling**: Uses `deadpool-redis` so one store can serve many
//!   concurrent events
//! - **Bounded latency**: Connection checkout and every query run under a
//!   timeout; an expired timeout is reported as `StoreError::Timeout`
//! - **Lazy connect**: Building the store never fails and never touches the
//!   network; the pool is built on first use and a bad URL surfaces there as
//!   `StoreError::Connection`
//!
//! # Example
//!
//! ```ignore
//! use mute_core::store::{MaintenanceStore, RedisMaintenanceStore, RedisStoreConfig};
//! use std::time::Duration;
//!
//! let config = RedisStoreConfig::new("redis://127.0.0.1:6379")
//!     .with_query_timeout(Duration::from_millis(500));
//! let store = RedisMaintenanceStore::new(config);
//! let subs = store.members("maintenance:subscriptions").await?;
//! ```

use super::{MaintenanceStore, StoreError};
use async_trait::async_trait;
use deadpool_redis::{Config as PoolConfig, Pool, Runtime};
use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

/// Configuration for the Redis maintenance store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisStoreConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379").
    pub url: String,
    /// Maximum number of connections in the pool.
    pub max_connections: u32,
    /// Bound on checking a connection out of the pool (including connecting).
    pub connect_timeout: Duration,
    /// Bound on a single query.
    pub query_timeout: Duration,
}

impl RedisStoreConfig {
    /// Creates a new configuration with the given Redis URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 4,
            connect_timeout: Duration::from_secs(2),
            query_timeout: Duration::from_secs(2),
        }
    }

    /// Sets the maximum number of connections in the pool.
    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the connection checkout timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the per-query timeout.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self::new("redis://127.0.0.1:6379")
    }
}

/// A maintenance store reading Redis sets.
///
/// `RedisMaintenanceStore` is thread-safe and can be shared across tasks; the
/// pool hands out one connection per in-flight query.
pub struct RedisMaintenanceStore {
    pool: OnceCell<Pool>,
    config: RedisStoreConfig,
}

impl RedisMaintenanceStore {
    /// Creates a new store with the given configuration.
    ///
    /// Nothing is validated or opened here; see [`Self::ping`].
    pub fn new(config: RedisStoreConfig) -> Self {
        Self {
            pool: OnceCell::new(),
            config,
        }
    }

    /// Round-trips a `PING` to verify connectivity.
    pub async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.get_conn().await?;
        with_timeout(
            self.config.query_timeout,
            redis::cmd("PING").query_async::<String>(&mut *conn),
        )
        .await?
        .map_err(|e| StoreError::Query(format!("Redis PING failed: {}", e)))?;
        Ok(())
    }

    /// Gets a connection from the pool, building the pool on first use.
    async fn get_conn(&self) -> Result<deadpool_redis::Connection, StoreError> {
        let pool = self
            .pool
            .get_or_try_init(|| async { build_pool(&self.config) })
            .await?;

        with_timeout(self.config.connect_timeout, pool.get())
            .await?
            .map_err(|e| StoreError::Connection(format!("Failed to get connection: {}", e)))
    }
}

fn build_pool(config: &RedisStoreConfig) -> Result<Pool, StoreError> {
    PoolConfig::from_url(&config.url)
        .builder()
        .map_err(|e| StoreError::Connection(format!("Failed to create pool config: {}", e)))?
        .max_size(config.max_connections as usize)
        .runtime(Runtime::Tokio1)
        .build()
        .map_err(|e| StoreError::Connection(format!("Failed to build pool: {}", e)))
}

/// Runs `fut` under `limit`, mapping expiry to `StoreError::Timeout`.
async fn with_timeout<F: Future>(limit: Duration, fut: F) -> Result<F::Output, StoreError> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| StoreError::Timeout(limit))
}

#[async_trait]
impl MaintenanceStore for RedisMaintenanceStore {
    #[instrument(skip(self), level = "debug")]
    async fn members(&self, set_name: &str) -> Result<HashSet<String>, StoreError> {
        let mut conn = self.get_conn().await?;

        let members = with_timeout(
            self.config.query_timeout,
            redis::cmd("SMEMBERS")
                .arg(set_name)
                .query_async::<HashSet<String>>(&mut *conn),
        )
        .await?
        .map_err(|e| StoreError::Query(format!("SMEMBERS {} failed: {}", set_name, e)))?;

        debug!(set = set_name, count = members.len(), "Read maintenance set");
        Ok(members)
    }
}
