//! Connection pool for the note store.
//!
//! Guarded deletes and score write-backs each hold a row lock for the length
//! of one transaction, so pool pressure shows up as queued requests rather
//! than errors. [`pool_health`] exposes that pressure to the health endpoint.

use std::time::{Duration, Instant};

use serde::Serialize;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};

use pledge_core::{defaults, Error, Result};

/// Pool sizing for the note store.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_connections: u32,
    /// How long a request waits for a free connection before failing.
    pub acquire_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: defaults::DB_MAX_CONNECTIONS,
            acquire_timeout: Duration::from_secs(defaults::DB_ACQUIRE_TIMEOUT_SECS),
        }
    }
}

impl PoolConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_connections(mut self, n: u32) -> Self {
        self.max_connections = n.max(1);
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }
}

/// Open a pool against `database_url`.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool> {
    let start = Instant::now();

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(database_url)
        .await
        .map_err(Error::Database)?;

    info!(
        subsystem = "db",
        component = "pool",
        op = "connect",
        max_connections = config.max_connections,
        pool_size = pool.size(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Note store pool established"
    );
    Ok(pool)
}

/// Snapshot of pool usage reported by `/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolHealth {
    pub size: u32,
    pub idle: usize,
    /// True when every open connection is checked out.
    pub saturated: bool,
}

impl PoolHealth {
    fn from_counts(size: u32, idle: usize) -> Self {
        Self {
            size,
            idle,
            saturated: size > 0 && idle == 0,
        }
    }
}

/// Sample the pool; warns when no connection is idle.
pub fn pool_health(pool: &PgPool) -> PoolHealth {
    let health = PoolHealth::from_counts(pool.size(), pool.num_idle());
    if health.saturated {
        warn!(
            subsystem = "db",
            component = "pool",
            pool_size = health.size,
            "No idle connections, note requests may queue"
        );
    }
    health
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pool_config() {
        let config = PoolConfig::default();
        assert_eq!(config.max_connections, defaults::DB_MAX_CONNECTIONS);
        assert_eq!(
            config.acquire_timeout,
            Duration::from_secs(defaults::DB_ACQUIRE_TIMEOUT_SECS)
        );
    }

    #[test]
    fn test_zero_connections_floor_to_one() {
        let config = PoolConfig::new()
            .max_connections(0)
            .acquire_timeout(Duration::from_secs(5));
        assert_eq!(config.max_connections, 1);
        assert_eq!(config.acquire_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_saturation() {
        assert!(PoolHealth::from_counts(4, 0).saturated);
        assert!(!PoolHealth::from_counts(4, 1).saturated);
        // An empty pool has nothing checked out.
        assert!(!PoolHealth::from_counts(0, 0).saturated);
    }
}
