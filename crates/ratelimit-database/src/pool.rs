//! Pooled Postgres connection for the user store.

use ratelimit_core::{Error, Result, SupabaseConfig};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

/// Tuning knobs for the user-store connection pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Thin wrapper around a `sqlx::PgPool`. Connects lazily; call
/// [`DatabasePool::ready_check`] once at startup so a misconfigured user
/// store fails fast rather than on the first request.
#[derive(Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    pub async fn connect(config: &SupabaseConfig, pool_config: PoolConfig) -> Result<Self> {
        info!("connecting to user store");
        let pool = PgPoolOptions::new()
            .max_connections(pool_config.max_connections)
            .acquire_timeout(pool_config.acquire_timeout)
            .connect_lazy(&config.url)
            .map_err(|e| Error::user_store_with_source("failed to build user-store pool", e))?;
        Ok(Self { pool })
    }

    pub fn pg_pool(&self) -> &PgPool {
        &self.pool
    }

    /// Explicit readiness check, run once before the process starts
    /// serving traffic.
    pub async fn ready_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| Error::user_store_with_source("user-store readiness check failed", e))?;
        Ok(())
    }
}
