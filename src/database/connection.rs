use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::config::DatabaseConfig;

/// Owned PostgreSQL pool built from configuration
pub struct DatabaseConnection {
    pool: PgPool,
}

impl DatabaseConnection {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool_config = &config.pool;

        debug!(
            max_connections = pool_config.max_connections,
            min_connections = pool_config.min_connections,
            acquire_timeout = pool_config.acquire_timeout_seconds,
            idle_timeout = pool_config.idle_timeout_seconds,
            "Creating database pool"
        );

        let pool = PgPoolOptions::new()
            .max_connections(pool_config.max_connections)
            .min_connections(pool_config.min_connections)
            .acquire_timeout(Duration::from_secs(pool_config.acquire_timeout_seconds))
            .idle_timeout(Duration::from_secs(pool_config.idle_timeout_seconds))
            .test_before_acquire(true)
            .connect(&config.url)
            .await?;

        info!(
            max_connections = pool_config.max_connections,
            "Database pool created"
        );

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn into_pool(self) -> PgPool {
        self.pool
    }

    pub async fn health_check(&self) -> Result<bool, sqlx::Error> {
        health_check(&self.pool).await
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

/// `SELECT 1` round trip against the pool
pub async fn health_check(pool: &PgPool) -> Result<bool, sqlx::Error> {
    let health: i32 = sqlx::query_scalar("SELECT 1").fetch_one(pool).await?;
    Ok(health == 1)
}
