//! Database module for handling PostgreSQL connections
//!
//! This module provides connection pooling, configuration, startup retry,
//! and health checks for the per-service PostgreSQL databases.

use crate::error::{ServiceError, ServiceResult};
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::env;
use std::time::Duration;
use tracing::{info, warn};

/// Attempts made before giving up on the database at startup
const CONNECT_ATTEMPTS: u32 = 5;
/// Fixed delay between startup attempts
const CONNECT_BACKOFF: Duration = Duration::from_secs(5);

/// Database configuration struct
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Create a new DatabaseConfig from environment variables
    ///
    /// # Environment Variables
    /// - `DATABASE_URL`: PostgreSQL connection URL (falls back to `default_url`)
    /// - `DATABASE_MAX_CONNECTIONS`: Maximum number of connections (default: 10)
    pub fn from_env(default_url: &str) -> Self {
        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| default_url.to_string());

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        Self {
            database_url,
            max_connections,
        }
    }
}

/// Initialize a PostgreSQL connection pool
pub async fn init_pool(config: &DatabaseConfig) -> ServiceResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .map_err(|e| ServiceError::Upstream(format!("database connection failed: {}", e)))?;

    Ok(pool)
}

/// Initialize a pool, retrying with a fixed backoff before giving up
///
/// Transient failures at startup are expected while the database container
/// comes up; after the attempts are exhausted the error is fatal.
pub async fn init_pool_with_retry(config: &DatabaseConfig) -> ServiceResult<PgPool> {
    let mut last_err = None;

    for attempt in 1..=CONNECT_ATTEMPTS {
        match init_pool(config).await {
            Ok(pool) => {
                info!("database connection established on attempt {}", attempt);
                return Ok(pool);
            }
            Err(e) => {
                warn!(
                    "database connection attempt {}/{} failed: {}",
                    attempt, CONNECT_ATTEMPTS, e
                );
                last_err = Some(e);
                if attempt < CONNECT_ATTEMPTS {
                    tokio::time::sleep(CONNECT_BACKOFF).await;
                }
            }
        }
    }

    Err(last_err
        .unwrap_or_else(|| ServiceError::Internal("database retry loop ran zero times".into())))
}

/// Check database connectivity
pub async fn health_check(pool: &PgPool) -> ServiceResult<bool> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn config_falls_back_to_default_url() {
        std::env::remove_var("DATABASE_URL");
        std::env::remove_var("DATABASE_MAX_CONNECTIONS");

        let config = DatabaseConfig::from_env("postgresql://localhost/shopstream_test");
        assert_eq!(
            config.database_url,
            "postgresql://localhost/shopstream_test"
        );
        assert_eq!(config.max_connections, 10);
    }

    #[test]
    #[serial]
    fn config_reads_overrides() {
        std::env::set_var("DATABASE_URL", "postgresql://db:5432/orders");
        std::env::set_var("DATABASE_MAX_CONNECTIONS", "32");

        let config = DatabaseConfig::from_env("postgresql://localhost/unused");
        assert_eq!(config.database_url, "postgresql://db:5432/orders");
        assert_eq!(config.max_connections, 32);

        std::env::remove_var("DATABASE_URL");
        std::env::remove_var("DATABASE_MAX_CONNECTIONS");
    }
}
