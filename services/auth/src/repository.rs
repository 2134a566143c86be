//! Refresh-token persistence
//!
//! Records are append-only per session event: rotation inserts a new row
//! and the "live" record is always the one with the greatest expires_at.
//! Logout and the other revoking operations delete every row for the user.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::error::{ServiceError, ServiceResult};
use sqlx::{PgPool, Row};

/// A stored refresh token
#[derive(Debug, Clone)]
pub struct RefreshRecord {
    pub user_id: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Store contract the session state machine runs against
#[async_trait]
pub trait RefreshStore: Send + Sync {
    async fn store(
        &self,
        user_id: &str,
        refresh_token: &str,
        expires_at: DateTime<Utc>,
    ) -> ServiceResult<()>;

    /// The live record for a user: greatest expires_at
    async fn latest(&self, user_id: &str) -> ServiceResult<RefreshRecord>;

    /// Delete every record for a user
    async fn delete_all(&self, user_id: &str) -> ServiceResult<()>;
}

/// Postgres-backed refresh store
#[derive(Clone)]
pub struct PostgresRefreshStore {
    pool: PgPool,
}

impl PostgresRefreshStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshStore for PostgresRefreshStore {
    async fn store(
        &self,
        user_id: &str,
        refresh_token: &str,
        expires_at: DateTime<Utc>,
    ) -> ServiceResult<()> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, refresh_token, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(refresh_token)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn latest(&self, user_id: &str) -> ServiceResult<RefreshRecord> {
        let row = sqlx::query(
            r#"
            SELECT user_id, refresh_token, expires_at
            FROM refresh_tokens
            WHERE user_id = $1
            ORDER BY expires_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::NotFound("refresh token not found".to_string()))?;

        Ok(RefreshRecord {
            user_id: row.get("user_id"),
            refresh_token: row.get("refresh_token"),
            expires_at: row.get("expires_at"),
        })
    }

    async fn delete_all(&self, user_id: &str) -> ServiceResult<()> {
        sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
