//! Account repository for database operations

use crate::models::{Account, AccountWithHash};
use common::error::{ServiceError, ServiceResult};
use sqlx::{PgPool, Row};
use tracing::info;

/// Account repository over the accounts table
#[derive(Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a fully-populated account row
    pub async fn create(&self, account: &AccountWithHash) -> ServiceResult<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, name, email, password_hash, role, token_version, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&account.id)
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.role)
        .bind(account.token_version)
        .bind(account.is_active)
        .execute(&self.pool)
        .await
        .map_err(|e| match ServiceError::from(e) {
            ServiceError::Conflict(_) => {
                ServiceError::Conflict("account with this email already exists".to_string())
            }
            other => other,
        })?;

        info!("inserted account {}", account.id);
        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> ServiceResult<Account> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, role, token_version, is_active
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::NotFound("account not found".to_string()))?;

        Ok(account_from_row(&row))
    }

    pub async fn list(&self, skip: u64, take: u64) -> ServiceResult<Vec<Account>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, email, role, token_version, is_active
            FROM accounts
            ORDER BY id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(take as i64)
        .bind(skip as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(account_from_row).collect())
    }

    /// Full credential row for the auth service
    pub async fn get_for_auth(&self, email: &str) -> ServiceResult<AccountWithHash> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, role, token_version, is_active
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::NotFound("account not found".to_string()))?;

        Ok(AccountWithHash {
            id: row.get("id"),
            name: row.get("name"),
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            role: row.get("role"),
            token_version: row.get("token_version"),
            is_active: row.get("is_active"),
        })
    }

    /// Atomic bump; revokes every outstanding token for the account
    pub async fn increment_token_version(&self, id: &str) -> ServiceResult<()> {
        let result =
            sqlx::query("UPDATE accounts SET token_version = token_version + 1 WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound("account not found".to_string()));
        }
        Ok(())
    }

    pub async fn update_password(&self, email: &str, password_hash: &str) -> ServiceResult<()> {
        let result = sqlx::query("UPDATE accounts SET password_hash = $1 WHERE email = $2")
            .bind(password_hash)
            .bind(email)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound("account not found".to_string()));
        }
        info!("password updated for {}", email);
        Ok(())
    }

    pub async fn set_active(&self, id: &str, active: bool) -> ServiceResult<()> {
        let result = sqlx::query("UPDATE accounts SET is_active = $1 WHERE id = $2")
            .bind(active)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound("account not found".to_string()));
        }
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound("account not found".to_string()));
        }
        info!("deleted account {}", id);
        Ok(())
    }
}

fn account_from_row(row: &sqlx::postgres::PgRow) -> Account {
    Account {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        role: row.get("role"),
        token_version: row.get("token_version"),
        is_active: row.get("is_active"),
    }
}
