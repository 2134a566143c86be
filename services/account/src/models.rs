//! Account models and request payloads

use common::claims::Role;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Account entity as exposed to other services
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub token_version: i32,
    pub is_active: bool,
}

impl Account {
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or_default()
    }
}

/// Full credential row, only served to the auth service
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AccountWithHash {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub token_version: i32,
    pub is_active: bool,
}

/// Account creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

/// Password update payload; the service re-hashes before storing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordUpdate {
    pub email: String,
    pub password: String,
}

/// Pagination query for listing accounts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct Pagination {
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub take: u64,
}
