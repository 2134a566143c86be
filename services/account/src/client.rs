//! HTTP client for the account service
//!
//! The `AccountsApi` trait is the seam the auth and order services program
//! against; tests swap in in-memory fakes.

use crate::models::{Account, AccountWithHash, NewAccount};
use async_trait::async_trait;
use common::error::ServiceResult;
use common::rpc;
use std::env;

/// Operations other services need from the account service
#[async_trait]
pub trait AccountsApi: Send + Sync {
    async fn create(&self, new_account: &NewAccount) -> ServiceResult<Account>;
    async fn get(&self, id: &str) -> ServiceResult<Account>;
    async fn list(&self, skip: u64, take: u64) -> ServiceResult<Vec<Account>>;
    async fn get_for_auth(&self, email: &str) -> ServiceResult<AccountWithHash>;
    async fn increment_token_version(&self, id: &str) -> ServiceResult<()>;
    async fn update_password(&self, email: &str, password: &str) -> ServiceResult<()>;
    async fn deactivate(&self, id: &str) -> ServiceResult<()>;
    async fn reactivate(&self, id: &str) -> ServiceResult<()>;
    async fn delete(&self, id: &str) -> ServiceResult<()>;
}

/// reqwest-backed client speaking to a remote account service
#[derive(Clone)]
pub struct AccountClient {
    base_url: String,
    http: reqwest::Client,
}

impl AccountClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: rpc::http_client(),
        }
    }

    /// Read `ACCOUNT_SERVICE_URL` (default http://localhost:8082)
    pub fn from_env() -> Self {
        let url = env::var("ACCOUNT_SERVICE_URL")
            .unwrap_or_else(|_| "http://localhost:8082".to_string());
        Self::new(url)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl AccountsApi for AccountClient {
    async fn create(&self, new_account: &NewAccount) -> ServiceResult<Account> {
        let res = self
            .http
            .post(self.url("/accounts"))
            .json(new_account)
            .send()
            .await?;
        rpc::read_json(res).await
    }

    async fn get(&self, id: &str) -> ServiceResult<Account> {
        let res = self
            .http
            .get(self.url(&format!("/accounts/{}", id)))
            .send()
            .await?;
        rpc::read_json(res).await
    }

    async fn list(&self, skip: u64, take: u64) -> ServiceResult<Vec<Account>> {
        let res = self
            .http
            .get(self.url("/accounts"))
            .query(&[("skip", skip), ("take", take)])
            .send()
            .await?;
        rpc::read_json(res).await
    }

    async fn get_for_auth(&self, email: &str) -> ServiceResult<AccountWithHash> {
        let res = self
            .http
            .get(self.url(&format!("/accounts/for-auth/{}", email)))
            .send()
            .await?;
        rpc::read_json(res).await
    }

    async fn increment_token_version(&self, id: &str) -> ServiceResult<()> {
        let res = self
            .http
            .post(self.url(&format!("/accounts/{}/token-version", id)))
            .send()
            .await?;
        rpc::read_empty(res).await
    }

    async fn update_password(&self, email: &str, password: &str) -> ServiceResult<()> {
        let res = self
            .http
            .put(self.url("/accounts/password"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        rpc::read_empty(res).await
    }

    async fn deactivate(&self, id: &str) -> ServiceResult<()> {
        let res = self
            .http
            .post(self.url(&format!("/accounts/{}/deactivate", id)))
            .send()
            .await?;
        rpc::read_empty(res).await
    }

    async fn reactivate(&self, id: &str) -> ServiceResult<()> {
        let res = self
            .http
            .post(self.url(&format!("/accounts/{}/reactivate", id)))
            .send()
            .await?;
        rpc::read_empty(res).await
    }

    async fn delete(&self, id: &str) -> ServiceResult<()> {
        let res = self
            .http
            .delete(self.url(&format!("/accounts/{}", id)))
            .send()
            .await?;
        rpc::read_empty(res).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_join_tolerates_trailing_slash() {
        let client = AccountClient::new("http://localhost:8082/");
        assert_eq!(client.url("/accounts"), "http://localhost:8082/accounts");
    }
}
