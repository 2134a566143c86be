//! HTTP client for the auth service
//!
//! The gateway's middleware and resolvers speak to the auth service through
//! `AuthApi`; tests stub it with a fake.

use crate::models::{AuthResponse, CurrentUser};
use async_trait::async_trait;
use common::claims::{Role, UserClaims};
use common::error::ServiceResult;
use common::rpc;
use std::env;

/// Operations the gateway needs from the auth service
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Option<Role>,
    ) -> ServiceResult<AuthResponse>;
    async fn login(&self, email: &str, password: &str) -> ServiceResult<AuthResponse>;
    async fn refresh(&self, user_id: &str) -> ServiceResult<AuthResponse>;
    async fn verify_token(&self, token: &str) -> ServiceResult<UserClaims>;
    async fn logout(&self, user_id: Option<&str>) -> ServiceResult<()>;
    async fn reset_password(
        &self,
        email: &str,
        password: &str,
        user_id: &str,
    ) -> ServiceResult<AuthResponse>;
    async fn deactivate(&self, user_id: &str) -> ServiceResult<()>;
    async fn reactivate(&self, user_id: &str) -> ServiceResult<()>;
    async fn delete(&self, user_id: &str) -> ServiceResult<()>;
    async fn current_users(
        &self,
        skip: u64,
        take: u64,
        role: Option<Role>,
    ) -> ServiceResult<Vec<CurrentUser>>;
}

/// reqwest-backed client speaking to a remote auth service
#[derive(Clone)]
pub struct AuthClient {
    base_url: String,
    http: reqwest::Client,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: rpc::http_client(),
        }
    }

    /// Read `AUTH_SERVICE_URL` (default http://localhost:8081)
    pub fn from_env() -> Self {
        let url =
            env::var("AUTH_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8081".to_string());
        Self::new(url)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl AuthApi for AuthClient {
    async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Option<Role>,
    ) -> ServiceResult<AuthResponse> {
        let res = self
            .http
            .post(self.url("/auth/signup"))
            .json(&serde_json::json!({
                "name": name,
                "email": email,
                "password": password,
                "role": role,
            }))
            .send()
            .await?;
        rpc::read_json(res).await
    }

    async fn login(&self, email: &str, password: &str) -> ServiceResult<AuthResponse> {
        let res = self
            .http
            .post(self.url("/auth/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;
        rpc::read_json(res).await
    }

    async fn refresh(&self, user_id: &str) -> ServiceResult<AuthResponse> {
        let res = self
            .http
            .post(self.url("/auth/refresh"))
            .json(&serde_json::json!({ "user_id": user_id }))
            .send()
            .await?;
        rpc::read_json(res).await
    }

    async fn verify_token(&self, token: &str) -> ServiceResult<UserClaims> {
        let res = self
            .http
            .post(self.url("/auth/verify"))
            .json(&serde_json::json!({ "token": token }))
            .send()
            .await?;
        rpc::read_json(res).await
    }

    async fn logout(&self, user_id: Option<&str>) -> ServiceResult<()> {
        let res = self
            .http
            .post(self.url("/auth/logout"))
            .json(&serde_json::json!({ "user_id": user_id }))
            .send()
            .await?;
        rpc::read_empty(res).await
    }

    async fn reset_password(
        &self,
        email: &str,
        password: &str,
        user_id: &str,
    ) -> ServiceResult<AuthResponse> {
        let res = self
            .http
            .post(self.url("/auth/reset-password"))
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "user_id": user_id,
            }))
            .send()
            .await?;
        rpc::read_json(res).await
    }

    async fn deactivate(&self, user_id: &str) -> ServiceResult<()> {
        let res = self
            .http
            .post(self.url("/auth/deactivate"))
            .json(&serde_json::json!({ "user_id": user_id }))
            .send()
            .await?;
        rpc::read_empty(res).await
    }

    async fn reactivate(&self, user_id: &str) -> ServiceResult<()> {
        let res = self
            .http
            .post(self.url("/auth/reactivate"))
            .json(&serde_json::json!({ "user_id": user_id }))
            .send()
            .await?;
        rpc::read_empty(res).await
    }

    async fn delete(&self, user_id: &str) -> ServiceResult<()> {
        let res = self
            .http
            .post(self.url("/auth/delete"))
            .json(&serde_json::json!({ "user_id": user_id }))
            .send()
            .await?;
        rpc::read_empty(res).await
    }

    async fn current_users(
        &self,
        skip: u64,
        take: u64,
        role: Option<Role>,
    ) -> ServiceResult<Vec<CurrentUser>> {
        let mut params: Vec<(&str, String)> = vec![
            ("skip", skip.to_string()),
            ("take", take.to_string()),
        ];
        if let Some(role) = role {
            params.push(("role", role.as_str().to_string()));
        }

        let res = self
            .http
            .get(self.url("/auth/current"))
            .query(&params)
            .send()
            .await?;
        rpc::read_json(res).await
    }
}
