//! HTTP client for the order service

use crate::models::{NewOrder, Order};
use async_trait::async_trait;
use common::error::ServiceResult;
use common::rpc;
use std::env;

/// Operations the gateway needs from the order service
#[async_trait]
pub trait OrderApi: Send + Sync {
    async fn place_order(&self, new_order: &NewOrder) -> ServiceResult<Order>;
    async fn orders_for_account(&self, account_id: &str) -> ServiceResult<Vec<Order>>;
}

/// reqwest-backed client speaking to a remote order service
#[derive(Clone)]
pub struct OrderClient {
    base_url: String,
    http: reqwest::Client,
}

impl OrderClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: rpc::http_client(),
        }
    }

    /// Read `ORDER_SERVICE_URL` (default http://localhost:8084)
    pub fn from_env() -> Self {
        let url =
            env::var("ORDER_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8084".to_string());
        Self::new(url)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl OrderApi for OrderClient {
    async fn place_order(&self, new_order: &NewOrder) -> ServiceResult<Order> {
        let res = self
            .http
            .post(self.url("/orders"))
            .json(new_order)
            .send()
            .await?;
        rpc::read_json(res).await
    }

    async fn orders_for_account(&self, account_id: &str) -> ServiceResult<Vec<Order>> {
        let res = self
            .http
            .get(self.url("/orders"))
            .query(&[("account_id", account_id)])
            .send()
            .await?;
        rpc::read_json(res).await
    }
}
