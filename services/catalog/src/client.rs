//! HTTP client for the catalog service

use crate::models::{NewProduct, Product};
use async_trait::async_trait;
use common::error::ServiceResult;
use common::rpc;
use serde::Deserialize;
use std::env;

/// Operations other services need from the catalog
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn create(&self, new_product: &NewProduct) -> ServiceResult<Product>;
    async fn get(&self, id: &str) -> ServiceResult<Product>;
    async fn list(
        &self,
        skip: u64,
        take: u64,
        ids: Option<&[String]>,
        query: Option<&str>,
    ) -> ServiceResult<Vec<Product>>;
    /// Returns whether the guarded update was applied
    async fn update_stock_and_sold(&self, id: &str, quantity: i32) -> ServiceResult<bool>;
    async fn delete(&self, id: &str) -> ServiceResult<()>;
    async fn restock(&self, id: &str, new_stock: i32) -> ServiceResult<()>;
    async fn suggest(
        &self,
        prefix: &str,
        size: Option<u64>,
        use_ai: bool,
    ) -> ServiceResult<Vec<Product>>;
}

#[derive(Debug, Deserialize)]
struct StockUpdateResponse {
    applied: bool,
}

/// reqwest-backed client speaking to a remote catalog service
#[derive(Clone)]
pub struct CatalogClient {
    base_url: String,
    http: reqwest::Client,
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: rpc::http_client(),
        }
    }

    /// Read `CATALOG_SERVICE_URL` (default http://localhost:8083)
    pub fn from_env() -> Self {
        let url = env::var("CATALOG_SERVICE_URL")
            .unwrap_or_else(|_| "http://localhost:8083".to_string());
        Self::new(url)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn create(&self, new_product: &NewProduct) -> ServiceResult<Product> {
        let res = self
            .http
            .post(self.url("/products"))
            .json(new_product)
            .send()
            .await?;
        rpc::read_json(res).await
    }

    async fn get(&self, id: &str) -> ServiceResult<Product> {
        let res = self
            .http
            .get(self.url(&format!("/products/{}", id)))
            .send()
            .await?;
        rpc::read_json(res).await
    }

    async fn list(
        &self,
        skip: u64,
        take: u64,
        ids: Option<&[String]>,
        query: Option<&str>,
    ) -> ServiceResult<Vec<Product>> {
        let mut params: Vec<(&str, String)> = vec![
            ("skip", skip.to_string()),
            ("take", take.to_string()),
        ];
        if let Some(ids) = ids {
            params.push(("ids", ids.join(",")));
        }
        if let Some(query) = query {
            params.push(("query", query.to_string()));
        }

        let res = self
            .http
            .get(self.url("/products"))
            .query(&params)
            .send()
            .await?;
        rpc::read_json(res).await
    }

    async fn update_stock_and_sold(&self, id: &str, quantity: i32) -> ServiceResult<bool> {
        let res = self
            .http
            .post(self.url(&format!("/products/{}/stock", id)))
            .json(&serde_json::json!({ "quantity": quantity }))
            .send()
            .await?;
        let body: StockUpdateResponse = rpc::read_json(res).await?;
        Ok(body.applied)
    }

    async fn delete(&self, id: &str) -> ServiceResult<()> {
        let res = self
            .http
            .delete(self.url(&format!("/products/{}", id)))
            .send()
            .await?;
        rpc::read_empty(res).await
    }

    async fn restock(&self, id: &str, new_stock: i32) -> ServiceResult<()> {
        let res = self
            .http
            .post(self.url(&format!("/products/{}/restock", id)))
            .json(&serde_json::json!({ "new_stock": new_stock }))
            .send()
            .await?;
        rpc::read_empty(res).await
    }

    async fn suggest(
        &self,
        prefix: &str,
        size: Option<u64>,
        use_ai: bool,
    ) -> ServiceResult<Vec<Product>> {
        let mut params: Vec<(&str, String)> = vec![("prefix", prefix.to_string())];
        if let Some(size) = size {
            params.push(("size", size.to_string()));
        }
        if use_ai {
            params.push(("use_ai", "true".to_string()));
        }

        let res = self
            .http
            .get(self.url("/products/suggest"))
            .query(&params)
            .send()
            .await?;
        rpc::read_json(res).await
    }
}
