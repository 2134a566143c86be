//! Catalog service routes

use crate::models::{NewProduct, ProductQuery, Restock, StockUpdate, SuggestQuery};
use crate::service::CatalogService;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use common::error::ServiceError;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: CatalogService,
}

/// Create the router for the catalog service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/products", post(create_product).get(list_products))
        .route("/products/suggest", get(suggest_products))
        .route("/products/:id", get(get_product).delete(delete_product))
        .route("/products/:id/stock", post(update_stock))
        .route("/products/:id/restock", post(restock_product))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "catalog-service"
    }))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<NewProduct>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.service.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let ids = query
        .ids
        .map(|raw| raw.split(',').map(|s| s.trim().to_string()).collect());
    let products = state
        .service
        .list(query.skip, query.take, ids, query.query)
        .await?;
    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.service.get(&id).await?;
    Ok(Json(product))
}

pub async fn update_stock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<StockUpdate>,
) -> Result<impl IntoResponse, ServiceError> {
    let applied = state
        .service
        .update_stock_and_sold(&id, payload.quantity)
        .await?;
    Ok(Json(serde_json::json!({ "applied": applied })))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    state.service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn restock_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<Restock>,
) -> Result<impl IntoResponse, ServiceError> {
    state.service.restock(&id, payload.new_stock).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn suggest_products(
    State(state): State<AppState>,
    Query(query): Query<SuggestQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let products = state
        .service
        .suggest(&query.prefix, query.size, query.use_ai.unwrap_or(false))
        .await?;
    Ok(Json(products))
}
