//! Order service routes

use crate::models::{NewOrder, OrdersQuery};
use crate::publisher::BusPublisher;
use crate::repository::PostgresOrderStore;
use crate::service::OrderService;
use account::client::AccountClient;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use catalog::client::CatalogClient;
use common::error::ServiceError;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<OrderService<AccountClient, CatalogClient, PostgresOrderStore, BusPublisher>>,
}

/// Create the router for the order service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/orders", post(place_order).get(orders_for_account))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "order-service"
    }))
}

pub async fn place_order(
    State(state): State<AppState>,
    Json(payload): Json<NewOrder>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state
        .service
        .place_order(&payload.account_id, &payload.products)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn orders_for_account(
    State(state): State<AppState>,
    Query(query): Query<OrdersQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let orders = state.service.orders_for_account(&query.account_id).await?;
    Ok(Json(orders))
}
