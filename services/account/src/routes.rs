//! Account service routes

use crate::models::{NewAccount, Pagination, PasswordUpdate};
use crate::service::AccountService;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use common::error::ServiceError;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: AccountService,
}

/// Create the router for the account service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/accounts", post(create_account).get(list_accounts))
        .route("/accounts/password", put(update_password))
        .route("/accounts/for-auth/:email", get(get_for_auth))
        .route("/accounts/:id", get(get_account).delete(delete_account))
        .route("/accounts/:id/token-version", post(increment_token_version))
        .route("/accounts/:id/deactivate", post(deactivate_account))
        .route("/accounts/:id/reactivate", post(reactivate_account))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "account-service"
    }))
}

pub async fn create_account(
    State(state): State<AppState>,
    Json(payload): Json<NewAccount>,
) -> Result<impl IntoResponse, ServiceError> {
    let account = state.service.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

pub async fn list_accounts(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<impl IntoResponse, ServiceError> {
    let accounts = state.service.list(page.skip, page.take).await?;
    Ok(Json(accounts))
}

pub async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let account = state.service.get(&id).await?;
    Ok(Json(account))
}

pub async fn get_for_auth(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let account = state.service.get_for_auth(&email).await?;
    Ok(Json(account))
}

pub async fn increment_token_version(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    state.service.increment_token_version(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn update_password(
    State(state): State<AppState>,
    Json(payload): Json<PasswordUpdate>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .service
        .update_password(&payload.email, &payload.password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn deactivate_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    state.service.deactivate(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reactivate_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    state.service.reactivate(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_account(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    state.service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
