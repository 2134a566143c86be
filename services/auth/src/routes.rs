//! Authentication service routes

use crate::models::{
    CurrentUsersQuery, LoginRequest, LogoutRequest, RefreshRequest, ResetPasswordRequest,
    SignupRequest, UserIdRequest, VerifyRequest,
};
use crate::repository::PostgresRefreshStore;
use crate::service::AuthService;
use account::client::AccountClient;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use common::error::ServiceError;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<AuthService<AccountClient, PostgresRefreshStore>>,
}

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/verify", post(verify))
        .route("/auth/logout", post(logout))
        .route("/auth/reset-password", post(reset_password))
        .route("/auth/deactivate", post(deactivate))
        .route("/auth/reactivate", post(reactivate))
        .route("/auth/delete", post(delete_account))
        .route("/auth/current", get(current_users))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let response = state
        .service
        .signup(&payload.name, &payload.email, &payload.password, payload.role)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let response = state.service.login(&payload.email, &payload.password).await?;
    Ok(Json(response))
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let response = state.service.refresh(&payload.user_id).await?;
    Ok(Json(response))
}

pub async fn verify(
    State(state): State<AppState>,
    Json(payload): Json<VerifyRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let claims = state.service.verify(&payload.token).await?;
    Ok(Json(claims))
}

pub async fn logout(
    State(state): State<AppState>,
    Json(payload): Json<LogoutRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state.service.logout(payload.user_id.as_deref()).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let response = state
        .service
        .reset_password(&payload.email, &payload.password, &payload.user_id)
        .await?;
    Ok(Json(response))
}

pub async fn deactivate(
    State(state): State<AppState>,
    Json(payload): Json<UserIdRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state.service.deactivate(&payload.user_id).await?;
    Ok(Json(serde_json::json!({
        "message": "account deactivated, reactivate to use it again"
    })))
}

pub async fn reactivate(
    State(state): State<AppState>,
    Json(payload): Json<UserIdRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state.service.reactivate(&payload.user_id).await?;
    Ok(Json(serde_json::json!({
        "message": "account reactivated, please login again"
    })))
}

pub async fn delete_account(
    State(state): State<AppState>,
    Json(payload): Json<UserIdRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state.service.delete(&payload.user_id).await?;
    Ok(Json(serde_json::json!({
        "message": "account deleted"
    })))
}

pub async fn current_users(
    State(state): State<AppState>,
    Query(query): Query<CurrentUsersQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let users = state
        .service
        .current_users(query.skip, query.take, query.role)
        .await?;
    Ok(Json(users))
}
