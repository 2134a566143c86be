//! Authentication middleware
//!
//! A missing or malformed Authorization header lets the request through as
//! a guest; resolvers enforce what guests may do. A present bearer token
//! must verify against the auth service or the request dies here with 401.

use crate::error::unauthorized_response;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::{info, warn};

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let token = match header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) if !token.is_empty() => token.to_string(),
        // no usable token: proceed as guest
        _ => return Ok(next.run(req).await),
    };

    match state.auth.verify_token(&token).await {
        Ok(claims) => {
            info!("authenticated {} ({})", claims.email, claims.role);
            req.extensions_mut().insert(claims);
            Ok(next.run(req).await)
        }
        Err(e) => {
            warn!("token verification failed: {}", e);
            Err(unauthorized_response("invalid token"))
        }
    }
}
