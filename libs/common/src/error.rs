//! Error kinds shared by every shopstream service
//!
//! The services speak HTTP/JSON to each other, so the error kind must
//! survive the wire: servers render a `ServiceError` as a JSON body with a
//! stable code, and clients reconstruct the kind from that code.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error kinds distinguished across service boundaries
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Input fails its declared constraints; raised before any side effect
    #[error("{0}")]
    Validation(String),

    /// No or invalid credentials where authentication is required
    #[error("{0}")]
    Unauthenticated(String),

    /// Role or ownership check failed
    #[error("{0}")]
    Forbidden(String),

    /// Account, product, or record missing
    #[error("{0}")]
    NotFound(String),

    /// Duplicate login or unique-constraint violation
    #[error("{0}")]
    Conflict(String),

    /// Token version no longer matches the account
    #[error("{0}")]
    Revoked(String),

    /// Refresh record past its expiry
    #[error("{0}")]
    Expired(String),

    /// Order placement left no usable lines
    #[error("{0}")]
    NoLinesAccepted(String),

    /// Downstream RPC or database failure
    #[error("{0}")]
    Upstream(String),

    /// Unexpected invariant violation
    #[error("{0}")]
    Internal(String),
}

/// Type alias for results carrying a ServiceError
pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// Stable wire code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "validation",
            ServiceError::Unauthenticated(_) => "unauthenticated",
            ServiceError::Forbidden(_) => "forbidden",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Conflict(_) => "conflict",
            ServiceError::Revoked(_) => "revoked",
            ServiceError::Expired(_) => "expired",
            ServiceError::NoLinesAccepted(_) => "no_lines_accepted",
            ServiceError::Upstream(_) => "upstream",
            ServiceError::Internal(_) => "internal",
        }
    }

    /// HTTP status this kind is served with
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Revoked(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Expired(_) => StatusCode::UNAUTHORIZED,
            ServiceError::NoLinesAccepted(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Rebuild the kind from its wire code; unknown codes become Upstream
    pub fn from_code(code: &str, message: String) -> Self {
        match code {
            "validation" => ServiceError::Validation(message),
            "unauthenticated" => ServiceError::Unauthenticated(message),
            "forbidden" => ServiceError::Forbidden(message),
            "not_found" => ServiceError::NotFound(message),
            "conflict" => ServiceError::Conflict(message),
            "revoked" => ServiceError::Revoked(message),
            "expired" => ServiceError::Expired(message),
            "no_lines_accepted" => ServiceError::NoLinesAccepted(message),
            "internal" => ServiceError::Internal(message),
            _ => ServiceError::Upstream(message),
        }
    }
}

/// JSON body carried by error responses
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(err: &ServiceError) -> Self {
        Self {
            error: ErrorDetail {
                code: err.code().to_string(),
                message: err.to_string(),
            },
        }
    }

    /// Reconstruct the ServiceError this body was rendered from
    pub fn into_error(self) -> ServiceError {
        ServiceError::from_code(&self.error.code, self.error.message)
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorBody::new(&self));
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => ServiceError::NotFound("record not found".to_string()),
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                ServiceError::Conflict("record already exists".to_string())
            }
            _ => ServiceError::Upstream(format!("database error: {}", err)),
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::Upstream("downstream call timed out".to_string())
        } else {
            ServiceError::Upstream(format!("downstream call failed: {}", err))
        }
    }
}

impl From<redis::RedisError> for ServiceError {
    fn from(err: redis::RedisError) -> Self {
        ServiceError::Upstream(format!("bus error: {}", err))
    }
}
