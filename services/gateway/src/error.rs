//! Client-facing error policy
//!
//! Validation, authorization, and domain errors go back verbatim inside a
//! 200 response; upstream and internal failures collapse to a generic
//! message on a 500 so internal wording never leaks. Invalid bearer tokens
//! are the one case served as 401.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::ServiceError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

/// Envelope accepted on POST /api
#[derive(Debug, Deserialize)]
pub struct ApiRequest {
    pub operation: String,
    #[serde(default)]
    pub input: Value,
}

/// One client-visible error
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiError {
    pub message: String,
    pub code: String,
}

/// The client-visible form of a service error
pub fn to_client_error(err: &ServiceError) -> ApiError {
    match err {
        ServiceError::Upstream(_) | ServiceError::Internal(_) => {
            error!("collapsing internal failure: {}", err);
            ApiError {
                message: "internal error".to_string(),
                code: "internal".to_string(),
            }
        }
        other => ApiError {
            message: other.to_string(),
            code: other.code().to_string(),
        },
    }
}

/// HTTP status the gateway serves a failed operation with
///
/// In-payload errors ride a 200; only internal failures are a 500. The 401
/// for bad bearer tokens is produced by the middleware, not here.
pub fn response_status(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::Upstream(_) | ServiceError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        _ => StatusCode::OK,
    }
}

/// Render a successful operation
pub fn data_response(data: Value) -> Response {
    Json(serde_json::json!({ "data": data })).into_response()
}

/// Render a failed operation under the gateway's error policy
pub fn error_response(err: &ServiceError) -> Response {
    let status = response_status(err);
    let body = Json(serde_json::json!({ "errors": [to_client_error(err)] }));
    (status, body).into_response()
}

/// Render the middleware's 401 for an unusable bearer token
pub fn unauthorized_response(message: &str) -> Response {
    let body = Json(serde_json::json!({
        "errors": [ApiError {
            message: message.to_string(),
            code: "unauthenticated".to_string(),
        }]
    }));
    (StatusCode::UNAUTHORIZED, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_pass_through_verbatim() {
        let err = ServiceError::Forbidden("admin only".to_string());
        let client = to_client_error(&err);
        assert_eq!(client.message, "admin only");
        assert_eq!(client.code, "forbidden");
        assert_eq!(response_status(&err), StatusCode::OK);
    }

    #[test]
    fn upstream_and_internal_collapse() {
        for err in [
            ServiceError::Upstream("pg connection refused at 10.0.0.3".to_string()),
            ServiceError::Internal("invariant broken in saga step 4".to_string()),
        ] {
            let client = to_client_error(&err);
            assert_eq!(client.message, "internal error");
            assert_eq!(client.code, "internal");
            assert_eq!(response_status(&err), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn no_lines_accepted_reaches_the_client() {
        let err = ServiceError::NoLinesAccepted("no order lines could be fulfilled".to_string());
        let client = to_client_error(&err);
        assert_eq!(client.code, "no_lines_accepted");
        assert_eq!(response_status(&err), StatusCode::OK);
    }
}
