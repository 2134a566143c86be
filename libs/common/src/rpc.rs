//! Helpers shared by the HTTP RPC clients
//!
//! Every service exposes JSON endpoints that render errors as an
//! `ErrorBody`; these helpers turn a response back into the typed result
//! the caller expects.

use crate::error::{ErrorBody, ServiceError, ServiceResult};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default timeout for inter-service calls; generous enough for the order
/// saga, which the gateway bounds separately.
pub const CLIENT_TIMEOUT: Duration = Duration::from_secs(35);

/// Build the reqwest client used by every service client
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(CLIENT_TIMEOUT)
        .build()
        .expect("reqwest client construction cannot fail with static config")
}

/// Decode a JSON success body, or reconstruct the service error
pub async fn read_json<T: DeserializeOwned>(res: reqwest::Response) -> ServiceResult<T> {
    if res.status().is_success() {
        Ok(res.json::<T>().await?)
    } else {
        Err(read_error(res).await)
    }
}

/// Accept an empty success body, or reconstruct the service error
pub async fn read_empty(res: reqwest::Response) -> ServiceResult<()> {
    if res.status().is_success() {
        Ok(())
    } else {
        Err(read_error(res).await)
    }
}

async fn read_error(res: reqwest::Response) -> ServiceError {
    let status = res.status();
    match res.json::<ErrorBody>().await {
        Ok(body) => body.into_error(),
        Err(_) => ServiceError::Upstream(format!("downstream returned status {}", status)),
    }
}
