//! Operation dispatch for POST /api
//!
//! Parses the envelope, validates the input, applies the per-class
//! timeout, and routes to the resolver. Queries get 3 s, mutations 5 s,
//! and order placement 30 s (the saga talks to three services and the
//! database before it answers).

use crate::error::{ApiRequest, data_response, error_response};
use crate::resolvers;
use crate::state::AppState;
use crate::validation::{
    CreateOrderInput, CreateProductInput, CurrentUsersInput, LoginInput, LogoutInput,
    OrdersInput, PaginationInput, ProductIdInput, ProductsInput, RefreshInput,
    ResetPasswordInput, RestockInput, SignupInput, SuggestInput, UserIdInput,
};
use axum::{Extension, Json, extract::State, response::Response};
use common::claims::UserClaims;
use common::error::{ServiceError, ServiceResult};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tracing::info;

/// Timeout for read operations
const QUERY_TIMEOUT: Duration = Duration::from_secs(3);
/// Timeout for synchronous mutations
const MUTATION_TIMEOUT: Duration = Duration::from_secs(5);
/// Timeout for the order placement saga
const ORDER_TIMEOUT: Duration = Duration::from_secs(30);

pub async fn execute(
    State(state): State<AppState>,
    claims: Option<Extension<UserClaims>>,
    Json(request): Json<ApiRequest>,
) -> Response {
    let claims = claims.map(|Extension(c)| c);
    info!(
        "operation {} ({})",
        request.operation,
        claims
            .as_ref()
            .map(|c| c.email.as_str())
            .unwrap_or("guest")
    );

    match run_operation(&state, claims.as_ref(), request).await {
        Ok(data) => data_response(data),
        Err(err) => error_response(&err),
    }
}

/// Parse an envelope input into its declared shape
fn parse_input<T: DeserializeOwned>(input: Value) -> ServiceResult<T> {
    serde_json::from_value(input)
        .map_err(|e| ServiceError::Validation(format!("invalid input: {}", e)))
}

/// Bound a resolver call; an elapsed deadline reads as an upstream failure
async fn bounded<F>(limit: Duration, fut: F) -> ServiceResult<Value>
where
    F: Future<Output = ServiceResult<Value>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(ServiceError::Upstream(
            "downstream call timed out".to_string(),
        )),
    }
}

async fn run_operation(
    state: &AppState,
    claims: Option<&UserClaims>,
    request: ApiRequest,
) -> ServiceResult<Value> {
    match request.operation.as_str() {
        // queries
        "accounts" => {
            let input: PaginationInput = parse_input(request.input)?;
            input.validate()?;
            bounded(QUERY_TIMEOUT, resolvers::accounts(state, claims, input)).await
        }
        "currentUsers" => {
            let input: CurrentUsersInput = parse_input(request.input)?;
            input.validate()?;
            bounded(QUERY_TIMEOUT, resolvers::current_users(state, claims, input)).await
        }
        "products" => {
            let input: ProductsInput = parse_input(request.input)?;
            input.validate()?;
            bounded(QUERY_TIMEOUT, resolvers::products(state, input)).await
        }
        "product" => {
            let input: ProductIdInput = parse_input(request.input)?;
            input.validate()?;
            bounded(QUERY_TIMEOUT, resolvers::product(state, input)).await
        }
        "suggestions" => {
            let input: SuggestInput = parse_input(request.input)?;
            input.validate()?;
            bounded(QUERY_TIMEOUT, resolvers::suggestions(state, input)).await
        }
        "orders" => {
            let input: OrdersInput = parse_input(request.input)?;
            input.validate()?;
            bounded(QUERY_TIMEOUT, resolvers::orders(state, claims, input)).await
        }

        // mutations
        "signup" => {
            let input: SignupInput = parse_input(request.input)?;
            input.validate()?;
            bounded(MUTATION_TIMEOUT, resolvers::signup(state, input)).await
        }
        "login" => {
            let input: LoginInput = parse_input(request.input)?;
            input.validate()?;
            bounded(MUTATION_TIMEOUT, resolvers::login(state, input)).await
        }
        "refreshToken" => {
            let input: RefreshInput = parse_input(request.input)?;
            input.validate()?;
            bounded(MUTATION_TIMEOUT, resolvers::refresh_token(state, input)).await
        }
        "logout" => {
            let input: LogoutInput = parse_input(request.input)?;
            input.validate()?;
            bounded(MUTATION_TIMEOUT, resolvers::logout(state, claims, input)).await
        }
        "resetPassword" => {
            let input: ResetPasswordInput = parse_input(request.input)?;
            input.validate()?;
            bounded(
                MUTATION_TIMEOUT,
                resolvers::reset_password(state, claims, input),
            )
            .await
        }
        "deactivateAccount" => {
            let input: UserIdInput = parse_input(request.input)?;
            input.validate()?;
            bounded(
                MUTATION_TIMEOUT,
                resolvers::deactivate_account(state, claims, input),
            )
            .await
        }
        "reactivateAccount" => {
            let input: UserIdInput = parse_input(request.input)?;
            input.validate()?;
            bounded(
                MUTATION_TIMEOUT,
                resolvers::reactivate_account(state, claims, input),
            )
            .await
        }
        "deleteAccount" => {
            let input: UserIdInput = parse_input(request.input)?;
            input.validate()?;
            bounded(
                MUTATION_TIMEOUT,
                resolvers::delete_account(state, claims, input),
            )
            .await
        }
        "createProduct" => {
            let input: CreateProductInput = parse_input(request.input)?;
            input.validate()?;
            bounded(
                MUTATION_TIMEOUT,
                resolvers::create_product(state, claims, input),
            )
            .await
        }
        "restockProduct" => {
            let input: RestockInput = parse_input(request.input)?;
            input.validate()?;
            bounded(
                MUTATION_TIMEOUT,
                resolvers::restock_product(state, claims, input),
            )
            .await
        }
        "deleteProduct" => {
            let input: ProductIdInput = parse_input(request.input)?;
            input.validate()?;
            bounded(
                MUTATION_TIMEOUT,
                resolvers::delete_product(state, claims, input),
            )
            .await
        }
        "createOrder" => {
            let input: CreateOrderInput = parse_input(request.input)?;
            input.validate()?;
            bounded(ORDER_TIMEOUT, resolvers::create_order(state, claims, input)).await
        }

        other => Err(ServiceError::Validation(format!(
            "unknown operation: {}",
            other
        ))),
    }
}
