//! Resolver layer: authorization and downstream fan-out per operation
//!
//! Every resolver receives the caller's verified claims (if any) and a
//! validated input, enforces the authorization matrix, and delegates to a
//! downstream client. Inputs arrive validated; resolvers never re-check
//! shape, only authority.

use crate::state::AppState;
use crate::validation::{
    CreateOrderInput, CreateProductInput, CurrentUsersInput, LoginInput, LogoutInput,
    OrdersInput, PaginationInput, ProductIdInput, ProductsInput, RefreshInput,
    ResetPasswordInput, RestockInput, SignupInput, SuggestInput, UserIdInput,
};
use catalog::models::NewProduct;
use common::claims::{Role, UserClaims};
use common::error::{ServiceError, ServiceResult};
use order::models::{NewOrder, OrderLineRequest};
use serde_json::Value;

/// The caller must be authenticated
pub fn require_auth(claims: Option<&UserClaims>) -> ServiceResult<&UserClaims> {
    claims.ok_or_else(|| ServiceError::Unauthenticated("authentication required".to_string()))
}

/// The caller must be an admin
pub fn require_admin(claims: Option<&UserClaims>) -> ServiceResult<&UserClaims> {
    let user = require_auth(claims)?;
    if !user.role.is_admin() {
        return Err(ServiceError::Forbidden("admin only".to_string()));
    }
    Ok(user)
}

/// The caller must be the subject of the operation, or an admin
pub fn require_self_or_admin<'c>(
    claims: Option<&'c UserClaims>,
    subject_id: &str,
) -> ServiceResult<&'c UserClaims> {
    let user = require_auth(claims)?;
    if !user.may_act_on(subject_id) {
        return Err(ServiceError::Forbidden(
            "cannot act on another account".to_string(),
        ));
    }
    Ok(user)
}

fn to_value<T: serde::Serialize>(value: T) -> ServiceResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| ServiceError::Internal(format!("response encoding failed: {}", e)))
}

fn parse_role(role: Option<&str>) -> Option<Role> {
    role.filter(|r| !r.is_empty()).and_then(|r| r.parse().ok())
}

// ---- auth ----

pub async fn signup(state: &AppState, input: SignupInput) -> ServiceResult<Value> {
    let response = state
        .auth
        .signup(
            &input.name,
            &input.email,
            &input.password,
            parse_role(input.role.as_deref()),
        )
        .await?;
    to_value(response)
}

pub async fn login(state: &AppState, input: LoginInput) -> ServiceResult<Value> {
    let response = state.auth.login(&input.email, &input.password).await?;
    to_value(response)
}

pub async fn refresh_token(state: &AppState, input: RefreshInput) -> ServiceResult<Value> {
    let response = state.auth.refresh(&input.user_id).await?;
    to_value(response)
}

pub async fn logout(
    state: &AppState,
    claims: Option<&UserClaims>,
    input: LogoutInput,
) -> ServiceResult<Value> {
    match input.user_id.as_deref().filter(|id| !id.is_empty()) {
        Some(user_id) => {
            require_self_or_admin(claims, user_id)?;
            state.auth.logout(Some(user_id)).await?;
        }
        None => {
            require_admin(claims)?;
            state.auth.logout(None).await?;
        }
    }
    to_value(serde_json::json!({ "loggedOut": true }))
}

pub async fn reset_password(
    state: &AppState,
    claims: Option<&UserClaims>,
    input: ResetPasswordInput,
) -> ServiceResult<Value> {
    let user = require_auth(claims)?;
    if user.email != input.email {
        return Err(ServiceError::Forbidden(
            "can only reset your own password".to_string(),
        ));
    }
    let response = state
        .auth
        .reset_password(&input.email, &input.password, &user.sub)
        .await?;
    to_value(response)
}

pub async fn deactivate_account(
    state: &AppState,
    claims: Option<&UserClaims>,
    input: UserIdInput,
) -> ServiceResult<Value> {
    require_self_or_admin(claims, &input.user_id)?;
    state.auth.deactivate(&input.user_id).await?;
    to_value(serde_json::json!({ "deactivated": true }))
}

pub async fn reactivate_account(
    state: &AppState,
    claims: Option<&UserClaims>,
    input: UserIdInput,
) -> ServiceResult<Value> {
    require_admin(claims)?;
    state.auth.reactivate(&input.user_id).await?;
    to_value(serde_json::json!({ "reactivated": true }))
}

pub async fn delete_account(
    state: &AppState,
    claims: Option<&UserClaims>,
    input: UserIdInput,
) -> ServiceResult<Value> {
    require_self_or_admin(claims, &input.user_id)?;
    state.auth.delete(&input.user_id).await?;
    to_value(serde_json::json!({ "deleted": true }))
}

pub async fn current_users(
    state: &AppState,
    claims: Option<&UserClaims>,
    input: CurrentUsersInput,
) -> ServiceResult<Value> {
    require_admin(claims)?;
    let users = state
        .auth
        .current_users(input.skip, input.take, parse_role(input.role.as_deref()))
        .await?;
    to_value(users)
}

// ---- accounts ----

pub async fn accounts(
    state: &AppState,
    claims: Option<&UserClaims>,
    input: PaginationInput,
) -> ServiceResult<Value> {
    require_admin(claims)?;
    let accounts = state.accounts.list(input.skip, input.take).await?;
    to_value(accounts)
}

// ---- catalog ----

pub async fn products(state: &AppState, input: ProductsInput) -> ServiceResult<Value> {
    let products = state
        .catalog
        .list(
            input.skip,
            input.take,
            input.ids.as_deref(),
            input.query.as_deref(),
        )
        .await?;
    to_value(products)
}

pub async fn product(state: &AppState, input: ProductIdInput) -> ServiceResult<Value> {
    let product = state.catalog.get(&input.product_id).await?;
    to_value(product)
}

pub async fn suggestions(state: &AppState, input: SuggestInput) -> ServiceResult<Value> {
    let products = state
        .catalog
        .suggest(&input.prefix, input.size, input.use_ai.unwrap_or(false))
        .await?;
    to_value(products)
}

pub async fn create_product(
    state: &AppState,
    claims: Option<&UserClaims>,
    input: CreateProductInput,
) -> ServiceResult<Value> {
    require_admin(claims)?;
    let product = state
        .catalog
        .create(&NewProduct {
            name: input.name,
            description: input.description,
            price: input.price,
            stock: input.stock,
        })
        .await?;
    to_value(product)
}

pub async fn restock_product(
    state: &AppState,
    claims: Option<&UserClaims>,
    input: RestockInput,
) -> ServiceResult<Value> {
    require_admin(claims)?;
    state
        .catalog
        .restock(&input.product_id, input.new_stock)
        .await?;
    to_value(serde_json::json!({ "restocked": true }))
}

pub async fn delete_product(
    state: &AppState,
    claims: Option<&UserClaims>,
    input: ProductIdInput,
) -> ServiceResult<Value> {
    require_admin(claims)?;
    state.catalog.delete(&input.product_id).await?;
    to_value(serde_json::json!({ "deleted": true }))
}

// ---- orders ----

pub async fn create_order(
    state: &AppState,
    claims: Option<&UserClaims>,
    input: CreateOrderInput,
) -> ServiceResult<Value> {
    require_self_or_admin(claims, &input.account_id)?;
    let order = state
        .orders
        .place_order(&NewOrder {
            account_id: input.account_id,
            products: input
                .products
                .into_iter()
                .map(|l| OrderLineRequest {
                    product_id: l.product_id,
                    quantity: l.quantity,
                })
                .collect(),
        })
        .await?;
    to_value(order)
}

pub async fn orders(
    state: &AppState,
    claims: Option<&UserClaims>,
    input: OrdersInput,
) -> ServiceResult<Value> {
    let user = require_auth(claims)?;
    let subject = input
        .account_id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| user.sub.clone());
    require_self_or_admin(claims, &subject)?;

    let orders = state.orders.orders_for_account(&subject).await?;
    to_value(orders)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_claims(role: Role) -> UserClaims {
        UserClaims {
            sub: "u".repeat(27),
            email: "user@example.com".to_string(),
            role,
            token_version: 1,
        }
    }

    #[test]
    fn guests_are_unauthenticated() {
        assert!(matches!(
            require_auth(None),
            Err(ServiceError::Unauthenticated(_))
        ));
        assert!(matches!(
            require_admin(None),
            Err(ServiceError::Unauthenticated(_))
        ));
        assert!(matches!(
            require_self_or_admin(None, "anyone"),
            Err(ServiceError::Unauthenticated(_))
        ));
    }

    #[test]
    fn non_admins_are_forbidden_from_admin_operations() {
        let user = user_claims(Role::User);
        assert!(matches!(
            require_admin(Some(&user)),
            Err(ServiceError::Forbidden(_))
        ));
        assert!(require_admin(Some(&user_claims(Role::Admin))).is_ok());
    }

    #[test]
    fn self_or_admin_matrix() {
        let user = user_claims(Role::User);
        let admin = user_claims(Role::Admin);
        let own_id = "u".repeat(27);
        let other_id = "x".repeat(27);

        assert!(require_self_or_admin(Some(&user), &own_id).is_ok());
        assert!(matches!(
            require_self_or_admin(Some(&user), &other_id),
            Err(ServiceError::Forbidden(_))
        ));
        assert!(require_self_or_admin(Some(&admin), &other_id).is_ok());
    }
}
