//! Input validation
//!
//! Every operation input is validated here before the gateway touches a
//! downstream service. Failures surface as `ServiceError::Validation` with
//! the offending field named.

use common::error::{ServiceError, ServiceResult};
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("email regex compiles")
    })
}

fn id_regex() -> &'static Regex {
    static ID_REGEX: OnceLock<Regex> = OnceLock::new();
    ID_REGEX.get_or_init(|| Regex::new(r"^[a-zA-Z0-9]{10,40}$").expect("id regex compiles"))
}

fn fail(message: impl Into<String>) -> ServiceError {
    ServiceError::Validation(message.into())
}

pub fn validate_email(email: &str) -> ServiceResult<()> {
    if email.is_empty() {
        return Err(fail("email is required"));
    }
    if email.len() > 254 {
        return Err(fail("email must be at most 254 characters long"));
    }
    if !email_regex().is_match(email) {
        return Err(fail("invalid email format"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> ServiceResult<()> {
    if password.len() < 6 {
        return Err(fail("password must be at least 6 characters long"));
    }
    if password.len() > 128 {
        return Err(fail("password must be at most 128 characters long"));
    }
    Ok(())
}

/// Alphanumeric sortable id, 10-40 characters
pub fn validate_id(id: &str, field: &str) -> ServiceResult<()> {
    if !id_regex().is_match(id) {
        return Err(fail(format!(
            "{} must be 10-40 alphanumeric characters",
            field
        )));
    }
    Ok(())
}

pub fn validate_role(role: Option<&str>) -> ServiceResult<()> {
    match role {
        None | Some("") | Some("user") | Some("admin") => Ok(()),
        Some(_) => Err(fail("role must be one of: user, admin")),
    }
}

pub fn validate_take(take: u64) -> ServiceResult<()> {
    if take > 100 {
        return Err(fail("take must be at most 100"));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct SignupInput {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

impl SignupInput {
    pub fn validate(&self) -> ServiceResult<()> {
        if self.name.len() < 2 {
            return Err(fail("name must be at least 2 characters long"));
        }
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        validate_role(self.role.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

impl LoginInput {
    pub fn validate(&self) -> ServiceResult<()> {
        validate_email(&self.email)?;
        validate_password(&self.password)
    }
}

#[derive(Debug, Deserialize)]
pub struct RefreshInput {
    #[serde(rename = "userId")]
    pub user_id: String,
}

impl RefreshInput {
    pub fn validate(&self) -> ServiceResult<()> {
        validate_id(&self.user_id, "userId")
    }
}

#[derive(Debug, Deserialize)]
pub struct LogoutInput {
    /// Absent means global logout (admin only)
    #[serde(default, rename = "userId")]
    pub user_id: Option<String>,
}

impl LogoutInput {
    pub fn validate(&self) -> ServiceResult<()> {
        match self.user_id.as_deref() {
            None | Some("") => Ok(()),
            Some(id) => validate_id(id, "userId"),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordInput {
    pub email: String,
    pub password: String,
}

impl ResetPasswordInput {
    pub fn validate(&self) -> ServiceResult<()> {
        validate_email(&self.email)?;
        validate_password(&self.password)
    }
}

#[derive(Debug, Deserialize)]
pub struct UserIdInput {
    #[serde(rename = "userId")]
    pub user_id: String,
}

impl UserIdInput {
    pub fn validate(&self) -> ServiceResult<()> {
        validate_id(&self.user_id, "userId")
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i32,
}

impl CreateProductInput {
    pub fn validate(&self) -> ServiceResult<()> {
        if self.name.len() < 2 {
            return Err(fail("name must be at least 2 characters long"));
        }
        if self.description.len() < 5 {
            return Err(fail("description must be at least 5 characters long"));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(fail("price must be a non-negative number"));
        }
        if self.stock < 0 {
            return Err(fail("stock must be non-negative"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct ProductIdInput {
    #[serde(rename = "productId")]
    pub product_id: String,
}

impl ProductIdInput {
    pub fn validate(&self) -> ServiceResult<()> {
        validate_id(&self.product_id, "productId")
    }
}

#[derive(Debug, Deserialize)]
pub struct RestockInput {
    #[serde(rename = "productId")]
    pub product_id: String,
    #[serde(rename = "newStock")]
    pub new_stock: i32,
}

impl RestockInput {
    pub fn validate(&self) -> ServiceResult<()> {
        validate_id(&self.product_id, "productId")?;
        if self.new_stock <= 0 {
            return Err(fail("newStock must be greater than zero"));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct OrderLineInput {
    #[serde(rename = "productId")]
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderInput {
    #[serde(rename = "accountId")]
    pub account_id: String,
    pub products: Vec<OrderLineInput>,
}

impl CreateOrderInput {
    pub fn validate(&self) -> ServiceResult<()> {
        validate_id(&self.account_id, "accountId")?;
        if self.products.is_empty() {
            return Err(fail("products must contain at least one line"));
        }
        for line in &self.products {
            validate_id(&line.product_id, "productId")?;
            if line.quantity == 0 {
                return Err(fail("quantity must be greater than zero"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PaginationInput {
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub take: u64,
}

impl PaginationInput {
    pub fn validate(&self) -> ServiceResult<()> {
        validate_take(self.take)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductsInput {
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub take: u64,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub ids: Option<Vec<String>>,
}

impl ProductsInput {
    pub fn validate(&self) -> ServiceResult<()> {
        validate_take(self.take)?;
        if let Some(ids) = &self.ids {
            for id in ids {
                validate_id(id, "ids")?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct SuggestInput {
    pub prefix: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default, rename = "useAi")]
    pub use_ai: Option<bool>,
}

impl SuggestInput {
    pub fn validate(&self) -> ServiceResult<()> {
        if self.prefix.is_empty() {
            return Err(fail("prefix is required"));
        }
        if let Some(size) = self.size {
            if size == 0 || size > 25 {
                return Err(fail("size must be between 1 and 25"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CurrentUsersInput {
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub take: u64,
    #[serde(default)]
    pub role: Option<String>,
}

impl CurrentUsersInput {
    pub fn validate(&self) -> ServiceResult<()> {
        validate_take(self.take)?;
        validate_role(self.role.as_deref())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct OrdersInput {
    /// Absent means the caller's own account
    #[serde(default, rename = "accountId")]
    pub account_id: Option<String>,
}

impl OrdersInput {
    pub fn validate(&self) -> ServiceResult<()> {
        match self.account_id.as_deref() {
            None | Some("") => Ok(()),
            Some(id) => validate_id(id, "accountId"),
        }
    }
}
