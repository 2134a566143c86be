//! Order models and request payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted order; immutable after creation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub account_id: String,
    pub total_price: f64,
    pub products: Vec<OrderLine>,
}

/// One line of an order
///
/// `stock` is the informational stock-at-placement snapshot; reads refresh
/// it with the catalog's current value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLine {
    pub product_id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: u32,
    pub stock: i32,
}

/// Order placement payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub account_id: String,
    pub products: Vec<OrderLineRequest>,
}

/// One requested line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineRequest {
    pub product_id: String,
    pub quantity: u32,
}

/// Query for the account read path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrdersQuery {
    pub account_id: String,
}
