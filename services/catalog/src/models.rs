//! Product models and request payloads

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i32,
    pub sold: i32,
    pub out_of_stock: bool,
}

/// Product creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i32,
}

/// Stock/sold mutation payload; negative quantities roll a reservation back
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockUpdate {
    pub quantity: i32,
}

/// Restock payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Restock {
    pub new_stock: i32,
}

/// Listing query: pagination plus optional id-batch and text search
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProductQuery {
    #[serde(default)]
    pub skip: u64,
    #[serde(default)]
    pub take: u64,
    /// Comma-separated ids for batch lookup
    #[serde(default)]
    pub ids: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
}

/// Suggestion query
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SuggestQuery {
    pub prefix: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub use_ai: Option<bool>,
}
