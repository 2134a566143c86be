//! Payloads carried on the event bus

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Email job published to `emails.send` and consumed by the notifier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmailJob {
    pub to: String,
    pub subject: String,
    pub template_name: String,
    pub template_data: HashMap<String, String>,
}

/// Lifecycle transition published to `order.status.changed`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusUpdate {
    pub order_id: String,
    pub status: OrderStatus,
    pub updated_at: DateTime<Utc>,
}

/// The four lifecycle states an order passes through after placement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderStatus {
    Confirmed,
    Packed,
    Shipped,
    Delivered,
}

impl OrderStatus {
    /// The transitions in emission order
    pub const SEQUENCE: [OrderStatus; 4] = [
        OrderStatus::Confirmed,
        OrderStatus::Packed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Packed => "Packed",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
        }
    }
}
