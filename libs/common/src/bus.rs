//! Event bus for the shopstream services
//!
//! Topic-based pub/sub over Redis. The bus carries the email job queue and
//! the order status stream; delivery is best-effort and per-topic ordering
//! is not guaranteed.

use crate::error::ServiceResult;
use futures_util::StreamExt;
use redis::{AsyncCommands, Client};
use serde::Serialize;
use std::env;
use tracing::info;

/// Topic carrying email jobs for the notifier
pub const TOPIC_EMAILS_SEND: &str = "emails.send";
/// Topic carrying order lifecycle transitions
pub const TOPIC_ORDER_STATUS: &str = "order.status.changed";

/// Configuration for the bus connection
#[derive(Debug, Clone)]
pub struct BusConfig {
    /// Bus connection URL (e.g., "redis://localhost:6379")
    pub url: String,
}

impl BusConfig {
    /// Create a new BusConfig from environment variables
    ///
    /// # Environment Variables
    /// - `BUS_URL`: bus connection URL (default: "redis://localhost:6379")
    pub fn from_env() -> Self {
        let url = env::var("BUS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
        Self { url }
    }
}

/// Handle to the event bus shared by publishers
#[derive(Clone)]
pub struct EventBus {
    client: Client,
}

impl EventBus {
    /// Connect to the bus
    pub async fn connect(config: &BusConfig) -> ServiceResult<Self> {
        let client = Client::open(config.url.clone())
            .map_err(crate::error::ServiceError::from)?;
        info!("event bus client initialized with URL: {}", config.url);
        Ok(EventBus { client })
    }

    /// Publish a JSON-serialized message on a topic
    pub async fn publish<T: Serialize>(&self, topic: &str, message: &T) -> ServiceResult<()> {
        let payload = serde_json::to_vec(message)
            .map_err(|e| crate::error::ServiceError::Internal(format!("encode failed: {}", e)))?;

        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: i64 = conn.publish(topic, payload).await?;
        Ok(())
    }

    /// Subscribe to a topic; the returned handle yields raw payloads
    pub async fn subscribe(&self, topic: &str) -> ServiceResult<Subscription> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(topic).await?;
        info!("subscribed to topic: {}", topic);
        Ok(Subscription { pubsub })
    }

    /// Check if the bus is reachable
    pub async fn health_check(&self) -> ServiceResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(pong == "PONG")
    }
}

/// A single-topic subscription
///
/// Dropping the subscription tears down the underlying connection, which
/// unsubscribes the consumer.
pub struct Subscription {
    pubsub: redis::aio::PubSub,
}

impl Subscription {
    /// Wait for the next message payload on the topic
    ///
    /// Returns `None` when the connection is closed.
    pub async fn next_payload(&mut self) -> Option<Vec<u8>> {
        let msg = self.pubsub.on_message().next().await?;
        msg.get_payload::<Vec<u8>>().ok()
    }
}
