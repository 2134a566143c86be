//! Order status subscriptions over WebSocket
//!
//! The client's first frame names the subscription and an optional order
//! id filter. Matching bus messages are forwarded as JSON text frames
//! through a depth-10 channel; when the channel is full the message is
//! dropped for that subscriber. A heartbeat frame every 30 seconds keeps
//! intermediaries from reaping idle connections.

use crate::state::AppState;
use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use common::bus::TOPIC_ORDER_STATUS;
use common::events::OrderStatusUpdate;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Per-subscription buffer depth
const CHANNEL_DEPTH: usize = 10;
/// Keep-alive interval
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// First frame a subscriber sends
#[derive(Debug, Deserialize)]
struct SubscribeRequest {
    subscribe: String,
    #[serde(default, rename = "orderId")]
    order_id: Option<String>,
}

/// Whether an update passes the subscriber's filter
pub fn matches_filter(update: &OrderStatusUpdate, order_id: Option<&str>) -> bool {
    match order_id {
        Some(id) => update.order_id == id,
        None => true,
    }
}

pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

async fn handle_socket(state: AppState, mut socket: WebSocket) {
    // the first frame selects the subscription
    let request = match read_subscribe_request(&mut socket).await {
        Some(request) => request,
        None => return,
    };
    if request.subscribe != "orderStatusChanged" {
        let _ = socket
            .send(Message::Text(
                serde_json::json!({
                    "errors": [{ "message": "unknown subscription", "code": "validation" }]
                })
                .to_string(),
            ))
            .await;
        return;
    }

    let filter = request.order_id.clone();
    info!(
        "subscription opened for {}",
        filter.as_deref().unwrap_or("all orders")
    );

    let mut subscription = match state.bus.subscribe(TOPIC_ORDER_STATUS).await {
        Ok(subscription) => subscription,
        Err(e) => {
            error!("failed to subscribe to status topic: {}", e);
            return;
        }
    };

    let (tx, mut rx) = mpsc::channel::<OrderStatusUpdate>(CHANNEL_DEPTH);

    // single writer: the bus callback task feeds the channel
    let reader = tokio::spawn(async move {
        while let Some(payload) = subscription.next_payload().await {
            let update: OrderStatusUpdate = match serde_json::from_slice(&payload) {
                Ok(update) => update,
                Err(e) => {
                    error!("malformed status update: {}", e);
                    continue;
                }
            };
            if !matches_filter(&update, filter.as_deref()) {
                continue;
            }
            if let Err(mpsc::error::TrySendError::Full(update)) = tx.try_send(update) {
                warn!(
                    "subscriber buffer full, dropping update for order {}",
                    update.order_id
                );
            }
        }
    });

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    heartbeat.tick().await; // the first tick fires immediately

    loop {
        tokio::select! {
            update = rx.recv() => {
                let Some(update) = update else { break };
                let frame = match serde_json::to_string(&update) {
                    Ok(frame) => frame,
                    Err(e) => {
                        error!("failed to encode status update: {}", e);
                        continue;
                    }
                };
                if socket.send(Message::Text(frame)).await.is_err() {
                    break;
                }
            }
            _ = heartbeat.tick() => {
                let frame = serde_json::json!({ "type": "heartbeat" }).to_string();
                if socket.send(Message::Text(frame)).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    // other client frames are ignored
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    // dropping the reader tears down the bus subscription
    reader.abort();
    info!("subscription closed");
}

async fn read_subscribe_request(socket: &mut WebSocket) -> Option<SubscribeRequest> {
    loop {
        match socket.recv().await? {
            Ok(Message::Text(text)) => match serde_json::from_str(&text) {
                Ok(request) => return Some(request),
                Err(e) => {
                    warn!("invalid subscribe frame: {}", e);
                    return None;
                }
            },
            Ok(Message::Close(_)) | Err(_) => return None,
            // ping/pong and binary frames before the subscribe are ignored
            Ok(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::events::OrderStatus;

    fn update(order_id: &str) -> OrderStatusUpdate {
        OrderStatusUpdate {
            order_id: order_id.to_string(),
            status: OrderStatus::Confirmed,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn filter_matches_only_the_requested_order() {
        let u = update("order-x");
        assert!(matches_filter(&u, Some("order-x")));
        assert!(!matches_filter(&u, Some("order-y")));
    }

    #[test]
    fn absent_filter_matches_everything() {
        assert!(matches_filter(&update("order-x"), None));
        assert!(matches_filter(&update("order-y"), None));
    }

    #[test]
    fn subscribe_frame_parses_with_and_without_filter() {
        let with: SubscribeRequest = serde_json::from_str(
            r#"{"subscribe": "orderStatusChanged", "orderId": "order-x"}"#,
        )
        .unwrap();
        assert_eq!(with.subscribe, "orderStatusChanged");
        assert_eq!(with.order_id.as_deref(), Some("order-x"));

        let without: SubscribeRequest =
            serde_json::from_str(r#"{"subscribe": "orderStatusChanged"}"#).unwrap();
        assert!(without.order_id.is_none());
    }
}
