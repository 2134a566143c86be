//! Order status simulation
//!
//! After placement the order walks Confirmed → Packed → Shipped →
//! Delivered, one transition every 15 seconds, published on the status
//! topic. The task is detached from the placing request and publish
//! failures are swallowed: the stream is best-effort.

use crate::publisher::EventPublisher;
use chrono::Utc;
use common::events::{OrderStatus, OrderStatusUpdate};
use std::time::Duration;
use tracing::{error, info};

/// Delay before each transition
const STEP_DELAY: Duration = Duration::from_secs(15);

/// Spawn the lifecycle task for one order
pub fn spawn<P>(publisher: P, order_id: String)
where
    P: EventPublisher + Clone + Send + Sync + 'static,
{
    tokio::spawn(run(publisher, order_id));
}

async fn run<P: EventPublisher>(publisher: P, order_id: String) {
    info!("simulating status changes for order {}", order_id);

    for status in OrderStatus::SEQUENCE {
        tokio::time::sleep(STEP_DELAY).await;

        let update = OrderStatusUpdate {
            order_id: order_id.clone(),
            status,
            updated_at: Utc::now(),
        };
        match publisher.publish_status(&update).await {
            Ok(()) => info!("published status {} for order {}", status.as_str(), order_id),
            Err(e) => error!(
                "failed to publish status {} for order {}: {}",
                status.as_str(),
                order_id,
                e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use common::error::{ServiceError, ServiceResult};
    use common::events::EmailJob;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct RecordingPublisher {
        updates: Arc<Mutex<Vec<OrderStatusUpdate>>>,
        fail: bool,
    }

    #[async_trait]
    impl EventPublisher for RecordingPublisher {
        async fn publish_email(&self, _job: &EmailJob) -> ServiceResult<()> {
            Ok(())
        }

        async fn publish_status(&self, update: &OrderStatusUpdate) -> ServiceResult<()> {
            if self.fail {
                return Err(ServiceError::Upstream("bus down".to_string()));
            }
            self.updates.lock().await.push(update.clone());
            Ok(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn emits_four_transitions_in_order() {
        let publisher = RecordingPublisher::default();
        run(publisher.clone(), "order-1".to_string()).await;

        let updates = publisher.updates.lock().await;
        let statuses: Vec<&str> = updates.iter().map(|u| u.status.as_str()).collect();
        assert_eq!(statuses, vec!["Confirmed", "Packed", "Shipped", "Delivered"]);
        assert!(updates.iter().all(|u| u.order_id == "order-1"));
    }

    #[tokio::test(start_paused = true)]
    async fn publish_failures_do_not_abort_the_sequence() {
        let publisher = RecordingPublisher {
            fail: true,
            ..Default::default()
        };
        // completing without panicking is the contract
        run(publisher, "order-2".to_string()).await;
    }
}
