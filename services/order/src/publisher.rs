//! Publisher seam for the order service's bus traffic
//!
//! The saga and the status simulator publish through this trait so tests
//! can capture events without a running bus.

use async_trait::async_trait;
use common::bus::{EventBus, TOPIC_EMAILS_SEND, TOPIC_ORDER_STATUS};
use common::error::ServiceResult;
use common::events::{EmailJob, OrderStatusUpdate};

#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish_email(&self, job: &EmailJob) -> ServiceResult<()>;
    async fn publish_status(&self, update: &OrderStatusUpdate) -> ServiceResult<()>;
}

/// Production publisher backed by the shared event bus
#[derive(Clone)]
pub struct BusPublisher {
    bus: EventBus,
}

impl BusPublisher {
    pub fn new(bus: EventBus) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl EventPublisher for BusPublisher {
    async fn publish_email(&self, job: &EmailJob) -> ServiceResult<()> {
        self.bus.publish(TOPIC_EMAILS_SEND, job).await
    }

    async fn publish_status(&self, update: &OrderStatusUpdate) -> ServiceResult<()> {
        self.bus.publish(TOPIC_ORDER_STATUS, update).await
    }
}
