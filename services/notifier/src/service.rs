//! Email job consumer

use crate::mailer::Mailer;
use crate::template;
use common::bus::{EventBus, TOPIC_EMAILS_SEND};
use common::error::{ServiceError, ServiceResult};
use common::events::EmailJob;
use tracing::{error, info};

pub struct Notifier<M> {
    bus: EventBus,
    mailer: M,
}

impl<M: Mailer> Notifier<M> {
    pub fn new(bus: EventBus, mailer: M) -> Self {
        Self { bus, mailer }
    }

    /// Consume email jobs until the bus connection closes
    ///
    /// Malformed payloads and send failures are logged and skipped; a
    /// poisoned job must never take the consumer down.
    pub async fn run(&self) -> ServiceResult<()> {
        let mut subscription = self.bus.subscribe(TOPIC_EMAILS_SEND).await?;
        info!("email subscriber started");

        while let Some(payload) = subscription.next_payload().await {
            let job: EmailJob = match serde_json::from_slice(&payload) {
                Ok(job) => job,
                Err(e) => {
                    error!("invalid email job payload: {}", e);
                    continue;
                }
            };

            if let Err(e) = self.handle(&job).await {
                error!("failed to send email to {}: {}", job.to, e);
            }
        }

        info!("email subscriber stopped");
        Ok(())
    }

    /// Render and dispatch one job
    pub async fn handle(&self, job: &EmailJob) -> ServiceResult<()> {
        if job.to.is_empty() || job.subject.is_empty() || job.template_name.is_empty() {
            return Err(ServiceError::Validation(
                "email job missing required fields".to_string(),
            ));
        }

        let body = template::render(&job.template_name, &job.template_data)?;
        self.mailer.send(&job.to, &job.subject, &body).await?;
        info!("email sent to {}", job.to);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailer::Mailer;
    use async_trait::async_trait;
    use common::bus::BusConfig;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct RecordingMailer {
        sent: Arc<Mutex<Vec<(String, String, String)>>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, to: &str, subject: &str, body: &str) -> ServiceResult<()> {
            self.sent
                .lock()
                .await
                .push((to.to_string(), subject.to_string(), body.to_string()));
            Ok(())
        }
    }

    async fn notifier() -> (Notifier<RecordingMailer>, RecordingMailer) {
        let bus = EventBus::connect(&BusConfig {
            url: "redis://localhost:6379".to_string(),
        })
        .await
        .expect("client construction does not touch the network");
        let mailer = RecordingMailer::default();
        (Notifier::new(bus, mailer.clone()), mailer)
    }

    fn job(template_name: &str) -> EmailJob {
        let mut data = HashMap::new();
        data.insert("Name".to_string(), "Alice".to_string());
        data.insert("Email".to_string(), "a@x.com".to_string());
        EmailJob {
            to: "a@x.com".to_string(),
            subject: "Welcome".to_string(),
            template_name: template_name.to_string(),
            template_data: data,
        }
    }

    #[tokio::test]
    async fn handle_renders_and_sends() {
        let (notifier, mailer) = notifier().await;
        notifier.handle(&job("account_created")).await.unwrap();

        let sent = mailer.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "a@x.com");
        assert!(sent[0].2.contains("Hi Alice,"));
    }

    #[tokio::test]
    async fn handle_rejects_incomplete_jobs() {
        let (notifier, mailer) = notifier().await;
        let mut bad = job("account_created");
        bad.to = String::new();

        assert!(matches!(
            notifier.handle(&bad).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(mailer.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn handle_rejects_unknown_templates() {
        let (notifier, mailer) = notifier().await;
        assert!(matches!(
            notifier.handle(&job("mystery")).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(mailer.sent.lock().await.is_empty());
    }
}
