//! Outbound mail transport contract
//!
//! Delivery is a collaborator concern: the notifier renders and hands off.
//! `LogMailer` is the default transport and simply records the send.

use async_trait::async_trait;
use common::error::ServiceResult;
use std::env;
use tracing::info;

/// Sender identity for outbound mail
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub from_email: String,
    pub from_name: String,
}

impl MailConfig {
    /// Read `MAIL_FROM_EMAIL` / `MAIL_FROM_NAME`
    pub fn from_env() -> Self {
        Self {
            from_email: env::var("MAIL_FROM_EMAIL")
                .unwrap_or_else(|_| "noreply@shopstream.dev".to_string()),
            from_name: env::var("MAIL_FROM_NAME").unwrap_or_else(|_| "shopstream".to_string()),
        }
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> ServiceResult<()>;
}

/// Transport that logs instead of delivering
pub struct LogMailer {
    config: MailConfig,
}

impl LogMailer {
    pub fn new(config: MailConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> ServiceResult<()> {
        info!(
            "email from {} <{}> to {} | subject: {} | {} bytes",
            self.config.from_name,
            self.config.from_email,
            to,
            subject,
            body.len()
        );
        Ok(())
    }
}
