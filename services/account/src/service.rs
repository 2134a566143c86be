//! Account service logic

use crate::models::{Account, AccountWithHash, NewAccount};
use crate::repository::AccountRepository;
use common::bus::{EventBus, TOPIC_EMAILS_SEND};
use common::claims::Role;
use common::error::ServiceResult;
use common::events::EmailJob;
use common::{id, password};
use std::collections::HashMap;
use tracing::{error, info};

/// Largest page a list call will serve
const MAX_PAGE: u64 = 100;

#[derive(Clone)]
pub struct AccountService {
    repo: AccountRepository,
    bus: EventBus,
}

impl AccountService {
    pub fn new(repo: AccountRepository, bus: EventBus) -> Self {
        Self { repo, bus }
    }

    /// Create an account and enqueue the welcome email
    ///
    /// The password is hashed here; callers never ship a hash over the wire.
    /// The email publish is best-effort: the account is already durable, so
    /// a bus failure is logged and swallowed.
    pub async fn create(&self, new_account: &NewAccount) -> ServiceResult<Account> {
        let role = new_account.role.unwrap_or(Role::User);
        let password_hash = password::hash(&new_account.password)?;

        let row = AccountWithHash {
            id: id::generate(),
            name: new_account.name.clone(),
            email: new_account.email.clone(),
            password_hash,
            role: role.as_str().to_string(),
            token_version: 1,
            is_active: true,
        };
        self.repo.create(&row).await?;
        info!("account created: {}", row.id);

        let job = welcome_email(&row.name, &row.email);
        if let Err(e) = self.bus.publish(TOPIC_EMAILS_SEND, &job).await {
            error!("failed to publish welcome email for {}: {}", row.email, e);
        }

        Ok(Account {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role,
            token_version: row.token_version,
            is_active: row.is_active,
        })
    }

    pub async fn get(&self, id: &str) -> ServiceResult<Account> {
        self.repo.get_by_id(id).await
    }

    pub async fn list(&self, skip: u64, take: u64) -> ServiceResult<Vec<Account>> {
        let take = if take == 0 || take > MAX_PAGE {
            MAX_PAGE
        } else {
            take
        };
        self.repo.list(skip, take).await
    }

    pub async fn get_for_auth(&self, email: &str) -> ServiceResult<AccountWithHash> {
        self.repo.get_for_auth(email).await
    }

    pub async fn increment_token_version(&self, id: &str) -> ServiceResult<()> {
        self.repo.increment_token_version(id).await
    }

    /// Re-hash and store a new password for the account
    pub async fn update_password(&self, email: &str, new_password: &str) -> ServiceResult<()> {
        let password_hash = password::hash(new_password)?;
        self.repo.update_password(email, &password_hash).await
    }

    pub async fn deactivate(&self, id: &str) -> ServiceResult<()> {
        self.repo.set_active(id, false).await
    }

    pub async fn reactivate(&self, id: &str) -> ServiceResult<()> {
        self.repo.set_active(id, true).await
    }

    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        self.repo.delete(id).await
    }
}

fn welcome_email(name: &str, email: &str) -> EmailJob {
    let mut data = HashMap::new();
    data.insert("Name".to_string(), name.to_string());
    data.insert("Email".to_string(), email.to_string());
    EmailJob {
        to: email.to_string(),
        subject: "Welcome to shopstream!".to_string(),
        template_name: "account_created".to_string(),
        template_data: data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn welcome_email_targets_the_new_account() {
        let job = welcome_email("Alice", "alice@example.com");
        assert_eq!(job.to, "alice@example.com");
        assert_eq!(job.template_name, "account_created");
        assert_eq!(job.template_data.get("Name").unwrap(), "Alice");
        assert_eq!(job.template_data.get("Email").unwrap(), "alice@example.com");
    }
}
