//! Session and token state machine
//!
//! Every session-creating operation issues an access/refresh pair and
//! persists the refresh record; every revoking operation deletes the
//! records and bumps the account's token_version, which invalidates all
//! outstanding access tokens without a blacklist.

use crate::jwt::JwtManager;
use crate::models::{AuthResponse, CurrentUser};
use crate::presence::PresenceSet;
use crate::repository::RefreshStore;
use account::client::AccountsApi;
use account::models::{AccountWithHash, NewAccount};
use chrono::{Duration, Utc};
use common::claims::{Role, UserClaims};
use common::error::{ServiceError, ServiceResult};
use common::password;
use tracing::{info, warn};

pub struct AuthService<A, R> {
    jwt: JwtManager,
    accounts: A,
    store: R,
    presence: PresenceSet,
}

impl<A, R> AuthService<A, R>
where
    A: AccountsApi,
    R: RefreshStore,
{
    pub fn new(jwt: JwtManager, accounts: A, store: R) -> Self {
        Self {
            jwt,
            accounts,
            store,
            presence: PresenceSet::new(),
        }
    }

    /// Create the account, issue a session, mark the user present
    pub async fn signup(
        &self,
        name: &str,
        email: &str,
        plain_password: &str,
        role: Option<Role>,
    ) -> ServiceResult<AuthResponse> {
        let account = self
            .accounts
            .create(&NewAccount {
                name: name.to_string(),
                email: email.to_string(),
                password: plain_password.to_string(),
                role: Some(role.unwrap_or_default()),
            })
            .await?;

        let response = self
            .issue_session(
                &account.id,
                &account.email,
                account.role(),
                account.token_version,
            )
            .await?;

        self.presence.mark(&account.id).await;
        info!("signup successful for {}", email);
        Ok(response)
    }

    /// Check credentials and issue a session
    ///
    /// A user already in the presence set is refused a second session.
    pub async fn login(&self, email: &str, plain_password: &str) -> ServiceResult<AuthResponse> {
        let account = match self.accounts.get_for_auth(email).await {
            Ok(account) => account,
            Err(ServiceError::NotFound(_)) => {
                return Err(ServiceError::Unauthenticated(
                    "invalid email or password".to_string(),
                ));
            }
            Err(other) => return Err(other),
        };

        if !account.is_active {
            return Err(ServiceError::Forbidden("account is not active".to_string()));
        }
        if !password::verify(plain_password, &account.password_hash) {
            return Err(ServiceError::Unauthenticated(
                "invalid email or password".to_string(),
            ));
        }
        if self.presence.contains(&account.id).await {
            return Err(ServiceError::Conflict(
                "user already logged in".to_string(),
            ));
        }

        let response = self.issue_for(&account).await?;
        self.presence.mark(&account.id).await;
        info!("login successful for {}", email);
        Ok(response)
    }

    /// Rotate the session: re-issue both tokens from the stored record
    ///
    /// Rotation is not serialized; concurrent refreshes may both succeed and
    /// the latest record wins by max expires_at.
    pub async fn refresh(&self, user_id: &str) -> ServiceResult<AuthResponse> {
        let record = match self.store.latest(user_id).await {
            Ok(record) => record,
            Err(ServiceError::NotFound(_)) => {
                return Err(ServiceError::Unauthenticated(
                    "no session for user, please login".to_string(),
                ));
            }
            Err(other) => return Err(other),
        };

        if record.expires_at < Utc::now() {
            return Err(ServiceError::Expired(
                "refresh token expired, please login again".to_string(),
            ));
        }

        let claims = self.jwt.parse_refresh_token(&record.refresh_token)?;
        let response = self
            .issue_session(&claims.sub, &claims.email, claims.role, claims.token_version)
            .await?;

        info!("refresh token rotated for {}", claims.email);
        Ok(response)
    }

    /// Validate an access token against the live account row
    pub async fn verify(&self, access_token: &str) -> ServiceResult<UserClaims> {
        let claims = self.jwt.verify_access_token(access_token)?;
        let account = self.accounts.get_for_auth(&claims.email).await?;

        if claims.token_version != account.token_version {
            return Err(ServiceError::Revoked(
                "token invalid or expired, please login again".to_string(),
            ));
        }

        Ok(claims.into())
    }

    /// Revoke one user's sessions, or every present user's when id is None
    pub async fn logout(&self, user_id: Option<&str>) -> ServiceResult<()> {
        match user_id {
            Some(id) => {
                self.revoke(id).await?;
                self.presence.remove(id).await;
                info!("user logged out: {}", id);
                Ok(())
            }
            None => {
                for id in self.presence.snapshot().await {
                    self.revoke(&id).await?;
                    info!("user logged out: {}", id);
                }
                self.presence.clear().await;
                info!("all users logged out");
                Ok(())
            }
        }
    }

    /// Replace the password, revoke everything, then start a fresh session
    pub async fn reset_password(
        &self,
        email: &str,
        new_password: &str,
        user_id: &str,
    ) -> ServiceResult<AuthResponse> {
        self.accounts.update_password(email, new_password).await?;
        self.revoke(user_id).await?;

        let account = self.accounts.get_for_auth(email).await?;
        let response = self.issue_for(&account).await?;
        self.presence.mark(&account.id).await;
        info!("password reset for {}", email);
        Ok(response)
    }

    pub async fn deactivate(&self, user_id: &str) -> ServiceResult<()> {
        self.accounts.deactivate(user_id).await?;
        self.logout(Some(user_id)).await?;
        info!("account deactivated: {}", user_id);
        Ok(())
    }

    pub async fn reactivate(&self, user_id: &str) -> ServiceResult<()> {
        self.accounts.reactivate(user_id).await?;
        info!("account reactivated: {}", user_id);
        Ok(())
    }

    /// Delete the account and its sessions
    ///
    /// No token_version bump: the row is gone, so verification fails on the
    /// account lookup instead.
    pub async fn delete(&self, user_id: &str) -> ServiceResult<()> {
        self.accounts.delete(user_id).await?;
        self.store.delete_all(user_id).await?;
        self.presence.remove(user_id).await;
        info!("account deleted: {}", user_id);
        Ok(())
    }

    /// Page through the presence set, enriched from the account service
    pub async fn current_users(
        &self,
        skip: u64,
        take: u64,
        role: Option<Role>,
    ) -> ServiceResult<Vec<CurrentUser>> {
        let ids = self.presence.snapshot().await;
        let mut users = Vec::new();

        for id in ids.into_iter().skip(skip as usize) {
            if take > 0 && users.len() as u64 >= take {
                break;
            }
            let account = match self.accounts.get(&id).await {
                Ok(account) => account,
                Err(e) => {
                    // a stale presence entry should not fail the listing
                    warn!("skipping present user {}: {}", id, e);
                    continue;
                }
            };
            if let Some(role) = role {
                if account.role() != role {
                    continue;
                }
            }
            let role = account.role();
            users.push(CurrentUser {
                id,
                name: account.name,
                email: account.email,
                role,
            });
        }

        Ok(users)
    }

    /// Delete refresh records and bump token_version for one user
    async fn revoke(&self, user_id: &str) -> ServiceResult<()> {
        self.store.delete_all(user_id).await?;
        self.accounts.increment_token_version(user_id).await?;
        Ok(())
    }

    async fn issue_for(&self, account: &AccountWithHash) -> ServiceResult<AuthResponse> {
        let role = account.role.parse().unwrap_or_default();
        self.issue_session(&account.id, &account.email, role, account.token_version)
            .await
    }

    /// Generate both tokens and persist the refresh record
    async fn issue_session(
        &self,
        sub: &str,
        email: &str,
        role: Role,
        token_version: i32,
    ) -> ServiceResult<AuthResponse> {
        let access_token = self
            .jwt
            .generate_access_token(sub, email, role, token_version)?;
        let refresh_token = self
            .jwt
            .generate_refresh_token(sub, email, role, token_version)?;

        let expires_at = Utc::now() + Duration::seconds(self.jwt.refresh_expiry_secs());
        self.store.store(sub, &refresh_token, expires_at).await?;

        Ok(AuthResponse {
            access_token,
            refresh_token,
            user_id: sub.to_string(),
            email: email.to_string(),
            role,
        })
    }
}
