//! Token claims and roles shared between the auth service and the gateway

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Identity attached to a verified request
///
/// Embedded in both token kinds and validated against the live account row
/// on every access; `token_version` is what makes stateless revocation work.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserClaims {
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub token_version: i32,
}

impl UserClaims {
    /// Whether this identity may act on the given account
    ///
    /// Admins may act on anyone; everyone else only on themselves.
    pub fn may_act_on(&self, account_id: &str) -> bool {
        self.role.is_admin() || self.sub == account_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
    }

    #[test]
    fn role_parses_from_str() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("user".parse::<Role>().unwrap(), Role::User);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn admins_act_on_anyone_users_only_on_self() {
        let admin = UserClaims {
            sub: "a".repeat(27),
            email: "admin@example.com".to_string(),
            role: Role::Admin,
            token_version: 1,
        };
        let user = UserClaims {
            sub: "u".repeat(27),
            email: "user@example.com".to_string(),
            role: Role::User,
            token_version: 1,
        };

        assert!(admin.may_act_on(&"x".repeat(27)));
        assert!(user.may_act_on(&"u".repeat(27)));
        assert!(!user.may_act_on(&"x".repeat(27)));
    }
}
