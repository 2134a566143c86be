//! JWT issuance and verification
//!
//! Two HMAC-SHA-256 keys live here for the life of the process: one signs
//! short-lived access tokens, the other signs the refresh tokens whose
//! stored copies drive rotation. Claims carry the account's token_version
//! so revocation stays stateless.

use common::claims::{Role, UserClaims};
use common::error::{ServiceError, ServiceResult};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret signing access tokens
    pub access_secret: String,
    /// Secret signing refresh tokens
    pub refresh_secret: String,
    /// Access token expiration in seconds (default: 15 minutes)
    pub access_expiry_secs: i64,
    /// Refresh token expiration in seconds (default: 7 days)
    pub refresh_expiry_secs: i64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `ACCESS_TOKEN_SECRET`: key for access tokens (required)
    /// - `REFRESH_TOKEN_SECRET`: key for refresh tokens (required)
    /// - `ACCESS_TOKEN_EXPIRY`: access expiry in seconds (default: 900)
    /// - `REFRESH_TOKEN_EXPIRY`: refresh expiry in seconds (default: 604800)
    pub fn from_env() -> ServiceResult<Self> {
        let access_secret = std::env::var("ACCESS_TOKEN_SECRET").map_err(|_| {
            ServiceError::Internal("ACCESS_TOKEN_SECRET environment variable not set".to_string())
        })?;
        let refresh_secret = std::env::var("REFRESH_TOKEN_SECRET").map_err(|_| {
            ServiceError::Internal("REFRESH_TOKEN_SECRET environment variable not set".to_string())
        })?;

        let access_expiry_secs = std::env::var("ACCESS_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "900".to_string())
            .parse()
            .unwrap_or(900);

        let refresh_expiry_secs = std::env::var("REFRESH_TOKEN_EXPIRY")
            .unwrap_or_else(|_| "604800".to_string())
            .parse()
            .unwrap_or(604800);

        Ok(JwtConfig {
            access_secret,
            refresh_secret,
            access_expiry_secs,
            refresh_expiry_secs,
        })
    }
}

/// Claims embedded in both token kinds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Account id
    pub sub: String,
    pub email: String,
    pub role: Role,
    /// Account token_version at issuance
    pub token_version: i32,
    /// Expiration (unix seconds)
    pub exp: i64,
    /// Per-token nonce so two tokens for the same claims never collide
    pub jti: String,
}

impl From<TokenClaims> for UserClaims {
    fn from(claims: TokenClaims) -> Self {
        UserClaims {
            sub: claims.sub,
            email: claims.email,
            role: claims.role,
            token_version: claims.token_version,
        }
    }
}

/// Signs and verifies both token kinds
#[derive(Clone)]
pub struct JwtManager {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_expiry_secs: i64,
    refresh_expiry_secs: i64,
}

impl JwtManager {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            access_expiry_secs: config.access_expiry_secs,
            refresh_expiry_secs: config.refresh_expiry_secs,
        }
    }

    /// Seconds a refresh token (and its stored record) stays valid
    pub fn refresh_expiry_secs(&self) -> i64 {
        self.refresh_expiry_secs
    }

    /// Generate an access token for the given identity
    pub fn generate_access_token(
        &self,
        sub: &str,
        email: &str,
        role: Role,
        token_version: i32,
    ) -> ServiceResult<String> {
        self.sign(
            sub,
            email,
            role,
            token_version,
            self.access_expiry_secs,
            &self.access_encoding,
        )
    }

    /// Generate a refresh token for the given identity
    pub fn generate_refresh_token(
        &self,
        sub: &str,
        email: &str,
        role: Role,
        token_version: i32,
    ) -> ServiceResult<String> {
        self.sign(
            sub,
            email,
            role,
            token_version,
            self.refresh_expiry_secs,
            &self.refresh_encoding,
        )
    }

    fn sign(
        &self,
        sub: &str,
        email: &str,
        role: Role,
        token_version: i32,
        expiry_secs: i64,
        key: &EncodingKey,
    ) -> ServiceResult<String> {
        let claims = TokenClaims {
            sub: sub.to_string(),
            email: email.to_string(),
            role,
            token_version,
            exp: chrono::Utc::now().timestamp() + expiry_secs,
            jti: common::id::generate(),
        };

        encode(&Header::default(), &claims, key)
            .map_err(|e| ServiceError::Internal(format!("failed to sign token: {}", e)))
    }

    /// Parse and signature-check an access token
    pub fn verify_access_token(&self, token: &str) -> ServiceResult<TokenClaims> {
        Self::parse(token, &self.access_decoding)
    }

    /// Parse and signature-check a refresh token
    pub fn parse_refresh_token(&self, token: &str) -> ServiceResult<TokenClaims> {
        Self::parse(token, &self.refresh_decoding)
    }

    fn parse(token: &str, key: &DecodingKey) -> ServiceResult<TokenClaims> {
        let data = decode::<TokenClaims>(token, key, &Validation::default()).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    ServiceError::Expired("token expired".to_string())
                }
                _ => ServiceError::Unauthenticated("invalid token".to_string()),
            }
        })?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_manager() -> JwtManager {
        JwtManager::new(&JwtConfig {
            access_secret: "access-test-secret".to_string(),
            refresh_secret: "refresh-test-secret".to_string(),
            access_expiry_secs: 900,
            refresh_expiry_secs: 604800,
        })
    }

    #[test]
    fn access_token_round_trips() {
        let jwt = test_manager();
        let sub = "u".repeat(27);
        let token = jwt
            .generate_access_token(&sub, "a@x.com", Role::User, 3)
            .unwrap();
        let claims = jwt.verify_access_token(&token).unwrap();
        assert_eq!(claims.sub, sub);
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.token_version, 3);
    }

    #[test]
    fn access_key_rejects_refresh_tokens() {
        let jwt = test_manager();
        let refresh = jwt
            .generate_refresh_token("u1", "a@x.com", Role::User, 1)
            .unwrap();
        assert!(matches!(
            jwt.verify_access_token(&refresh),
            Err(ServiceError::Unauthenticated(_))
        ));
    }

    #[test]
    fn refresh_key_rejects_access_tokens() {
        let jwt = test_manager();
        let access = jwt
            .generate_access_token("u1", "a@x.com", Role::User, 1)
            .unwrap();
        assert!(matches!(
            jwt.parse_refresh_token(&access),
            Err(ServiceError::Unauthenticated(_))
        ));
    }

    #[test]
    fn expired_token_reports_expired() {
        let jwt = JwtManager::new(&JwtConfig {
            access_secret: "access-test-secret".to_string(),
            refresh_secret: "refresh-test-secret".to_string(),
            // issued already past its exp, beyond the decoder's leeway
            access_expiry_secs: -300,
            refresh_expiry_secs: 604800,
        });
        let token = jwt
            .generate_access_token("u1", "a@x.com", Role::User, 1)
            .unwrap();
        assert!(matches!(
            jwt.verify_access_token(&token),
            Err(ServiceError::Expired(_))
        ));
    }

    #[test]
    fn tokens_for_the_same_identity_are_distinct() {
        let jwt = test_manager();
        let a = jwt
            .generate_refresh_token("u1", "a@x.com", Role::User, 1)
            .unwrap();
        let b = jwt
            .generate_refresh_token("u1", "a@x.com", Role::User, 1)
            .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn garbage_is_unauthenticated() {
        let jwt = test_manager();
        assert!(matches!(
            jwt.verify_access_token("not.a.token"),
            Err(ServiceError::Unauthenticated(_))
        ));
    }
}
