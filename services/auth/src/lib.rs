//! Auth service: sessions, tokens, and revocation for shopstream
//!
//! Issues HS256 access/refresh token pairs, rotates refresh tokens through
//! the session store, and revokes whole sessions by bumping the account's
//! token_version. Holds the process-local presence set behind the admin
//! "current users" listing.

pub mod client;
pub mod jwt;
pub mod models;
pub mod presence;
pub mod repository;
pub mod routes;
pub mod service;

pub use client::{AuthApi, AuthClient};
pub use models::{AuthResponse, CurrentUser};
pub use service::AuthService;
