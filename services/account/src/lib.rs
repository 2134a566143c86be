//! Account service: persistent identities for the shopstream platform
//!
//! Owns the accounts table (credentials, role, token version, active flag)
//! and publishes a welcome email job when an account is created. The auth
//! service drives password checks and token-version bumps through the RPC
//! surface exposed here.

pub mod client;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;

pub use client::{AccountClient, AccountsApi};
pub use models::{Account, AccountWithHash, NewAccount};
pub use service::AccountService;
