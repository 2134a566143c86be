//! Gateway: the single client-facing surface of shopstream
//!
//! One endpoint serves the federated query/mutation surface over POST and
//! upgrades to a WebSocket for subscriptions. The gateway authenticates
//! bearer tokens against the auth service, validates every input before
//! any downstream call, enforces the authorization matrix at resolver
//! entry, and bounds each fan-out with a per-class timeout.

pub mod dispatch;
pub mod error;
pub mod middleware;
pub mod resolvers;
pub mod state;
pub mod subscriptions;
pub mod validation;
