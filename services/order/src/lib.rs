//! Order service: placement saga and enriched order reads
//!
//! Placing an order coordinates the account service, the catalog's atomic
//! stock reservation, the transactional order insert, and the asynchronous
//! fan-out (confirmation email, simulated status stream). Reservation is
//! the one non-idempotent step, so every later failure compensates by
//! handing the reserved stock back.

pub mod client;
pub mod models;
pub mod publisher;
pub mod repository;
pub mod routes;
pub mod service;
pub mod simulator;

pub use client::{OrderApi, OrderClient};
pub use models::{NewOrder, Order, OrderLine};
pub use service::OrderService;
