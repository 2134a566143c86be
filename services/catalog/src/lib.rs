//! Catalog service: the product index for the shopstream platform
//!
//! Serves product lookup, search, and prefix suggestions, and owns the one
//! mutation the order saga depends on: the atomic stock/sold update. The
//! index internals are opaque to every other service; only the contract in
//! `CatalogApi` is shared.

pub mod client;
pub mod models;
pub mod repository;
pub mod routes;
pub mod service;

pub use client::{CatalogApi, CatalogClient};
pub use models::{NewProduct, Product};
pub use service::CatalogService;
