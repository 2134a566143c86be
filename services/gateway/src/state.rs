//! Application state shared across handlers

use account::client::AccountsApi;
use auth::client::AuthApi;
use catalog::client::CatalogApi;
use common::bus::EventBus;
use order::client::OrderApi;
use std::sync::Arc;

/// Downstream clients plus the bus handle for subscriptions
///
/// The clients live behind trait objects so tests can wire in fakes.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthApi>,
    pub accounts: Arc<dyn AccountsApi>,
    pub catalog: Arc<dyn CatalogApi>,
    pub orders: Arc<dyn OrderApi>,
    pub bus: EventBus,
}
