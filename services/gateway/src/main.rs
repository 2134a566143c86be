use account::client::AccountClient;
use anyhow::Result;
use auth::client::AuthClient;
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use catalog::client::CatalogClient;
use common::bus::{BusConfig, EventBus};
use gateway::middleware::auth_middleware;
use gateway::state::AppState;
use gateway::{dispatch, subscriptions};
use order::client::OrderClient;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("starting gateway");

    let bus = EventBus::connect(&BusConfig::from_env()).await?;

    let state = AppState {
        auth: Arc::new(AuthClient::from_env()),
        accounts: Arc::new(AccountClient::from_env()),
        catalog: Arc::new(CatalogClient::from_env()),
        orders: Arc::new(OrderClient::from_env()),
        bus,
    };

    let app = Router::new()
        .route("/api", post(dispatch::execute).get(subscriptions::ws_handler))
        .route("/health", get(health_check))
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("gateway listening on 0.0.0.0:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "service": "gateway"
    }))
}
