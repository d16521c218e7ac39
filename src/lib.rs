pub mod appresult;
pub mod config;
pub mod relay;
pub mod stats;

use std::sync::Arc;

use axum::{extract::FromRef, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use appresult::{AppError, AppResult, GetField};
use config::Config;
use relay::{Relay, WsGateway};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub relay: Relay,
    pub gateway: Arc<WsGateway>,
}

impl AppState {
    pub fn new() -> Self {
        let gateway = Arc::new(WsGateway::new());
        Self {
            relay: Relay::new(gateway.clone()),
            gateway,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn app(app_state: AppState, config: &Config) -> Router {
    let cors = match &config.cors_origin {
        Some(origin) => CorsLayer::new().allow_origin(origin.clone()),
        None => CorsLayer::permissive(),
    };

    Router::new()
        .merge(relay::router())
        .merge(stats::router())

        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
