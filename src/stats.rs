use axum::{debug_handler, extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::{relay::{Relay, RelayStats, WsGateway}, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats))
        .route("/health", get(health))
}

#[debug_handler]
pub async fn stats(State(relay): State<Relay>) -> Json<RelayStats> {
    Json(relay.stats())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    status: &'static str,
    connections: usize,
    #[serde(flatten)]
    stats: RelayStats,
}

#[debug_handler(state = AppState)]
pub async fn health(
    State(relay): State<Relay>,
    State(gateway): State<Arc<WsGateway>>,
) -> Json<Health> {
    Json(Health {
        status: "ok",
        connections: gateway.connection_count(),
        stats: relay.stats(),
    })
}
