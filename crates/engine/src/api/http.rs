//! HTTP routes.
//!
//! The chat core is almost entirely WebSocket; the HTTP surface is a health
//! check plus the hook external services use to push GM narration into a
//! location.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use fablechain_protocol::ChatEnvelope;

use crate::app::AppState;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/api/gm/broadcast", post(broadcast_gm_message))
}

async fn health() -> &'static str {
    "OK"
}

#[derive(Debug, Deserialize)]
struct GmBroadcastRequest {
    content: String,
    #[serde(rename = "locationId", default)]
    location_id: Option<String>,
}

/// Broadcast a narrative beat as the GM.
///
/// With a location id only that room hears it; without one every connected
/// client does.
async fn broadcast_gm_message(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GmBroadcastRequest>,
) -> Json<ChatEnvelope> {
    let envelope = ChatEnvelope::message("GM", "gm", request.content, request.location_id, false);
    state.connections.broadcast(&envelope).await;
    Json(envelope)
}
