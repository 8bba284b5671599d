//! HTTP and WebSocket entry points.

pub mod connections;
pub mod http;
pub mod websocket;

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::app::AppState;

/// Build the full router (HTTP surface + `/ws` upgrade endpoint).
pub fn router(state: Arc<AppState>) -> Router {
    http::routes()
        .route("/ws", get(websocket::ws_handler))
        .with_state(state)
}
