//! WebSocket handling for chat connections.
//!
//! Terminates persistent connections, decodes inbound frames, keeps the
//! connection registry current, and re-injects agent verdicts as follow-up
//! broadcasts. The read loop never waits on agent processing.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use fablechain_protocol::{ChatEnvelope, ClientMessage};

use crate::agents::{npc, AgentContext};
use crate::app::AppState;

use super::connections::ClientId;

/// Buffer size for per-connection message channel.
const CONNECTION_CHANNEL_BUFFER: usize = 256;

/// WebSocket upgrade handler - entry point for new connections.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle an individual WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Create a unique client ID for this connection
    let client_id = ClientId::new();

    // Create a bounded channel for sending envelopes to this client
    let (tx, mut rx) = mpsc::channel::<ChatEnvelope>(CONNECTION_CHANNEL_BUFFER);

    // Register the connection
    state.connections.register(client_id, tx).await;

    tracing::info!(client_id = %client_id, "WebSocket connection established");

    // Spawn a task to forward envelopes from the channel to the WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(envelope) = rx.recv().await {
            if let Ok(json) = serde_json::to_string(&envelope) {
                if ws_sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    // Handle incoming frames
    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(msg) => handle_client_message(msg, &state, client_id).await,
                Err(e) => {
                    // Malformed frames are dropped; the connection stays open.
                    tracing::warn!(client_id = %client_id, error = %e, "Failed to parse frame");
                }
            },
            Ok(Message::Close(_)) => {
                tracing::info!(client_id = %client_id, "WebSocket closed by client");
                break;
            }
            Err(e) => {
                tracing::error!(client_id = %client_id, error = %e, "WebSocket error");
                break;
            }
            _ => {}
        }
    }

    // Clean up: evict the client and announce the departure to its room
    if let Some(info) = state.connections.remove(client_id).await {
        state.usernames.lock().await.release(&info.display_name);
        if let Some(location_id) = info.location_id {
            let leave = ChatEnvelope::leave(
                &info.display_name,
                client_id.to_string(),
                Some(location_id),
            );
            state.connections.broadcast(&leave).await;
        }
    }

    send_task.abort();

    tracing::info!(client_id = %client_id, "WebSocket connection terminated");
}

/// Dispatch a parsed client frame.
async fn handle_client_message(msg: ClientMessage, state: &Arc<AppState>, client_id: ClientId) {
    match msg {
        ClientMessage::Join { name, location_id } => {
            handle_join(state, client_id, name, location_id).await;
        }
        ClientMessage::Message {
            content, is_action, ..
        } => {
            handle_chat_message(state, client_id, content, is_action).await;
        }
    }
}

async fn handle_join(
    state: &Arc<AppState>,
    client_id: ClientId,
    name: Option<String>,
    location_id: Option<String>,
) {
    let display_name = resolve_display_name(state, client_id, name).await;

    if let Err(e) = state
        .connections
        .join_location(client_id, display_name.clone(), location_id.clone())
        .await
    {
        tracing::warn!(client_id = %client_id, error = %e, "Join for unknown connection");
        return;
    }

    // Announce to the whole room, joiner included, so every client sees
    // the same event log.
    let join = ChatEnvelope::join(&display_name, client_id.to_string(), location_id);
    state.connections.broadcast(&join).await;
}

/// Use the given name, keep an established one, or draw from the pool.
async fn resolve_display_name(
    state: &Arc<AppState>,
    client_id: ClientId,
    name: Option<String>,
) -> String {
    if let Some(name) = name.filter(|n| !n.trim().is_empty()) {
        return name;
    }
    if let Some(info) = state.connections.get(client_id).await {
        if info.display_name != client_id.to_string() {
            return info.display_name;
        }
    }
    state.usernames.lock().await.next_name()
}

async fn handle_chat_message(
    state: &Arc<AppState>,
    client_id: ClientId,
    content: String,
    is_action: bool,
) {
    let Some(info) = state.connections.get(client_id).await else {
        tracing::warn!(client_id = %client_id, "Message from unknown connection");
        return;
    };
    let Some(location_id) = info.location_id.clone() else {
        tracing::warn!(client_id = %client_id, "Message from client with no location, dropping");
        return;
    };

    // Broadcast the user message to the room immediately
    let envelope = ChatEnvelope::message(
        info.display_name.clone(),
        client_id.to_string(),
        content.clone(),
        Some(location_id.clone()),
        is_action,
    );
    state.connections.broadcast(&envelope).await;

    // Fan the input out to the agents off the read path; their verdicts
    // arrive as follow-up broadcasts whenever they are ready.
    let state = Arc::clone(state);
    tokio::spawn(async move {
        let context = AgentContext {
            npc_name: npc::npc_for_location(&location_id),
            location_id: location_id.clone(),
            player_display_name: Some(info.display_name),
            player_id: Some(client_id.to_string()),
        };

        let replies = state.agents.route(&content, &context).await;
        for reply in replies {
            let envelope = ChatEnvelope::message(
                reply.speaker,
                reply.speaker_id,
                reply.verdict.content,
                Some(location_id.clone()),
                matches!(
                    reply.verdict.kind,
                    crate::infrastructure::ports::VerdictKind::Action
                ),
            );
            state.connections.broadcast(&envelope).await;
        }
    });
}
