//! Connection management for WebSocket clients.
//!
//! Tracks connected clients and the location rooms they occupy. Clients and
//! rooms live under one lock so register/move/evict sequences are atomic
//! with respect to each other.

use std::collections::{HashMap, HashSet};

use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use fablechain_protocol::ChatEnvelope;

/// Unique identifier for a connected client (lifetime = connection lifetime)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(Uuid);

impl ClientId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Information about a connected client
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub client_id: ClientId,
    /// Display name; a placeholder until the first join names the client
    pub display_name: String,
    /// Current location room, if the client has joined one
    pub location_id: Option<String>,
}

struct Inner {
    /// Map of client_id -> (ConnectionInfo, sender channel)
    clients: HashMap<ClientId, (ConnectionInfo, mpsc::Sender<ChatEnvelope>)>,
    /// Map of location_id -> member client ids
    rooms: HashMap<String, HashSet<ClientId>>,
}

/// Manages all active WebSocket connections and their rooms
pub struct ConnectionManager {
    inner: RwLock<Inner>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                clients: HashMap::new(),
                rooms: HashMap::new(),
            }),
        }
    }

    /// Register a new connection.
    ///
    /// The display name and location arrive later with the first join frame.
    pub async fn register(&self, client_id: ClientId, sender: mpsc::Sender<ChatEnvelope>) {
        let info = ConnectionInfo {
            client_id,
            display_name: client_id.to_string(),
            location_id: None,
        };
        let mut inner = self.inner.write().await;
        inner.clients.insert(client_id, (info, sender));
        tracing::debug!(client_id = %client_id, "Connection registered");
    }

    /// Name the client and move it into the room for `location_id`.
    ///
    /// Creates the room if absent and removes the client from any previous
    /// room without announcing the departure there. Joining the current
    /// location again is a no-op apart from the rename.
    pub async fn join_location(
        &self,
        client_id: ClientId,
        display_name: String,
        location_id: Option<String>,
    ) -> Result<(), ConnectionError> {
        let mut inner = self.inner.write().await;

        let previous = {
            let (info, _) = inner
                .clients
                .get_mut(&client_id)
                .ok_or(ConnectionError::NotFound)?;
            info.display_name = display_name;
            std::mem::replace(&mut info.location_id, location_id.clone())
        };

        if previous != location_id {
            if let Some(old) = previous {
                remove_from_room(&mut inner.rooms, &old, client_id);
            }
        }

        if let Some(location_id) = location_id {
            inner
                .rooms
                .entry(location_id.clone())
                .or_default()
                .insert(client_id);
            tracing::info!(
                client_id = %client_id,
                location_id = %location_id,
                "Client joined location"
            );
        }

        Ok(())
    }

    /// Remove a client, evicting it from its room.
    ///
    /// Returns the final connection info so the caller can announce the
    /// departure to the remaining room members.
    pub async fn remove(&self, client_id: ClientId) -> Option<ConnectionInfo> {
        let mut inner = self.inner.write().await;
        let (info, _) = inner.clients.remove(&client_id)?;
        if let Some(location_id) = &info.location_id {
            remove_from_room(&mut inner.rooms, location_id, client_id);
        }
        tracing::debug!(client_id = %client_id, "Connection unregistered");
        Some(info)
    }

    /// Get connection info by id
    pub async fn get(&self, client_id: ClientId) -> Option<ConnectionInfo> {
        let inner = self.inner.read().await;
        inner.clients.get(&client_id).map(|(info, _)| info.clone())
    }

    /// All current members of a location room
    pub async fn members_of(&self, location_id: &str) -> Vec<ConnectionInfo> {
        let inner = self.inner.read().await;
        let Some(members) = inner.rooms.get(location_id) else {
            return Vec::new();
        };
        members
            .iter()
            .filter_map(|id| inner.clients.get(id).map(|(info, _)| info.clone()))
            .collect()
    }

    /// Deliver an envelope to its audience.
    ///
    /// With a location id the audience is that room's members; without one
    /// it is every connected client. Delivery to a closed or congested
    /// connection is skipped, never retried.
    pub async fn broadcast(&self, envelope: &ChatEnvelope) {
        let inner = self.inner.read().await;

        match &envelope.location_id {
            Some(location_id) => {
                let Some(members) = inner.rooms.get(location_id) else {
                    return;
                };
                for client_id in members {
                    if let Some((info, sender)) = inner.clients.get(client_id) {
                        deliver(info, sender, envelope);
                    }
                }
            }
            None => {
                for (info, sender) in inner.clients.values() {
                    deliver(info, sender, envelope);
                }
            }
        }
    }

    /// Number of connected clients
    pub async fn client_count(&self) -> usize {
        self.inner.read().await.clients.len()
    }

    /// Number of live rooms
    pub async fn room_count(&self) -> usize {
        self.inner.read().await.rooms.len()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

fn remove_from_room(rooms: &mut HashMap<String, HashSet<ClientId>>, location_id: &str, client_id: ClientId) {
    if let Some(members) = rooms.get_mut(location_id) {
        members.remove(&client_id);
        if members.is_empty() {
            rooms.remove(location_id);
            tracing::debug!(location_id = %location_id, "Removed empty room");
        }
    }
}

fn deliver(info: &ConnectionInfo, sender: &mpsc::Sender<ChatEnvelope>, envelope: &ChatEnvelope) {
    if let Err(e) = sender.try_send(envelope.clone()) {
        tracing::warn!(
            client_id = %info.client_id,
            error = %e,
            "Failed to deliver envelope, skipping client"
        );
    }
}

/// Errors that can occur during connection operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConnectionError {
    #[error("Connection not found")]
    NotFound,
}
