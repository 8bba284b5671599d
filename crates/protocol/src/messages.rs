//! WebSocket message types for the location chat protocol
//!
//! These types are used by both the Engine (receiving `ClientMessage`,
//! sending `ChatEnvelope`) and the browser client (the mirror image).
//!
//! ## Versioning Policy
//!
//! - New envelope kinds can be added at the end (forward compatible)
//! - Renaming wire fields is a breaking change

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Client Messages (Browser -> Engine)
// =============================================================================

/// Messages from the browser client to the Engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    /// Enter a location room, optionally announcing a display name.
    ///
    /// When `name` is omitted the Engine assigns a generated username.
    Join {
        #[serde(default)]
        name: Option<String>,
        #[serde(rename = "locationId", default)]
        location_id: Option<String>,
    },
    /// Send a chat message to the sender's current location
    Message {
        content: String,
        #[serde(rename = "isAction", default)]
        is_action: bool,
        /// Echoed by some clients; routing always uses the client's
        /// registered location.
        #[serde(rename = "locationId", default)]
        location_id: Option<String>,
    },
}

// =============================================================================
// Chat Envelopes (Engine -> Browser)
// =============================================================================

/// Discriminates the three chat event kinds on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeKind {
    Message,
    Join,
    Leave,
}

/// One discrete chat event broadcast to connected clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatEnvelope {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: EnvelopeKind,
    /// Display name of the speaker
    pub sender: String,
    pub sender_id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_action: Option<bool>,
}

impl ChatEnvelope {
    /// Build a user chat message envelope
    pub fn message(
        sender: impl Into<String>,
        sender_id: impl Into<String>,
        content: impl Into<String>,
        location_id: Option<String>,
        is_action: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: EnvelopeKind::Message,
            sender: sender.into(),
            sender_id: sender_id.into(),
            content: content.into(),
            timestamp: Utc::now(),
            location_id,
            is_action: is_action.then_some(true),
        }
    }

    /// Build a system-generated join announcement.
    ///
    /// Join envelopes are never action-flagged.
    pub fn join(name: &str, sender_id: impl Into<String>, location_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: EnvelopeKind::Join,
            sender: name.to_string(),
            sender_id: sender_id.into(),
            content: format!("{name} has joined the chat"),
            timestamp: Utc::now(),
            location_id,
            is_action: None,
        }
    }

    /// Build a system-generated leave announcement
    pub fn leave(name: &str, sender_id: impl Into<String>, location_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: EnvelopeKind::Leave,
            sender: name.to_string(),
            sender_id: sender_id.into(),
            content: format!("{name} has left the chat"),
            timestamp: Utc::now(),
            location_id,
            is_action: None,
        }
    }
}
