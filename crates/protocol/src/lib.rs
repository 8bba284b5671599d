//! Fablechain Protocol - Shared wire types for Engine and browser client
//!
//! This crate contains the types exchanged over the chat WebSocket:
//! - `ClientMessage` - inbound frames from the browser client
//! - `ChatEnvelope` - outbound chat events broadcast by the Engine
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde, serde_json, uuid, and chrono
//! 2. **No business logic** - Pure data types and serialization
//! 3. **Stable wire format** - camelCase field names, `type`-tagged frames

pub mod messages;

pub use messages::{ChatEnvelope, ClientMessage, EnvelopeKind};
