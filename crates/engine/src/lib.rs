//! Fablechain Engine library.
//!
//! This crate contains all server-side code for the Fablechain location chat:
//!
//! - `api/` - HTTP and WebSocket entry points, plus the connection registry
//! - `agents/` - per-message fan-out to the game master, NPC, and blockchain
//!   responders
//! - `infrastructure/` - external dependency implementations (ports + adapters)
//! - `app` - application composition

pub mod agents;
pub mod api;
pub mod app;
pub mod infrastructure;

pub use app::AppState;
