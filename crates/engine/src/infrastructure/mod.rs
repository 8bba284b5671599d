//! External dependency implementations (ports + adapters).

pub mod intent;
pub mod ollama;
pub mod ports;
pub mod usernames;
