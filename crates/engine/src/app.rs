//! Application composition.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::agents::AgentRouter;
use crate::api::connections::ConnectionManager;
use crate::infrastructure::ports::{BlockchainPort, LlmPort};
use crate::infrastructure::usernames::UsernameGenerator;

/// Shared state behind every HTTP and WebSocket handler
pub struct AppState {
    pub connections: Arc<ConnectionManager>,
    pub agents: Arc<AgentRouter>,
    /// Username pool for clients that join without a name
    pub usernames: Mutex<UsernameGenerator>,
}

impl AppState {
    pub fn new(llm: Arc<dyn LlmPort>, blockchain: Arc<dyn BlockchainPort>) -> Self {
        Self {
            connections: Arc::new(ConnectionManager::new()),
            agents: Arc::new(AgentRouter::new(llm, blockchain)),
            usernames: Mutex::new(UsernameGenerator::new()),
        }
    }
}
