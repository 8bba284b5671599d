//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Ports exist for:
//! - LLM calls (could swap Ollama -> Claude/OpenAI)
//! - Blockchain intent handling (the NFT service is an external collaborator)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("LLM upstream unavailable: {0}")]
    Unavailable(String),
    #[error("Invalid LLM response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum BlockchainError {
    #[error("Blockchain intent service unavailable: {0}")]
    Unavailable(String),
    #[error("Invalid intent response: {0}")]
    InvalidResponse(String),
}

// =============================================================================
// Infrastructure Types
// =============================================================================

/// How a verdict should be rendered in the chat log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerdictKind {
    /// Plain in-character speech
    Message,
    /// A resolved action (rendered action-flagged)
    Action,
}

/// Verdict returned by the blockchain-intent collaborator.
///
/// Relayed verbatim to the chat when `should_respond` is set; the underlying
/// mint/burn/transfer work is entirely the collaborator's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentVerdict {
    pub content: String,
    #[serde(rename = "shouldRespond")]
    pub should_respond: bool,
    #[serde(rename = "type")]
    pub kind: VerdictKind,
}

// =============================================================================
// Port Traits
// =============================================================================

/// Port for LLM text generation
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmPort: Send + Sync {
    /// Generate a completion for `input` under `system_prompt`.
    ///
    /// Failure means the upstream said nothing; callers must degrade to
    /// silence rather than propagating.
    async fn generate(&self, system_prompt: &str, input: &str) -> Result<String, LlmError>;
}

/// Port for the external blockchain-intent service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlockchainPort: Send + Sync {
    /// Hand a chat message to the intent service for interpretation
    async fn handle_intent(
        &self,
        message: &str,
        location_id: &str,
    ) -> Result<IntentVerdict, BlockchainError>;
}
