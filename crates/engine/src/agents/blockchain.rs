//! Blockchain responder.
//!
//! Detects item/ledger intent in chat and delegates interpretation to the
//! external intent service; its verdict is relayed verbatim.

use crate::infrastructure::ports::BlockchainPort;

use super::{AgentContext, AgentVerdict};

/// Item/ledger vocabulary that routes to the intent service
const BLOCKCHAIN_KEYWORDS: &[&str] = &[
    "mint",
    "nft",
    "token",
    "transfer",
    "send",
    "give",
    "burn",
    "destroy",
    "create",
    "collection",
    "blockchain",
];

/// Gate: does this input ask for a ledger operation?
pub fn is_blockchain_request(input: &str) -> bool {
    let lower = input.to_lowercase();
    BLOCKCHAIN_KEYWORDS
        .iter()
        .any(|keyword| lower.contains(keyword))
}

pub async fn respond(
    blockchain: &dyn BlockchainPort,
    input: &str,
    context: &AgentContext,
) -> AgentVerdict {
    if !is_blockchain_request(input) {
        return AgentVerdict::silent();
    }

    match blockchain.handle_intent(input, &context.location_id).await {
        Ok(verdict) => AgentVerdict {
            should_respond: verdict.should_respond,
            content: verdict.content,
            kind: verdict.kind,
        },
        Err(e) => {
            tracing::warn!(
                location_id = %context.location_id,
                error = %e,
                "Blockchain responder failed, saying nothing"
            );
            AgentVerdict::silent()
        }
    }
}
