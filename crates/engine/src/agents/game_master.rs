//! Game master responder.
//!
//! Intervenes only when the input carries resolution-worthy vocabulary
//! (combat, chance, skill checks) and answers as an impartial adjudicator
//! for the location.

use crate::infrastructure::ports::{LlmPort, VerdictKind};

use super::{strip_think_blocks, AgentContext, AgentVerdict};

/// Vocabulary that signals an action needing GM resolution
const GM_TRIGGERS: &[&str] = &[
    "attack",
    "combat",
    "fight",
    "roll",
    "check",
    "challenge",
    "random",
    "chance",
    "luck",
    "dice",
    "skill",
    "save",
];

/// Gate: does this input need adjudication?
pub fn requires_resolution(input: &str) -> bool {
    let lower = input.to_lowercase();
    GM_TRIGGERS.iter().any(|trigger| lower.contains(trigger))
}

pub async fn respond(llm: &dyn LlmPort, input: &str, context: &AgentContext) -> AgentVerdict {
    if !requires_resolution(input) {
        return AgentVerdict::silent();
    }

    let system_prompt = build_system_prompt(&context.location_id);
    match llm.generate(&system_prompt, input).await {
        Ok(content) => AgentVerdict::speak(strip_think_blocks(&content), VerdictKind::Action),
        Err(e) => {
            tracing::warn!(
                location_id = %context.location_id,
                error = %e,
                "Game master responder failed, saying nothing"
            );
            AgentVerdict::silent()
        }
    }
}

fn build_system_prompt(location_id: &str) -> String {
    format!(
        "You are the Game Master for {location_id}. \
         You only intervene when there are actions that require resolution or randomness: \
         combat between players, random events, skill checks, environmental challenges. \
         Your responses are brief and focused on resolving the specific action. \
         Format your response in a clear, readable way."
    )
}
