//! Agent routing for location chat.
//!
//! Every user message is fanned out to three independent responders
//! (game master, location NPC, blockchain intent). Each responder gates
//! itself with a pure keyword predicate, the gated-in ones run concurrently,
//! and the router collects whichever verdicts chose to speak. A failing
//! responder degrades to silence; it never aborts its siblings.

pub mod blockchain;
pub mod game_master;
pub mod npc;

use std::sync::Arc;
use std::sync::LazyLock;

use regex_lite::Regex;

use crate::infrastructure::ports::{BlockchainPort, LlmPort, VerdictKind};

/// Read-only context handed to every responder invocation
#[derive(Debug, Clone, Default)]
pub struct AgentContext {
    pub location_id: String,
    pub npc_name: Option<String>,
    pub player_display_name: Option<String>,
    pub player_id: Option<String>,
}

/// A responder's decision of whether and what to say
#[derive(Debug, Clone)]
pub struct AgentVerdict {
    pub should_respond: bool,
    pub content: String,
    pub kind: VerdictKind,
}

impl AgentVerdict {
    /// The responder declined to speak (gated out or failed)
    pub fn silent() -> Self {
        Self {
            should_respond: false,
            content: String::new(),
            kind: VerdictKind::Message,
        }
    }

    pub fn speak(content: String, kind: VerdictKind) -> Self {
        Self {
            should_respond: true,
            content,
            kind,
        }
    }
}

/// A speaking verdict paired with its chat identity
#[derive(Debug, Clone)]
pub struct AgentReply {
    /// Display name in the chat log ("Game Master", the NPC name, ...)
    pub speaker: String,
    pub speaker_id: &'static str,
    pub verdict: AgentVerdict,
}

/// Fans user input out to the responders and merges their verdicts
pub struct AgentRouter {
    llm: Arc<dyn LlmPort>,
    blockchain: Arc<dyn BlockchainPort>,
}

impl AgentRouter {
    pub fn new(llm: Arc<dyn LlmPort>, blockchain: Arc<dyn BlockchainPort>) -> Self {
        Self { llm, blockchain }
    }

    /// Run all gated-in responders concurrently and collect speaking verdicts.
    ///
    /// The returned order is always game master, then NPC, then blockchain;
    /// completion order never leaks into the chat log.
    pub async fn route(&self, input: &str, context: &AgentContext) -> Vec<AgentReply> {
        let (gm, npc, chain) = tokio::join!(
            game_master::respond(self.llm.as_ref(), input, context),
            npc::respond(self.llm.as_ref(), input, context),
            blockchain::respond(self.blockchain.as_ref(), input, context),
        );

        let mut replies = Vec::new();

        if gm.should_respond {
            replies.push(AgentReply {
                speaker: "Game Master".to_string(),
                speaker_id: "gm",
                verdict: gm,
            });
        }

        if npc.should_respond {
            if let Some(name) = &context.npc_name {
                replies.push(AgentReply {
                    speaker: name.clone(),
                    speaker_id: "npc",
                    verdict: npc,
                });
            }
        }

        if chain.should_respond {
            replies.push(AgentReply {
                speaker: "Blockchain".to_string(),
                speaker_id: "blockchain",
                verdict: chain,
            });
        }

        replies
    }
}

static THINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<think>.*?</think>").expect("valid regex"));

/// Remove `<think>` reasoning spans some models emit before the answer
pub(crate) fn strip_think_blocks(content: &str) -> String {
    THINK_RE.replace_all(content, "").trim().to_string()
}
