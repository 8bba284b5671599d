//! Location NPC responder.
//!
//! Each location type carries a resident NPC (tavern keeper, blacksmith,
//! ...) who answers when directly addressed or when the conversation turns
//! to their trade.

use crate::infrastructure::ports::{LlmPort, VerdictKind};

use super::{strip_think_blocks, AgentContext, AgentVerdict};

/// Trade vocabulary per location type, keyed on location-id substrings
const LOCATION_LEXICON: &[(&str, &[&str])] = &[
    (
        "tavern",
        &[
            "beer", "ale", "wine", "food", "meal", "drink", "eat", "order", "menu", "price",
            "cost", "pay", "gold", "silver",
        ],
    ),
    (
        "blacksmith",
        &[
            "weapon", "armor", "sword", "shield", "repair", "forge", "metal", "iron", "steel",
            "craft", "smith",
        ],
    ),
    (
        "shop",
        &[
            "buy", "sell", "trade", "item", "goods", "merchant", "price", "cost", "gold", "silver",
        ],
    ),
    (
        "temple",
        &[
            "heal", "cure", "pray", "bless", "divine", "holy", "sacred", "worship", "faith",
        ],
    ),
    (
        "library",
        &[
            "book", "read", "study", "learn", "knowledge", "scroll", "map", "research", "history",
        ],
    ),
];

/// Greeting vocabulary counting as direct address
const GREETINGS: &[&str] = &["hey", "hello", "hi", "excuse me", "pardon"];

/// Generic interaction vocabulary any NPC responds to
const GENERAL_KEYWORDS: &[&str] = &[
    "quest",
    "mission",
    "help",
    "information",
    "knowledge",
    "story",
    "history",
    "location",
    "item",
    "trade",
    "what",
    "how",
    "where",
    "when",
    "why",
    "can you",
    "do you",
    "would you",
    "could you",
    "please",
];

/// Derive the location type from the location identifier
fn location_type(location_id: &str) -> Option<&'static str> {
    let lower = location_id.to_lowercase();
    if lower.contains("tavern") {
        Some("tavern")
    } else if lower.contains("smith") {
        Some("blacksmith")
    } else if lower.contains("shop") {
        Some("shop")
    } else if lower.contains("temple") {
        Some("temple")
    } else if lower.contains("library") {
        Some("library")
    } else {
        None
    }
}

fn trade_keywords(location_id: &str) -> &'static [&'static str] {
    location_type(location_id)
        .and_then(|ty| {
            LOCATION_LEXICON
                .iter()
                .find(|(key, _)| *key == ty)
                .map(|(_, words)| *words)
        })
        .unwrap_or(&[])
}

fn npc_role(location_id: &str) -> &'static str {
    match location_type(location_id) {
        Some("tavern") => "tavern keeper",
        Some("blacksmith") => "blacksmith",
        Some("shop") => "merchant",
        Some("temple") => "priest",
        Some("library") => "librarian",
        _ => "local resident",
    }
}

/// Resident NPC for a location, if the location type has one
pub fn npc_for_location(location_id: &str) -> Option<String> {
    match location_type(location_id)? {
        "tavern" => Some("Tavern Keeper".to_string()),
        "blacksmith" => Some("Blacksmith".to_string()),
        "shop" => Some("Merchant".to_string()),
        "temple" => Some("Priest".to_string()),
        "library" => Some("Librarian".to_string()),
        _ => None,
    }
}

/// Gate: is this message for the NPC?
///
/// True when the NPC is directly addressed (by name or greeting), or when
/// the input touches the location's trade vocabulary or generic interaction
/// vocabulary. Always false without a configured NPC.
pub fn is_message_for_npc(input: &str, context: &AgentContext) -> bool {
    let Some(npc_name) = &context.npc_name else {
        return false;
    };

    let lower = input.to_lowercase();
    let direct_address = lower.contains(&npc_name.to_lowercase())
        || GREETINGS.iter().any(|g| lower.contains(g));

    let on_topic = trade_keywords(&context.location_id)
        .iter()
        .chain(GENERAL_KEYWORDS)
        .any(|keyword| lower.contains(keyword));

    direct_address || on_topic
}

pub async fn respond(llm: &dyn LlmPort, input: &str, context: &AgentContext) -> AgentVerdict {
    if !is_message_for_npc(input, context) {
        return AgentVerdict::silent();
    }
    // Checked by the gate
    let Some(npc_name) = &context.npc_name else {
        return AgentVerdict::silent();
    };

    let system_prompt = build_system_prompt(npc_name, context);
    match llm.generate(&system_prompt, input).await {
        Ok(content) => AgentVerdict::speak(strip_think_blocks(&content), VerdictKind::Message),
        Err(e) => {
            tracing::warn!(
                location_id = %context.location_id,
                npc = %npc_name,
                error = %e,
                "NPC responder failed, saying nothing"
            );
            AgentVerdict::silent()
        }
    }
}

fn build_system_prompt(npc_name: &str, context: &AgentContext) -> String {
    let location_id = &context.location_id;
    let role = npc_role(location_id);
    let topics = trade_keywords(location_id).join(", ");

    format!(
        "You are {npc_name}, an NPC in {location_id}. You are a {role}. \
         You respond when you are directly addressed, when the message is relevant \
         to your character or location, or when someone asks about {topics}. \
         Stay in character and respond appropriately to the context. \
         If the message is about buying or trading items, include prices in gold/silver. \
         If the message is about services, describe what you can do and any costs involved."
    )
}
