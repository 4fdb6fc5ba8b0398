//! Prompt construction with a fixed character budget.
//!
//! Splits `max_length` across three segments (system / context / user),
//! hard-truncates each to its allotment, and fingerprints the resulting
//! message sequence so equivalent requests can share a cache entry.

use crate::config::{PromptConfig, PromptStyle};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Absolute ceiling for the system segment, independent of budget share.
const SYSTEM_CEILING: usize = 400;
/// Absolute ceiling for the context segment, independent of budget share.
const CONTEXT_CEILING: usize = 600;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    fn new(role: &str, content: String) -> Self {
        Self {
            role: role.to_string(),
            content,
        }
    }
}

/// A fully built prompt. Never mutated after construction.
#[derive(Debug, Clone)]
pub struct BuiltPrompt {
    pub messages: Vec<ChatMessage>,
    /// Deterministic content hash of the message sequence, hex-encoded.
    pub fingerprint: String,
    /// Cheap estimate for observability only, never for enforcement.
    pub approx_tokens: usize,
}

/// Stateless prompt builder; safe to share across all concurrent requests.
pub struct PromptManager;

impl PromptManager {
    /// Build a bounded, role-tagged message sequence for one request.
    ///
    /// Identical inputs always produce an identical message list and
    /// fingerprint, across process restarts.
    pub fn build(
        user_query: &str,
        config: &PromptConfig,
        cache_context: Option<&str>,
        tools_note: Option<&str>,
    ) -> BuiltPrompt {
        let system_budget = (config.max_length / 4).min(SYSTEM_CEILING);
        let context_budget = (config.max_length * 35 / 100).min(CONTEXT_CEILING);

        let system_text = match tools_note {
            Some(note) => format!("{}\n\n{}", style_instruction(config.style), note),
            None => style_instruction(config.style).to_string(),
        };
        let system = truncate_chars(&system_text, system_budget);

        // Context takes its full allotment up front: when system+user land
        // below min_length it is what pads the window toward the minimum,
        // and its ceiling is never bypassed either way.
        let context = cache_context
            .filter(|c| !c.is_empty())
            .map(|c| truncate_chars(c, context_budget));

        let used = char_len(&system) + context.as_deref().map_or(0, char_len);
        let user_budget = config.max_length.saturating_sub(used);
        let user = truncate_chars(user_query, user_budget);

        let mut messages = vec![ChatMessage::new("system", system)];
        if let Some(context) = context {
            messages.push(ChatMessage::new("system", context));
        }
        messages.push(ChatMessage::new("user", user));

        let total_chars: usize = messages.iter().map(|m| char_len(&m.content)).sum();

        BuiltPrompt {
            fingerprint: fingerprint(&messages),
            approx_tokens: total_chars.div_ceil(4),
            messages,
        }
    }
}

fn style_instruction(style: PromptStyle) -> &'static str {
    match style {
        PromptStyle::Short => "Answer briefly. Do not reveal reasoning.",
        PromptStyle::Detailed => {
            "Give a thorough, well-structured answer with key tradeoffs. \
             Do not reveal hidden reasoning."
        }
        PromptStyle::Balanced => "You are a helpful assistant. Answer clearly and concisely.",
    }
}

/// Hash of `"[role] content"` per message, in order. Any change to ordering,
/// role labels, or content changes the result.
fn fingerprint(messages: &[ChatMessage]) -> String {
    let mut hasher = Sha256::new();
    for msg in messages {
        hasher.update(format!("[{}] {}\n", msg.role, msg.content));
    }
    hex::encode(hasher.finalize())
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Prefix cut on a character boundary; never exceeds `budget` characters.
fn truncate_chars(s: &str, budget: usize) -> String {
    if char_len(s) <= budget {
        s.to_string()
    } else {
        s.chars().take(budget).collect()
    }
}
