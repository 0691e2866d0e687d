//! Chat scope filtering - should the bot respond at all?

use tracing::debug;

use crate::utils::strip_first_ascii_ci;

use super::message::InboundMessage;

/// Decides eligibility from the chat kind and content.
///
/// Direct chats are always eligible unless an official channel already
/// handles the topic. Group/room chats are eligible only on an explicit
/// mention of the trigger token.
pub struct ScopeFilter {
    trigger: String,
    /// Lower-cased official-handled keywords.
    official_handled: Vec<String>,
}

impl ScopeFilter {
    pub fn new(trigger: impl Into<String>, official_handled: &[String]) -> Self {
        Self {
            trigger: trigger.into(),
            official_handled: official_handled
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
        }
    }

    /// Screen a message. Returns the effective text to process, or `None`
    /// when the bot must stay silent.
    pub fn screen(&self, msg: &InboundMessage) -> Option<String> {
        if msg.source.is_multi_party() {
            // Only an explicit mention wakes the bot in multi-party chats;
            // the trigger token itself is not part of the question.
            let stripped = strip_first_ascii_ci(&msg.text, &self.trigger)?;
            let remainder = stripped.trim();
            if remainder.is_empty() {
                debug!("Mention with no question from {}, skipping", msg.source_id);
                return None;
            }
            return Some(remainder.to_string());
        }

        let lowered = msg.text.to_lowercase();
        if let Some(keyword) = self
            .official_handled
            .iter()
            .find(|k| lowered.contains(k.as_str()))
        {
            debug!(
                "Official channel already handles '{}' (from {}), staying silent",
                keyword, msg.source_id
            );
            return None;
        }

        Some(msg.text.trim().to_string())
    }
}
