//! FAQ matching - canned answers without an LLM call.

use std::collections::HashMap;

use crate::rules::RuleBook;

/// Upper bound (in characters) for the fuzzy greeting window. Longer
/// sentences that merely contain a greeting word must not match.
const GREETING_MAX_CHARS: usize = 5;

/// Exact and fuzzy matcher over the static canned-response table.
pub struct FaqTable {
    /// Lower-cased phrase -> canned reply.
    entries: HashMap<String, String>,
    greeting_keywords: Vec<String>,
    greeting_reply: String,
}

impl FaqTable {
    pub fn new(rules: &RuleBook) -> Self {
        Self {
            entries: rules.faq.clone(),
            greeting_keywords: rules.greeting_keywords.clone(),
            greeting_reply: rules.greeting_reply.clone(),
        }
    }

    /// Return the canned reply for `text`, or `None` to let the pipeline
    /// continue.
    ///
    /// The exact path compares the trimmed, lower-cased text against the
    /// table keys. The fuzzy path applies only to messages of 1 to 5
    /// characters and checks greeting-keyword containment: lower-cased for
    /// ASCII keywords, raw substring for CJK keywords (case folding is
    /// meaningless there).
    pub fn lookup(&self, text: &str) -> Option<&str> {
        let trimmed = text.trim();
        let lowered = trimmed.to_lowercase();

        if let Some(reply) = self.entries.get(&lowered) {
            return Some(reply);
        }

        let chars = trimmed.chars().count();
        if (1..=GREETING_MAX_CHARS).contains(&chars) {
            let greeted = self.greeting_keywords.iter().any(|keyword| {
                if keyword.is_ascii() {
                    lowered.contains(&keyword.to_lowercase())
                } else {
                    trimmed.contains(keyword.as_str())
                }
            });
            if greeted {
                return Some(&self.greeting_reply);
            }
        }

        None
    }
}
