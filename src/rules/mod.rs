//! Rule book - read-only keyword tables and fixed texts.
//!
//! Everything the pipeline matches against (FAQ table, greeting keywords,
//! official-handled keywords, command tags, persona prompts, localized
//! fixed texts) lives here. Loaded once at startup from `RULES_PATH` when
//! set, otherwise from the embedded defaults, and never mutated afterwards.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use once_cell::sync::Lazy;
use serde::Deserialize;
use tracing::info;

use crate::pipeline::language::Lang;

/// Embedded default rule book (no file I/O at runtime).
static DEFAULTS: Lazy<RuleBook> = Lazy::new(|| {
    serde_json::from_str::<RuleBook>(include_str!("defaults.json"))
        .expect("embedded defaults.json must parse")
        .normalized()
});

/// A fixed text in both supported language families.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalizedText {
    pub en: String,
    pub zh: String,
}

impl LocalizedText {
    /// Pick the variant matching the detected language of the user's text.
    pub fn for_lang(&self, lang: Lang) -> &str {
        match lang {
            Lang::English => &self.en,
            Lang::Other => &self.zh,
        }
    }
}

/// An inline command tag and the persona it selects.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandSpec {
    /// The tag token as typed by the user, e.g. "#trans".
    pub tag: String,
    /// Persona lookup key, e.g. "translate".
    pub persona: String,
    /// Output-token cap for this persona.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_max_tokens() -> u32 {
    350
}

/// The full rule book.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleBook {
    /// Normalized short phrase -> canned reply. Keys are lower-cased at load.
    pub faq: HashMap<String, String>,
    /// Keywords that make a 1-5 character message count as a greeting.
    pub greeting_keywords: Vec<String>,
    /// The canned reply for fuzzy greeting matches.
    pub greeting_reply: String,
    /// Substrings meaning a human/official channel already answers this
    /// topic; the bot must stay silent.
    pub official_handled: Vec<String>,
    /// Recognized inline command tags, in match order.
    pub commands: Vec<CommandSpec>,
    /// Domain description interpolated into the relevance classifier prompt.
    pub topic_domain: String,
    pub off_topic: LocalizedText,
    pub disclaimer: LocalizedText,
    pub busy: LocalizedText,
    /// Output-token cap for untagged (default persona) replies.
    #[serde(default = "default_max_tokens")]
    pub reply_max_tokens: u32,
    /// System prompt for the default persona.
    pub default_persona: String,
    /// Built-in prompts per persona key, used when the remote persona
    /// store is absent or does not know the key.
    pub personas: HashMap<String, String>,
}

impl RuleBook {
    /// Load the rule book from a JSON file, or the embedded defaults when
    /// no path is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("reading rule book from {}", path.display()))?;
                let book: RuleBook = serde_json::from_str(&raw)
                    .with_context(|| format!("parsing rule book from {}", path.display()))?;
                info!("Rule book loaded from {}", path.display());
                Ok(book.normalized())
            }
            None => Ok(DEFAULTS.clone()),
        }
    }

    /// Lower-case the FAQ keys so the exact-match path is case-insensitive
    /// for ASCII input. CJK keys are unaffected by case folding.
    fn normalized(mut self) -> Self {
        self.faq = self
            .faq
            .into_iter()
            .map(|(k, v)| (k.trim().to_lowercase(), v))
            .collect();
        self
    }
}

impl Default for RuleBook {
    fn default() -> Self {
        DEFAULTS.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_defaults_parse() {
        let book = RuleBook::default();
        assert!(!book.faq.is_empty());
        assert!(!book.commands.is_empty());
        assert!(!book.official_handled.is_empty());
        assert!(book.personas.contains_key("translate"));
    }

    #[test]
    fn faq_keys_are_lowercased() {
        let book = RuleBook::default();
        assert!(book.faq.contains_key("hello"));
        assert!(book.faq.keys().all(|k| k == &k.to_lowercase()));
    }

    #[test]
    fn localized_text_selects_by_lang() {
        let text = LocalizedText {
            en: "en".to_string(),
            zh: "zh".to_string(),
        };
        assert_eq!(text.for_lang(Lang::English), "en");
        assert_eq!(text.for_lang(Lang::Other), "zh");
    }
}
