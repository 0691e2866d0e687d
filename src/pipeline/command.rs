//! Inline command resolution - tag detection and persona selection.

use crate::persona::DEFAULT_PERSONA;
use crate::rules::CommandSpec;
use crate::utils::strip_first_ascii_ci;

/// Result of scanning a message for command tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommand {
    /// Persona lookup key for the selected (or default) persona.
    pub persona: String,
    /// Message text with the tag removed and whitespace trimmed.
    pub cleaned: String,
    /// Output-token cap for the selected persona.
    pub max_tokens: u32,
    /// Whether an explicit tag was present. A tag means the user wants
    /// generation, so FAQ matching and topic gating are bypassed.
    pub tagged: bool,
}

/// Ordered table of recognized inline command tags.
pub struct CommandTable {
    commands: Vec<CommandSpec>,
    default_max_tokens: u32,
}

impl CommandTable {
    pub fn new(commands: Vec<CommandSpec>, default_max_tokens: u32) -> Self {
        Self {
            commands,
            default_max_tokens,
        }
    }

    /// Scan `text` for the first matching tag (table order, ASCII
    /// case-insensitive). On a match the tag's first occurrence is removed;
    /// without one the text passes through unchanged under the default
    /// persona.
    pub fn resolve(&self, text: &str) -> ResolvedCommand {
        for spec in &self.commands {
            if let Some(stripped) = strip_first_ascii_ci(text, &spec.tag) {
                return ResolvedCommand {
                    persona: spec.persona.clone(),
                    cleaned: stripped.trim().to_string(),
                    max_tokens: spec.max_tokens,
                    tagged: true,
                };
            }
        }

        ResolvedCommand {
            persona: DEFAULT_PERSONA.to_string(),
            cleaned: text.to_string(),
            max_tokens: self.default_max_tokens,
            tagged: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::rules::RuleBook;

    use super::*;

    fn table() -> CommandTable {
        let rules = RuleBook::default();
        CommandTable::new(rules.commands.clone(), rules.reply_max_tokens)
    }

    #[test]
    fn tag_selects_persona_and_strips_cleanly() {
        let resolved = table().resolve("#trans 你好嗎");
        assert_eq!(resolved.persona, "translate");
        assert_eq!(resolved.cleaned, "你好嗎");
        assert!(resolved.tagged);
    }

    #[test]
    fn tag_match_is_case_insensitive() {
        let resolved = table().resolve("#SUM the meeting notes");
        assert_eq!(resolved.persona, "summarize");
        assert_eq!(resolved.cleaned, "the meeting notes");
    }

    #[test]
    fn tag_in_the_middle_is_removed_once() {
        let resolved = table().resolve("please #polish this draft #polish");
        assert_eq!(resolved.persona, "polish");
        assert_eq!(resolved.cleaned, "please  this draft #polish");
    }

    #[test]
    fn no_tag_falls_back_to_default_persona() {
        let rules = RuleBook::default();
        let resolved = table().resolve("what is FBA?");
        assert_eq!(resolved.persona, DEFAULT_PERSONA);
        assert_eq!(resolved.cleaned, "what is FBA?");
        assert_eq!(resolved.max_tokens, rules.reply_max_tokens);
        assert!(!resolved.tagged);
    }
}
