//! Persona directory - fail-soft persona prompt lookup.
//!
//! Resolution order: in-process cache, remote sheet, built-in prompt table,
//! hard-coded default. Every failure along the way is absorbed; a lookup
//! always yields a usable system prompt.

mod sheet;

pub use sheet::SheetSource;

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::cache::{CacheConfig, CacheRegistry, TypedCache};
use crate::rules::RuleBook;

/// Persona key selected when no inline command tag is present.
pub const DEFAULT_PERSONA: &str = "default";

/// Maps a persona key to its system prompt.
pub struct PersonaDirectory {
    source: Option<SheetSource>,
    /// Persona key -> last-fetched prompt (short TTL).
    cache: TypedCache<String, String>,
    builtin: HashMap<String, String>,
    fallback: String,
}

impl PersonaDirectory {
    pub fn new(source: Option<SheetSource>, cache: &CacheRegistry, rules: &RuleBook) -> Self {
        Self {
            source,
            cache: cache.get_or_create("personas", CacheConfig::personas()),
            builtin: rules.personas.clone(),
            fallback: rules.default_persona.clone(),
        }
    }

    /// Resolve a persona key to a system prompt. Never fails: a miss or a
    /// store failure resolves to a built-in prompt or the default.
    pub async fn prompt_for(&self, key: &str) -> String {
        if let Some(hit) = self.cache.get(&key.to_string()) {
            return hit;
        }

        if let Some(source) = &self.source {
            match source.fetch_prompt(key).await {
                Ok(Some(prompt)) if !prompt.is_empty() => {
                    self.cache.insert(key.to_string(), prompt.clone());
                    return prompt;
                }
                Ok(_) => debug!("Persona '{}' not in the remote sheet, using built-in", key),
                Err(err) => warn!("Persona lookup for '{}' failed: {:#}", key, err),
            }
        }

        self.builtin
            .get(key)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> PersonaDirectory {
        PersonaDirectory::new(None, &CacheRegistry::new(), &RuleBook::default())
    }

    #[tokio::test]
    async fn known_key_resolves_to_builtin_prompt() {
        let dir = directory();
        let prompt = dir.prompt_for("translate").await;
        assert!(prompt.to_lowercase().contains("translate"));
    }

    #[tokio::test]
    async fn unknown_key_resolves_to_default_prompt() {
        let dir = directory();
        let prompt = dir.prompt_for("nonsense").await;
        assert_eq!(prompt, RuleBook::default().default_persona);
    }

    #[tokio::test]
    async fn default_key_resolves_to_default_prompt() {
        let dir = directory();
        let prompt = dir.prompt_for(DEFAULT_PERSONA).await;
        assert_eq!(prompt, RuleBook::default().default_persona);
    }
}
