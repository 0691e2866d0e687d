//! Reply generation - the persona-conditioned LLM call.

use std::sync::Arc;

use tracing::error;

use crate::cache::TypedCache;
use crate::llm::{Completion, RetryPolicy};
use crate::rules::LocalizedText;

use super::language::Lang;

/// Sampling temperature for user-facing generation. The classifier runs at
/// zero separately.
const GENERATION_TEMPERATURE: f32 = 0.7;

/// Outcome of a generation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    /// The provider answered; disclaimer appended, cache populated.
    Completed(String),
    /// The retry budget ran out; fixed busy message in the user's language.
    Degraded(String),
}

/// Builds the two-message prompt, invokes the provider with bounded
/// retries, appends the language-matched disclaimer and fills the cache.
pub struct ReplyGenerator {
    provider: Arc<dyn Completion>,
    retry: RetryPolicy,
    cache: TypedCache<String, String>,
    disclaimer: LocalizedText,
    busy: LocalizedText,
    /// Whether the degraded busy reply is cached like a success, so a
    /// persistently failing question stops burning retries.
    cache_busy_replies: bool,
}

impl ReplyGenerator {
    pub fn new(
        provider: Arc<dyn Completion>,
        retry: RetryPolicy,
        cache: TypedCache<String, String>,
        disclaimer: LocalizedText,
        busy: LocalizedText,
        cache_busy_replies: bool,
    ) -> Self {
        Self {
            provider,
            retry,
            cache,
            disclaimer,
            busy,
            cache_busy_replies,
        }
    }

    pub async fn generate(
        &self,
        persona_prompt: &str,
        cleaned: &str,
        max_tokens: u32,
        lang: Lang,
    ) -> Generation {
        let result = self
            .retry
            .run(|| {
                self.provider
                    .complete(persona_prompt, cleaned, max_tokens, GENERATION_TEMPERATURE)
            })
            .await;

        match result {
            Ok(text) => {
                let reply = format!("{}\n\n{}", text.trim(), self.disclaimer.for_lang(lang));
                self.cache.insert(cleaned.to_string(), reply.clone());
                Generation::Completed(reply)
            }
            Err(err) => {
                error!("Generation failed after retries: {}", err);
                let busy = self.busy.for_lang(lang).to_string();
                if self.cache_busy_replies {
                    self.cache.insert(cleaned.to_string(), busy.clone());
                }
                Generation::Degraded(busy)
            }
        }
    }
}
