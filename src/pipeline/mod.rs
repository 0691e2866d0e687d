//! Per-message decision pipeline.
//!
//! The sequence of decisions applied to each inbound message before and
//! around the LLM call: scope filtering, command resolution, FAQ
//! short-circuiting, response caching, topic gating and reply generation.

pub mod command;
pub mod faq;
pub mod language;
pub mod message;
pub mod reply;
pub mod scope;
pub mod topic;

use std::sync::Arc;

use tracing::debug;

use crate::cache::{CacheConfig, CacheRegistry, TypedCache};
use crate::llm::{Completion, RetryPolicy};
use crate::persona::PersonaDirectory;
use crate::rules::{LocalizedText, RuleBook};

use command::CommandTable;
use faq::FaqTable;
use language::detect;
use message::InboundMessage;
use reply::{Generation, ReplyGenerator};
use scope::ScopeFilter;
use topic::TopicGate;

/// Terminal outcome of one pipeline invocation. Every outcome other than
/// `Skip` results in exactly one outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Skip,
    Faq(String),
    Cached(String),
    OffTopic(String),
    Generated(String),
    Busy(String),
}

impl Outcome {
    /// The text to send, if any.
    pub fn reply_text(&self) -> Option<&str> {
        match self {
            Outcome::Skip => None,
            Outcome::Faq(text)
            | Outcome::Cached(text)
            | Outcome::OffTopic(text)
            | Outcome::Generated(text)
            | Outcome::Busy(text) => Some(text),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Outcome::Skip => "skip",
            Outcome::Faq(_) => "faq",
            Outcome::Cached(_) => "cached",
            Outcome::OffTopic(_) => "off-topic",
            Outcome::Generated(_) => "generated",
            Outcome::Busy(_) => "busy",
        }
    }
}

/// The end-to-end decision pipeline, invoked once per inbound text message.
pub struct Pipeline {
    scope: ScopeFilter,
    commands: CommandTable,
    faq: FaqTable,
    /// Cleaned text -> previously generated reply. Shared with the
    /// generator, which populates it.
    replies: TypedCache<String, String>,
    gate: TopicGate,
    personas: PersonaDirectory,
    generator: ReplyGenerator,
    off_topic: LocalizedText,
}

impl Pipeline {
    pub fn new(
        rules: &RuleBook,
        provider: Arc<dyn Completion>,
        personas: PersonaDirectory,
        cache: &CacheRegistry,
        trigger: &str,
        retry: RetryPolicy,
        cache_busy_replies: bool,
    ) -> Self {
        let replies: TypedCache<String, String> =
            cache.get_or_create("replies", CacheConfig::replies());

        Self {
            scope: ScopeFilter::new(trigger, &rules.official_handled),
            commands: CommandTable::new(rules.commands.clone(), rules.reply_max_tokens),
            faq: FaqTable::new(rules),
            replies: replies.clone(),
            gate: TopicGate::new(provider.clone(), &rules.topic_domain),
            personas,
            generator: ReplyGenerator::new(
                provider,
                retry,
                replies,
                rules.disclaimer.clone(),
                rules.busy.clone(),
                cache_busy_replies,
            ),
            off_topic: rules.off_topic.clone(),
        }
    }

    /// Run one message through the full decision sequence.
    pub async fn respond(&self, msg: &InboundMessage) -> Outcome {
        let outcome = self.decide(msg).await;
        debug!("Pipeline outcome for {}: {}", msg.source_id, outcome.label());
        outcome
    }

    async fn decide(&self, msg: &InboundMessage) -> Outcome {
        // 1. Scope: is the bot supposed to answer here at all?
        let effective = match self.scope.screen(msg) {
            Some(text) => text,
            None => return Outcome::Skip,
        };

        // 2. Inline command tags select the persona; the tag itself is not
        //    part of the question.
        let resolved = self.commands.resolve(&effective);

        // 3. Canned FAQ replies, only for untagged messages - a tag means
        //    the user explicitly wants generation.
        if !resolved.tagged {
            if let Some(reply) = self.faq.lookup(&resolved.cleaned) {
                return Outcome::Faq(reply.to_string());
            }
        }

        // 4. Exact-text cache: a hit bypasses the gate and the generator.
        if let Some(hit) = self.replies.get(&resolved.cleaned) {
            return Outcome::Cached(hit);
        }

        let lang = detect(&resolved.cleaned);

        // 5. Relevance gate, skipped for tagged messages (explicit intent).
        if !resolved.tagged && !self.gate.is_relevant(&resolved.cleaned).await {
            return Outcome::OffTopic(self.off_topic.for_lang(lang).to_string());
        }

        // 6-7. Persona prompt, then generation with bounded retries.
        let persona_prompt = self.personas.prompt_for(&resolved.persona).await;

        match self
            .generator
            .generate(&persona_prompt, &resolved.cleaned, resolved.max_tokens, lang)
            .await
        {
            Generation::Completed(text) => Outcome::Generated(text),
            Generation::Degraded(text) => Outcome::Busy(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use crate::llm::ProviderError;

    use super::*;

    /// Deterministic provider: answers the classifier with a fixed verdict
    /// and generation calls from a script (echoing when the script is
    /// empty).
    struct FakeProvider {
        verdict: &'static str,
        script: Mutex<VecDeque<Result<String, ProviderError>>>,
        gate_calls: AtomicUsize,
        gen_calls: AtomicUsize,
    }

    impl FakeProvider {
        fn relevant() -> Self {
            Self::with_verdict("YES")
        }

        fn with_verdict(verdict: &'static str) -> Self {
            Self {
                verdict,
                script: Mutex::new(VecDeque::new()),
                gate_calls: AtomicUsize::new(0),
                gen_calls: AtomicUsize::new(0),
            }
        }

        fn scripted(
            verdict: &'static str,
            steps: Vec<Result<String, ProviderError>>,
        ) -> Self {
            Self {
                verdict,
                script: Mutex::new(steps.into()),
                gate_calls: AtomicUsize::new(0),
                gen_calls: AtomicUsize::new(0),
            }
        }

        fn gate_calls(&self) -> usize {
            self.gate_calls.load(Ordering::SeqCst)
        }

        fn gen_calls(&self) -> usize {
            self.gen_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Completion for FakeProvider {
        async fn complete(
            &self,
            system: &str,
            user: &str,
            _max_tokens: u32,
            _temperature: f32,
        ) -> Result<String, ProviderError> {
            if system.starts_with("You are a classifier") {
                self.gate_calls.fetch_add(1, Ordering::SeqCst);
                return Ok(self.verdict.to_string());
            }

            self.gen_calls.fetch_add(1, Ordering::SeqCst);
            match self.script.lock().pop_front() {
                Some(step) => step,
                None => Ok(format!("Answer: {user}")),
            }
        }
    }

    fn pipeline(provider: Arc<FakeProvider>) -> Pipeline {
        pipeline_with(provider, false)
    }

    fn pipeline_with(provider: Arc<FakeProvider>, cache_busy_replies: bool) -> Pipeline {
        let rules = RuleBook::default();
        let cache = CacheRegistry::new();
        let personas = PersonaDirectory::new(None, &cache, &rules);
        let retry = RetryPolicy {
            attempts: 3,
            pause: std::time::Duration::ZERO,
        };
        Pipeline::new(
            &rules,
            provider,
            personas,
            &cache,
            "@bot",
            retry,
            cache_busy_replies,
        )
    }

    #[tokio::test]
    async fn faq_short_circuits_without_provider_calls() {
        let provider = Arc::new(FakeProvider::relevant());
        let pipe = pipeline(provider.clone());

        let outcome = pipe.respond(&InboundMessage::direct(1, "hi")).await;
        assert!(matches!(outcome, Outcome::Faq(_)));
        assert_eq!(provider.gate_calls(), 0);
        assert_eq!(provider.gen_calls(), 0);
    }

    #[tokio::test]
    async fn repeated_question_is_served_from_cache() {
        let provider = Arc::new(FakeProvider::relevant());
        let pipe = pipeline(provider.clone());
        let msg = InboundMessage::direct(1, "what is FBA?");

        let first = pipe.respond(&msg).await;
        let Outcome::Generated(first_text) = first else {
            panic!("expected a generated reply, got {first:?}");
        };
        assert_eq!(provider.gen_calls(), 1);

        let second = pipe.respond(&msg).await;
        assert_eq!(second, Outcome::Cached(first_text));
        // Byte-identical reply with zero additional provider calls.
        assert_eq!(provider.gate_calls(), 1);
        assert_eq!(provider.gen_calls(), 1);
    }

    #[tokio::test]
    async fn command_tag_bypasses_faq_and_gate() {
        let provider = Arc::new(FakeProvider::with_verdict("NO"));
        let pipe = pipeline(provider.clone());

        // "hi" alone would be a FAQ greeting and the verdict would reject
        // it; the explicit tag forces generation anyway.
        let outcome = pipe.respond(&InboundMessage::direct(1, "#sum hi")).await;
        assert!(matches!(outcome, Outcome::Generated(_)));
        assert_eq!(provider.gate_calls(), 0);
        assert_eq!(provider.gen_calls(), 1);
    }

    #[tokio::test]
    async fn group_chatter_without_mention_is_skipped() {
        let provider = Arc::new(FakeProvider::relevant());
        let pipe = pipeline(provider.clone());

        let outcome = pipe
            .respond(&InboundMessage::group(2, "random chatter"))
            .await;
        assert_eq!(outcome, Outcome::Skip);
        assert_eq!(provider.gate_calls() + provider.gen_calls(), 0);

        let outcome = pipe
            .respond(&InboundMessage::group(2, "@bot random chatter"))
            .await;
        assert!(matches!(outcome, Outcome::Generated(_)));
    }

    #[tokio::test]
    async fn official_keyword_suppresses_direct_reply() {
        let provider = Arc::new(FakeProvider::relevant());
        let pipe = pipeline(provider.clone());

        let outcome = pipe
            .respond(&InboundMessage::direct(1, "會場有wifi嗎"))
            .await;
        assert_eq!(outcome, Outcome::Skip);
        assert_eq!(provider.gate_calls() + provider.gen_calls(), 0);
    }

    #[tokio::test]
    async fn off_topic_rejection_is_localized() {
        let rules = RuleBook::default();

        let provider = Arc::new(FakeProvider::with_verdict("NO"));
        let pipe = pipeline(provider.clone());
        let outcome = pipe
            .respond(&InboundMessage::direct(1, "what's the weather like today?"))
            .await;
        assert_eq!(outcome, Outcome::OffTopic(rules.off_topic.en.clone()));
        assert_eq!(provider.gen_calls(), 0);

        let provider = Arc::new(FakeProvider::with_verdict("NO"));
        let pipe = pipeline(provider.clone());
        let outcome = pipe
            .respond(&InboundMessage::direct(1, "今天天氣如何？"))
            .await;
        assert_eq!(outcome, Outcome::OffTopic(rules.off_topic.zh.clone()));
    }

    #[tokio::test]
    async fn generation_retries_then_succeeds() {
        let provider = Arc::new(FakeProvider::scripted(
            "YES",
            vec![
                Err(ProviderError::Empty),
                Err(ProviderError::Empty),
                Ok("FBA is Fulfillment by Amazon.".to_string()),
            ],
        ));
        let pipe = pipeline(provider.clone());

        let outcome = pipe
            .respond(&InboundMessage::direct(1, "what is FBA?"))
            .await;
        let Outcome::Generated(text) = outcome else {
            panic!("expected a generated reply");
        };
        assert!(text.starts_with("FBA is Fulfillment by Amazon."));
        assert!(text.ends_with(&RuleBook::default().disclaimer.en));
        assert_eq!(provider.gen_calls(), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_degrade_to_busy_message() {
        let rules = RuleBook::default();
        let provider = Arc::new(FakeProvider::scripted(
            "YES",
            vec![
                Err(ProviderError::Empty),
                Err(ProviderError::Empty),
                Err(ProviderError::Empty),
                Err(ProviderError::Empty),
                Err(ProviderError::Empty),
                Err(ProviderError::Empty),
            ],
        ));
        let pipe = pipeline(provider.clone());
        let msg = InboundMessage::direct(1, "what is FBA?");

        let outcome = pipe.respond(&msg).await;
        assert_eq!(outcome, Outcome::Busy(rules.busy.en.clone()));
        assert_eq!(provider.gen_calls(), 3);

        // Busy replies are not cached by default: the question retries
        // fresh next time.
        let outcome = pipe.respond(&msg).await;
        assert_eq!(outcome, Outcome::Busy(rules.busy.en.clone()));
        assert_eq!(provider.gen_calls(), 6);
    }

    #[tokio::test]
    async fn busy_reply_is_cached_when_policy_enabled() {
        let rules = RuleBook::default();
        let provider = Arc::new(FakeProvider::scripted(
            "YES",
            vec![
                Err(ProviderError::Empty),
                Err(ProviderError::Empty),
                Err(ProviderError::Empty),
            ],
        ));
        let pipe = pipeline_with(provider.clone(), true);
        let msg = InboundMessage::direct(1, "what is FBA?");

        let outcome = pipe.respond(&msg).await;
        assert_eq!(outcome, Outcome::Busy(rules.busy.en.clone()));
        assert_eq!(provider.gen_calls(), 3);

        let outcome = pipe.respond(&msg).await;
        assert_eq!(outcome, Outcome::Cached(rules.busy.en.clone()));
        assert_eq!(provider.gen_calls(), 3);
    }

    #[tokio::test]
    async fn disclaimer_matches_detected_language() {
        let rules = RuleBook::default();

        let provider = Arc::new(FakeProvider::relevant());
        let pipe = pipeline(provider.clone());
        let Outcome::Generated(text) = pipe
            .respond(&InboundMessage::direct(1, "how are FBA fees billed?"))
            .await
        else {
            panic!("expected a generated reply");
        };
        assert!(text.ends_with(&rules.disclaimer.en));

        let Outcome::Generated(text) = pipe
            .respond(&InboundMessage::direct(1, "亞馬遜廣告怎麼投放？"))
            .await
        else {
            panic!("expected a generated reply");
        };
        assert!(text.ends_with(&rules.disclaimer.zh));
    }

    #[tokio::test]
    async fn bare_mention_in_room_is_a_no_op() {
        let provider = Arc::new(FakeProvider::relevant());
        let pipe = pipeline(provider.clone());

        let outcome = pipe.respond(&InboundMessage::room(3, "@bot")).await;
        assert_eq!(outcome, Outcome::Skip);
        assert_eq!(provider.gate_calls() + provider.gen_calls(), 0);
    }
}
