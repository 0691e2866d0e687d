//! Topic gate - relevance pre-filter before expensive generation.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::llm::Completion;

/// Token cap for the classifier: the only allowed outputs are YES/NO.
const CLASSIFIER_MAX_TOKENS: u32 = 3;

/// Zero-shot binary relevance classifier over the completion provider.
///
/// Fail-open: a wrongly blocked on-topic message is worse than an
/// occasional off-topic one reaching the generator, so provider failures
/// and unparseable verdicts count as relevant.
pub struct TopicGate {
    provider: Arc<dyn Completion>,
    prompt: String,
}

impl TopicGate {
    pub fn new(provider: Arc<dyn Completion>, domain: &str) -> Self {
        let prompt = format!(
            "You are a classifier. Answer only 'YES' or 'NO'. \
             Does this message relate to {domain}?"
        );
        Self { provider, prompt }
    }

    pub async fn is_relevant(&self, text: &str) -> bool {
        match self
            .provider
            .complete(&self.prompt, text, CLASSIFIER_MAX_TOKENS, 0.0)
            .await
        {
            Ok(verdict) => match verdict.trim().to_uppercase().as_str() {
                "YES" => true,
                "NO" => {
                    debug!("Classifier rejected message as off-topic");
                    false
                }
                other => {
                    warn!("Unparseable classifier verdict '{}', allowing through", other);
                    true
                }
            },
            Err(err) => {
                warn!("Classifier call failed, allowing through: {}", err);
                true
            }
        }
    }
}
