//! Message dispatcher setup.
//!
//! Builds the dispatcher and wires the decision pipeline into a single
//! per-message handler.

use std::sync::Arc;

use teloxide::adaptors::Throttle;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::ReplyParameters;
use tracing::{debug, error};

use crate::cache::CacheRegistry;
use crate::config::Config;
use crate::llm::{OpenAiClient, RetryPolicy};
use crate::persona::{PersonaDirectory, SheetSource};
use crate::pipeline::message::InboundMessage;
use crate::pipeline::Pipeline;
use crate::rules::RuleBook;

/// Bot type with Throttle adaptor for automatic rate limiting.
pub type ThrottledBot = Throttle<Bot>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The per-message decision pipeline.
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        config: &Config,
        rules: Arc<RuleBook>,
        cache: Arc<CacheRegistry>,
        trigger: String,
    ) -> Self {
        let provider = Arc::new(OpenAiClient::new(&config.provider));

        // A broken sheet URL must not stop the bot; built-in personas
        // cover every known key.
        let sheet = config.persona_sheet_url.as_deref().and_then(|url| {
            match SheetSource::new(url) {
                Ok(source) => Some(source),
                Err(err) => {
                    error!("Ignoring persona sheet: {:#}", err);
                    None
                }
            }
        });
        let personas = PersonaDirectory::new(sheet, &cache, &rules);

        let pipeline = Pipeline::new(
            &rules,
            provider,
            personas,
            &cache,
            &trigger,
            RetryPolicy::default(),
            config.cache_busy_replies,
        );

        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Build the dispatcher with the message handler.
pub fn build_dispatcher(
    bot: ThrottledBot,
    config: &Config,
    rules: Arc<RuleBook>,
    cache: Arc<CacheRegistry>,
    trigger: String,
) -> Dispatcher<ThrottledBot, anyhow::Error, teloxide::dispatching::DefaultKey> {
    let state = AppState::new(config, rules, cache, trigger);

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
}

/// Build the handler schema.
fn schema() -> UpdateHandler<anyhow::Error> {
    use teloxide::dispatching::UpdateFilterExt;

    Update::filter_message().endpoint(handle_message)
}

/// Per-message handler boundary.
///
/// All errors are logged and swallowed here so the transport always sees
/// success and never retry-storms a delivery.
async fn handle_message(bot: ThrottledBot, msg: Message, state: AppState) -> anyhow::Result<()> {
    if let Err(err) = process_message(&bot, &msg, &state).await {
        error!("Message handler error in chat {}: {:#}", msg.chat.id, err);
    }
    Ok(())
}

async fn process_message(
    bot: &ThrottledBot,
    msg: &Message,
    state: &AppState,
) -> anyhow::Result<()> {
    // Only plain text messages enter the pipeline.
    let text = match msg.text() {
        Some(text) => text,
        None => return Ok(()),
    };

    let inbound = match InboundMessage::from_chat(&msg.chat, text) {
        Some(inbound) => inbound,
        None => {
            debug!("Ignoring message from unsupported chat kind {}", msg.chat.id);
            return Ok(());
        }
    };

    let outcome = state.pipeline.respond(&inbound).await;

    // At most one outbound message per inbound event.
    if let Some(reply) = outcome.reply_text() {
        let mut request = bot.send_message(msg.chat.id, reply);
        if inbound.source.is_multi_party() {
            // Quote the triggering message so the answer is attributable
            // in a busy chat.
            request = request.reply_parameters(ReplyParameters::new(msg.id));
        }
        request.await?;
    }

    Ok(())
}
