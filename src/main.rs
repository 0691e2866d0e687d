//! Shopkeep - Seller support assistant bot.
//!
//! A Telegram bot that answers Amazon seller-support questions through an
//! LLM backend, with FAQ short-circuiting, topic gating and response caching.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `rules` - Read-only rule book (FAQ, keywords, command tags, personas)
//! - `cache` - LRU-based caching with Moka
//! - `llm` - Completion provider (OpenAI-compatible) with bounded retries
//! - `persona` - Fail-soft persona prompt directory
//! - `pipeline` - Per-message decision pipeline (the core)
//! - `bot` - Transport wiring (with Throttle for API rate limiting)
//! - `utils` - Utility functions

mod bot;
mod cache;
mod config;
mod llm;
mod persona;
mod pipeline;
mod rules;
mod utils;

use std::sync::Arc;

use teloxide::adaptors::throttle::Limits;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cache::CacheRegistry;
use config::Config;
use rules::RuleBook;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // Initialize logging with sensible defaults
    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("shopkeep=info,teloxide=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    info!("Starting Shopkeep bot...");

    // Load configuration
    let config = Config::from_env();
    info!("Configuration loaded successfully");
    info!("Bot mode: {:?}", config.bot_mode);

    // Load the rule book (FAQ table, keyword lists, command tags, personas)
    let rules = Arc::new(RuleBook::load(config.rules_path.as_deref())?);
    info!(
        "Rule book loaded: {} FAQ entries, {} command tags, {} official-handled keywords",
        rules.faq.len(),
        rules.commands.len(),
        rules.official_handled.len()
    );

    // Initialize cache registry
    let cache = Arc::new(CacheRegistry::new());

    // Initialize bot with Throttle for automatic rate limiting
    // This respects Telegram's rate limits:
    // - 30 messages per second globally
    // - 1 message per second to the same chat
    // - 20 messages per minute to the same group
    let bot = Bot::new(&config.bot_token).throttle(Limits::default());
    info!("Bot initialized with rate limiting (Throttle)");

    // Get bot info
    let me = bot.get_me().await?;
    info!("Bot username: @{}", me.username());

    // The mention trigger gates replies in group/room chats.
    // Defaults to the bot's own @username; BOT_TRIGGER overrides it.
    let trigger = config
        .bot_trigger
        .clone()
        .unwrap_or_else(|| format!("@{}", me.username()));
    info!("Using mention trigger: {}", trigger);

    // Build dispatcher
    let dispatcher = bot::build_dispatcher(bot.clone(), &config, rules, cache, trigger);

    // Run the bot
    bot::run(&config, dispatcher, bot).await;

    Ok(())
}
