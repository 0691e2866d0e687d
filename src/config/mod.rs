//! Configuration module for the Shopkeep bot.
//!
//! Loads configuration from environment variables.

use std::env;
use std::path::PathBuf;

use serde::Deserialize;

/// Bot running mode
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BotMode {
    Polling,
    Webhook,
}

impl Default for BotMode {
    fn default() -> Self {
        Self::Polling
    }
}

/// Completion provider configuration.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    // Telegram
    pub bot_token: String,
    pub bot_mode: BotMode,
    pub webhook_url: Option<String>,
    pub webhook_port: u16,
    pub webhook_secret: Option<String>,

    /// Mention token that gates replies in group/room chats.
    /// Optional - defaults to @username fetched via getMe.
    pub bot_trigger: Option<String>,

    /// Port for the standalone health endpoint (polling mode only;
    /// webhook mode serves /healthz on the webhook port).
    pub health_port: u16,

    // Completion provider
    pub provider: ProviderConfig,

    /// Published persona sheet endpoint (key -> prompt JSON object).
    /// Optional - built-in persona prompts are used when absent.
    pub persona_sheet_url: Option<String>,

    /// Path to a rule book JSON file. Optional - embedded defaults
    /// are used when absent.
    pub rules_path: Option<PathBuf>,

    /// Whether the degraded busy-system reply is cached like a normal
    /// generation, so a persistently failing question stops retrying.
    pub cache_busy_replies: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if required environment variables are not set.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let bot_mode = env::var("BOT_MODE")
            .unwrap_or_else(|_| "polling".to_string())
            .to_lowercase();

        let bot_mode = match bot_mode.as_str() {
            "webhook" => BotMode::Webhook,
            _ => BotMode::Polling,
        };

        let webhook_url = env::var("WEBHOOK_URL").ok();

        // Validate webhook URL is set if mode is webhook
        if bot_mode == BotMode::Webhook && webhook_url.is_none() {
            panic!("WEBHOOK_URL must be set when BOT_MODE is webhook");
        }

        let webhook_port = env::var("WEBHOOK_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8443);

        let webhook_secret = env::var("WEBHOOK_SECRET")
            .ok()
            .filter(|s| !s.is_empty());

        // Parse trigger token (strip surrounding whitespace)
        let bot_trigger = env::var("BOT_TRIGGER")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let health_port = env::var("HEALTH_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);

        let provider = ProviderConfig {
            api_key: env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY must be set"),
            api_base: env::var("OPENAI_API_BASE")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
        };

        let persona_sheet_url = env::var("PERSONA_SHEET_URL")
            .ok()
            .filter(|s| !s.is_empty());

        let rules_path = env::var("RULES_PATH").ok().map(PathBuf::from);

        let cache_busy_replies = env::var("CACHE_BUSY_REPLIES")
            .map(|s| matches!(s.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            bot_token: env::var("BOT_TOKEN").expect("BOT_TOKEN must be set"),
            bot_mode,
            webhook_url,
            webhook_port,
            webhook_secret,
            bot_trigger,
            health_port,
            provider,
            persona_sheet_url,
            rules_path,
            cache_busy_replies,
        }
    }
}
