//! Completion provider - the LLM backend seam.
//!
//! The pipeline talks to the provider through the [`Completion`] trait so
//! tests can substitute deterministic fakes for the HTTP client.

mod openai;
mod retry;

pub use openai::OpenAiClient;
pub use retry::RetryPolicy;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the completion provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("provider returned an empty completion")]
    Empty,
}

/// A black-box completion service: system prompt and user text in,
/// generated text out, or a [`ProviderError`].
#[async_trait]
pub trait Completion: Send + Sync {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, ProviderError>;
}
