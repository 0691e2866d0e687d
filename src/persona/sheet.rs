//! Remote persona sheet source.
//!
//! The persona store is a published spreadsheet endpoint serving a flat
//! JSON object of persona key -> system prompt.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use url::Url;

/// Fetch timeout; a slow store must not hold a handler.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP source for persona prompts.
#[derive(Clone)]
pub struct SheetSource {
    client: Client,
    url: Url,
}

impl SheetSource {
    pub fn new(url: &str) -> Result<Self> {
        let url = Url::parse(url).with_context(|| format!("invalid persona sheet URL: {url}"))?;
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self { client, url })
    }

    /// Fetch the prompt for one persona key.
    ///
    /// Returns `Ok(None)` when the sheet does not know the key. Callers
    /// absorb errors; nothing here is fatal.
    pub async fn fetch_prompt(&self, key: &str) -> Result<Option<String>> {
        let sheet: HashMap<String, String> = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .context("persona sheet request failed")?
            .error_for_status()
            .context("persona sheet returned an error status")?
            .json()
            .await
            .context("persona sheet body is not a key -> prompt object")?;

        Ok(sheet.get(key).map(|prompt| prompt.trim().to_string()))
    }
}
