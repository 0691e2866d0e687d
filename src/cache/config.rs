//! Cache configuration.

use std::time::Duration;

/// Configuration for a cache instance.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries. `None` means unbounded.
    pub max_capacity: Option<u64>,

    /// Time-to-live for cache entries.
    /// After this duration, entries are automatically evicted.
    pub ttl: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: Some(10_000),
            ttl: Some(Duration::from_secs(300)), // 5 minutes
        }
    }
}

impl CacheConfig {
    /// Config for generated replies: keyed by exact message text, kept for
    /// the life of the process. Unbounded growth is a known limitation.
    pub fn replies() -> Self {
        Self {
            max_capacity: None,
            ttl: None,
        }
    }

    /// Config for persona prompts fetched from the remote store.
    /// Small and short-lived so sheet edits show up within minutes.
    pub fn personas() -> Self {
        Self {
            max_capacity: Some(256),
            ttl: Some(Duration::from_secs(600)), // 10 minutes
        }
    }

    /// Set max capacity for cache (builder pattern).
    #[must_use]
    #[allow(dead_code)]
    pub fn max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = Some(max_capacity);
        self
    }

    /// Set time-to-live for cache entries.
    #[must_use]
    #[allow(dead_code)]
    pub fn ttl(mut self, duration: Duration) -> Self {
        self.ttl = Some(duration);
        self
    }
}
