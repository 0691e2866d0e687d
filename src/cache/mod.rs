//! Cache module - caching system using Moka.
//!
//! The cache system follows the registry pattern:
//! - `CacheRegistry` - Central registry holding all named caches
//! - `TypedCache` - Typed wrapper around a Moka cache
//! - `CacheConfig` - Per-cache capacity/TTL configuration
//!
//! The registry is constructed once at process start and handed to the
//! components that need a cache, so tests can inject a fresh, isolated
//! instance per case.

mod config;
mod registry;
mod typed;

pub use config::CacheConfig;
pub use registry::CacheRegistry;
pub use typed::TypedCache;
