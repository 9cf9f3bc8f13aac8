//! Read cache configuration.

use serde::Deserialize;
use std::time::Duration;

use super::duration;

/// Default lifetime of a cached settings read.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30);

/// Per-session cache of reconciled risk settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Whether settings reads should be cached at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// How long a cached read stays valid (default: 30s).
    #[serde(default, with = "duration")]
    pub ttl: Option<Duration>,
}

impl CacheConfig {
    /// Effective TTL, or `None` when caching is disabled.
    pub fn effective_ttl(&self) -> Option<Duration> {
        if !self.enabled {
            return None;
        }
        Some(self.ttl.unwrap_or(DEFAULT_CACHE_TTL))
    }
}

fn default_true() -> bool {
    true
}
