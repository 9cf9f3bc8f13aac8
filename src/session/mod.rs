//! Explicit per-connection sessions.
//!
//! A session binds one Tradovate token to an environment, a caller role, a
//! client and an optional settings cache. Sessions live in a [`SessionStore`]
//! keyed by an opaque id.

mod store;

pub use store::SessionStore;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::config::Environment;
use crate::domain::CallerRole;
use crate::risk::{CachedRead, Reconciler, SettingsCache};
use crate::tradovate::Upstream;

/// Session errors.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("not connected: call /connect first")]
    NotConnected,

    #[error("access token is required")]
    MissingToken,
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// One authenticated connection to Tradovate.
pub struct Session {
    pub id: String,
    pub environment: Environment,
    pub role: CallerRole,
    pub connected_at: DateTime<Utc>,
    /// `None` when the lifetime does not fit in a timestamp.
    pub expires_at: Option<DateTime<Utc>>,
    /// Short SHA-256 prefix of the token, safe to log.
    pub fingerprint: String,
    upstream: Arc<dyn Upstream>,
    cache: Option<Arc<SettingsCache>>,
}

impl Session {
    pub fn new(
        id: impl Into<String>,
        environment: Environment,
        role: CallerRole,
        fingerprint: impl Into<String>,
        lifetime: Duration,
        upstream: Arc<dyn Upstream>,
        cache: Option<Arc<SettingsCache>>,
    ) -> Self {
        let connected_at = Utc::now();
        let expires_at = chrono::Duration::from_std(lifetime)
            .ok()
            .and_then(|lifetime| connected_at.checked_add_signed(lifetime));
        Self {
            id: id.into(),
            environment,
            role,
            connected_at,
            expires_at,
            fingerprint: fingerprint.into(),
            upstream,
            cache,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Utc::now() >= at)
    }

    pub fn upstream(&self) -> &dyn Upstream {
        self.upstream.as_ref()
    }

    /// Reconciler bound to this session's client and cache.
    pub fn reconciler(&self) -> Reconciler {
        let reconciler = Reconciler::new(self.upstream.clone());
        match &self.cache {
            Some(cache) => reconciler.with_cache(cache.clone()),
            None => reconciler,
        }
    }

    /// Number of live cache entries, zero when caching is off.
    pub async fn cached_accounts(&self) -> usize {
        match &self.cache {
            Some(cache) => cache.len().await,
            None => 0,
        }
    }

    /// Live cache entries, empty when caching is off.
    pub async fn cached_reads(&self) -> Vec<CachedRead> {
        match &self.cache {
            Some(cache) => cache.snapshot().await,
            None => Vec::new(),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("environment", &self.environment)
            .field("role", &self.role)
            .field("connected_at", &self.connected_at)
            .field("expires_at", &self.expires_at)
            .field("fingerprint", &self.fingerprint)
            .field("cached", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}

/// Returns the first 12 hex chars of the token's SHA-256.
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex::encode(digest)[..12].to_string()
}
