//! In-memory session registry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client as HttpClient;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use super::{Result, Session, SessionError, token_fingerprint};
use crate::config::{DEFAULT_SESSION_TTL, Environment, TradovateConfig};
use crate::domain::CallerRole;
use crate::risk::SettingsCache;
use crate::tradovate::{Client, ClientConfig};

/// SessionStore owns every connected session.
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Arc<Session>>>>,
    http_client: HttpClient,
    tradovate: TradovateConfig,
    cache_ttl: Option<Duration>,
    session_ttl: Duration,
}

impl SessionStore {
    /// Creates an empty store. `cache_ttl` of `None` disables caching.
    pub fn new(tradovate: TradovateConfig, cache_ttl: Option<Duration>, http_client: HttpClient) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            http_client,
            tradovate,
            cache_ttl,
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }

    /// Sets how long a pasted-token session stays usable.
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Environment used when a caller does not pick one.
    pub fn default_environment(&self) -> Environment {
        self.tradovate.environment
    }

    /// Base URL for `environment`, honoring a configured override.
    pub fn base_url(&self, environment: Environment) -> String {
        self.tradovate.base_url_for(environment)
    }

    /// Creates and registers a session for `token` using the configured lifetime.
    pub async fn connect(
        &self,
        token: &str,
        environment: Option<Environment>,
        role: CallerRole,
    ) -> Result<Arc<Session>> {
        self.connect_for(token, environment, role, self.session_ttl).await
    }

    /// Creates and registers a session that expires after `lifetime`.
    /// Expired sessions are pruned on the way in.
    pub async fn connect_for(
        &self,
        token: &str,
        environment: Option<Environment>,
        role: CallerRole,
        lifetime: Duration,
    ) -> Result<Arc<Session>> {
        let session = Arc::new(self.build(token, environment, role, lifetime, true)?);

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired());
        let pruned = before - sessions.len();

        sessions.insert(session.id.clone(), session.clone());
        info!(
            session = %session.id,
            environment = %session.environment,
            role = %session.role,
            token = %session.fingerprint,
            expires_at = ?session.expires_at,
            pruned,
            active = sessions.len(),
            "Session connected"
        );

        Ok(session)
    }

    /// Builds an unregistered, uncached session for a single request.
    pub fn ephemeral(
        &self,
        token: &str,
        environment: Option<Environment>,
        role: CallerRole,
    ) -> Result<Session> {
        self.build(token, environment, role, self.session_ttl, false)
    }

    /// Looks up a live session. An expired one is dropped and reported as
    /// not connected.
    pub async fn get(&self, id: &str) -> Result<Arc<Session>> {
        let session = {
            let sessions = self.sessions.read().await;
            sessions.get(id).cloned().ok_or(SessionError::NotConnected)?
        };
        if !session.is_expired() {
            return Ok(session);
        }

        if self.sessions.write().await.remove(id).is_some() {
            info!(session = %id, token = %session.fingerprint, "Session expired");
        }
        Err(SessionError::NotConnected)
    }

    /// Removes a session; returns whether it existed.
    pub async fn disconnect(&self, id: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.remove(id) {
            Some(session) => {
                info!(session = %id, token = %session.fingerprint, "Session disconnected");
                true
            }
            None => {
                warn!(session = %id, "Attempted to disconnect unknown session");
                false
            }
        }
    }

    /// Number of registered sessions, expired ones not yet pruned included.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn build(
        &self,
        token: &str,
        environment: Option<Environment>,
        role: CallerRole,
        lifetime: Duration,
        cached: bool,
    ) -> Result<Session> {
        let token = token.trim();
        if token.is_empty() {
            return Err(SessionError::MissingToken);
        }

        let environment = environment.unwrap_or(self.tradovate.environment);
        let client = Client::new(
            ClientConfig::new(self.base_url(environment), token),
            self.http_client.clone(),
        );
        let cache = self
            .cache_ttl
            .filter(|_| cached)
            .map(|ttl| Arc::new(SettingsCache::new(ttl)));

        Ok(Session::new(
            Uuid::new_v4().to_string(),
            environment,
            role,
            token_fingerprint(token),
            lifetime,
            Arc::new(client),
            cache,
        ))
    }
}
