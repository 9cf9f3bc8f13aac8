//! JSON HTTP API.

mod accounts;
mod cache;
mod connect;
mod error;
mod extract;
mod health;
mod oauth;
mod risk;

pub use error::ApiError;
pub use extract::{CALLER_ROLE_HEADER, CurrentSession, SESSION_HEADER};

use std::sync::Arc;

use axum::Router;
use reqwest::Client as HttpClient;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::session::SessionStore;
use crate::tradovate::OAuthClient;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Service name reported by `/health`.
    pub service: String,
    pub sessions: Arc<SessionStore>,
    /// Present only when OAuth is enabled.
    pub oauth: Option<Arc<OAuthClient>>,
}

impl AppState {
    pub fn from_config(config: &Config, http_client: HttpClient) -> Self {
        let sessions = SessionStore::new(
            config.tradovate.clone(),
            config.cache_ttl(),
            http_client.clone(),
        )
        .with_session_ttl(config.server().session_ttl());

        let oauth = config.oauth().map(|oauth| {
            let base_url = config.tradovate.base_url_for(config.tradovate.environment);
            Arc::new(OAuthClient::new(oauth.clone(), &base_url, http_client.clone()))
        });

        Self {
            service: config.app.name.clone(),
            sessions: Arc::new(sessions),
            oauth,
        }
    }
}

/// Builds the full router with CORS and request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(connect::router())
        .nest("/oauth", oauth::router())
        .merge(accounts::router())
        .merge(cache::router())
        .nest("/risk", risk::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests;
