//! Configuration loading and validation for the risk manager.
//!
//! Uses serde_yaml to load YAML configuration files with support for
//! environment variable overrides for credentials and the Tradovate environment.

mod app;
mod cache;
mod duration;
mod error;
mod oauth;
mod server;
mod tradovate;

pub use app::AppConfig;
pub use cache::{CacheConfig, DEFAULT_CACHE_TTL};
pub use error::ConfigError;
pub use oauth::{DEFAULT_AUTHORIZE_URL, OAuthConfig};
pub use server::{DEFAULT_SESSION_TTL, ServerConfig};
pub use tradovate::{Environment, TradovateConfig};

use serde::Deserialize;
use std::{env, fs};

/// Root configuration structure.
///
/// Required sections: app.
/// Optional sections: tradovate, server, oauth, cache.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Application-level settings like name and environment.
    pub app: AppConfig,
    /// Tradovate API environment and URL override.
    #[serde(default)]
    pub tradovate: TradovateConfig,
    /// HTTP listener (optional).
    pub server: Option<ServerConfig>,
    /// OAuth authorization-code flow (optional).
    pub oauth: Option<OAuthConfig>,
    /// Settings read cache (optional, enabled with defaults when absent).
    pub cache: Option<CacheConfig>,
}

impl Config {
    /// Load configuration from a YAML file at the given path.
    ///
    /// First loads environment variables from `.env` file (if exists),
    /// then loads YAML config and overrides from environment variables:
    /// - `TRADOVATE_ENV`, `TRADOVATE_ACCESS_TOKEN`
    /// - `TRADOVATE_CID`, `TRADOVATE_SEC`, `TRADOVATE_REDIRECT_URI`
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let content = fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&content)?;

        config.load_overrides_from_env()?;
        config.validate()?;

        Ok(config)
    }

    /// Apply environment overrides and credentials.
    fn load_overrides_from_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(raw) = env::var("TRADOVATE_ENV") {
            if !raw.trim().is_empty() {
                self.tradovate.environment = raw.parse().map_err(ConfigError::Validation)?;
            }
        }

        self.tradovate.access_token = env::var("TRADOVATE_ACCESS_TOKEN").unwrap_or_default();

        if let Some(ref mut oauth) = self.oauth {
            if oauth.enabled {
                oauth.client_id = env::var("TRADOVATE_CID").unwrap_or_default();
                oauth.client_secret = env::var("TRADOVATE_SEC").unwrap_or_default();
                if let Ok(uri) = env::var("TRADOVATE_REDIRECT_URI") {
                    if !uri.is_empty() {
                        oauth.redirect_uri = Some(uri);
                    }
                }
            }
        }

        Ok(())
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.app.name.is_empty() {
            return Err(ConfigError::Validation("app.name is required".into()));
        }

        if let Some(ref url) = self.tradovate.base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Validation(format!(
                    "tradovate.base_url must be an http(s) URL, got {:?}",
                    url
                )));
            }
        }

        if let Some(ref server) = self.server {
            if server.port == Some(0) {
                return Err(ConfigError::Validation(
                    "server.port must be non-zero".into(),
                ));
            }
        }

        if let Some(ref oauth) = self.oauth {
            // Only require credentials outside development
            if oauth.enabled && !self.app.is_development() && !oauth.has_credentials() {
                return Err(ConfigError::Validation(
                    "oauth: credentials not found (set TRADOVATE_CID, TRADOVATE_SEC and TRADOVATE_REDIRECT_URI)".into(),
                ));
            }
        }

        Ok(())
    }

    /// Server settings, falling back to defaults.
    pub fn server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }

    /// Returns the OAuth section only when it is enabled.
    pub fn oauth(&self) -> Option<&OAuthConfig> {
        self.oauth.as_ref().filter(|o| o.enabled)
    }

    /// Effective cache TTL; caching defaults to on.
    pub fn cache_ttl(&self) -> Option<std::time::Duration> {
        match self.cache {
            Some(ref cache) => cache.effective_ttl(),
            None => Some(DEFAULT_CACHE_TTL),
        }
    }
}

#[cfg(test)]
mod tests;
