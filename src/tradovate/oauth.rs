//! OAuth authorization-code exchange.

use reqwest::Client as HttpClient;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::OAuthConfig;

/// Token lifetime assumed when upstream omits `expires_in`.
const DEFAULT_EXPIRES_IN: u64 = 5400;

/// OAuth errors.
#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("oauth is not configured")]
    NotConfigured,

    #[error("could not reach tradovate oauth endpoint: {0}")]
    Unreachable(#[source] reqwest::Error),

    #[error("oauth error: {error} - {description}")]
    Provider { error: String, description: String },

    #[error("no access token returned from oauth exchange")]
    MissingToken,

    #[error("malformed oauth response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Access token obtained from an authorization code.
#[derive(Debug, Clone)]
pub struct OAuthToken {
    pub access_token: String,
    /// Lifetime in seconds.
    pub expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Client for the Tradovate OAuth endpoints.
pub struct OAuthClient {
    config: OAuthConfig,
    token_url: String,
    http_client: HttpClient,
}

impl OAuthClient {
    /// Creates a client that exchanges codes against `<base_url>/auth/oauthtoken`.
    pub fn new(config: OAuthConfig, base_url: &str, http_client: HttpClient) -> Self {
        Self {
            config,
            token_url: format!("{}/auth/oauthtoken", base_url.trim_end_matches('/')),
            http_client,
        }
    }

    /// Builds the authorization URL the user is sent to.
    pub fn login_url(&self) -> Result<String, OAuthError> {
        let redirect_uri = self.redirect_uri()?;
        if self.config.client_id.is_empty() {
            return Err(OAuthError::NotConfigured);
        }

        Ok(format!(
            "{}?response_type=code&client_id={}&redirect_uri={}",
            self.config.authorize_url(),
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(redirect_uri)
        ))
    }

    /// Exchanges an authorization code for an access token.
    pub async fn exchange_code(&self, code: &str) -> Result<OAuthToken, OAuthError> {
        if !self.config.has_credentials() {
            return Err(OAuthError::NotConfigured);
        }

        let body = json!({
            "grant_type": "authorization_code",
            "code": code,
            "redirect_uri": self.redirect_uri()?,
            "client_id": self.config.client_id,
            "client_secret": self.config.client_secret,
        });

        debug!(url = %self.token_url, "exchanging oauth code");

        let response = self
            .http_client
            .post(&self.token_url)
            .header(ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(OAuthError::Unreachable)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(OAuthError::Unreachable)?;

        let resp: TokenResponse = match serde_json::from_slice(&bytes) {
            Ok(resp) => resp,
            Err(_) if !status.is_success() => {
                return Err(OAuthError::Provider {
                    error: format!("http {}", status.as_u16()),
                    description: String::from_utf8_lossy(&bytes).to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(error) = resp.error {
            warn!(error = %error, "oauth exchange rejected");
            return Err(OAuthError::Provider {
                error,
                description: resp.error_description.unwrap_or_else(|| "unknown".to_string()),
            });
        }

        let access_token = resp
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(OAuthError::MissingToken)?;

        Ok(OAuthToken {
            access_token,
            expires_in: resp.expires_in.unwrap_or(DEFAULT_EXPIRES_IN),
        })
    }

    fn redirect_uri(&self) -> Result<&str, OAuthError> {
        self.config
            .redirect_uri
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or(OAuthError::NotConfigured)
    }
}
