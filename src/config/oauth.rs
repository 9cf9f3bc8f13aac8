//! OAuth configuration.

use serde::Deserialize;

/// Default Tradovate authorization page.
pub const DEFAULT_AUTHORIZE_URL: &str = "https://trader.tradovate.com/oauth";

/// OAuth authorization-code flow settings.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthConfig {
    /// Whether the OAuth routes should be served.
    #[serde(default)]
    pub enabled: bool,
    /// Authorization page the login route redirects to.
    pub authorize_url: Option<String>,
    /// Redirect URI registered with Tradovate (TRADOVATE_REDIRECT_URI wins).
    pub redirect_uri: Option<String>,
    /// Client id (loaded from TRADOVATE_CID).
    #[serde(skip)]
    pub client_id: String,
    /// Client secret (loaded from TRADOVATE_SEC).
    #[serde(skip)]
    pub client_secret: String,
}

impl OAuthConfig {
    pub fn authorize_url(&self) -> &str {
        self.authorize_url.as_deref().unwrap_or(DEFAULT_AUTHORIZE_URL)
    }

    /// Returns true when every credential needed for the code exchange is present.
    pub fn has_credentials(&self) -> bool {
        !self.client_id.is_empty()
            && !self.client_secret.is_empty()
            && self.redirect_uri.as_deref().is_some_and(|u| !u.is_empty())
    }
}
