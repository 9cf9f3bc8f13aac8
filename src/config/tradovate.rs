//! Tradovate API configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const LIVE_API_URL: &str = "https://live.tradovateapi.com/v1";
const DEMO_API_URL: &str = "https://demo.tradovateapi.com/v1";

/// Tradovate server environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Live,
    #[default]
    Demo,
}

impl Environment {
    /// Public REST endpoint for this environment.
    pub fn base_url(self) -> &'static str {
        match self {
            Environment::Live => LIVE_API_URL,
            Environment::Demo => DEMO_API_URL,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Live => write!(f, "live"),
            Environment::Demo => write!(f, "demo"),
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "live" => Ok(Environment::Live),
            "demo" => Ok(Environment::Demo),
            other => Err(format!("environment must be \"live\" or \"demo\", got {:?}", other)),
        }
    }
}

/// Settings for talking to the Tradovate REST API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TradovateConfig {
    /// Default environment for new connections (overridden by TRADOVATE_ENV).
    #[serde(default)]
    pub environment: Environment,
    /// Replaces the environment URL for every connection (useful for sandboxes).
    pub base_url: Option<String>,
    /// Access token for CLI mode (loaded from TRADOVATE_ACCESS_TOKEN).
    #[serde(skip)]
    pub access_token: String,
}

impl TradovateConfig {
    /// Resolves the REST base URL for a connection in `env`.
    pub fn base_url_for(&self, env: Environment) -> String {
        match self.base_url {
            Some(ref url) => url.trim_end_matches('/').to_string(),
            None => env.base_url().to_string(),
        }
    }
}
