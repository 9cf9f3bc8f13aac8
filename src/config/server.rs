//! HTTP server configuration.

use serde::Deserialize;
use std::time::Duration;

use super::duration;

/// Lifetime of a session created from a pasted token.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(90 * 60);

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 4000;

/// Listener settings for the JSON API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind (default: 0.0.0.0).
    pub host: Option<String>,
    /// TCP port (default: 4000).
    pub port: Option<u16>,
    /// How long a `/connect` session lives (default: 90m). OAuth sessions
    /// use the token's own expiry instead.
    #[serde(default, with = "duration")]
    pub session_ttl: Option<Duration>,
}

impl ServerConfig {
    /// Returns the `host:port` pair to bind.
    pub fn bind_address(&self) -> String {
        format!(
            "{}:{}",
            self.host.as_deref().unwrap_or(DEFAULT_HOST),
            self.port.unwrap_or(DEFAULT_PORT)
        )
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl.unwrap_or(DEFAULT_SESSION_TTL)
    }
}
