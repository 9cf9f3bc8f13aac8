//! Tradovate REST integration: authenticated client, account queries and OAuth.

mod accounts;
mod client;
mod oauth;

pub use accounts::{get_account, list_accounts};
pub use client::{Client, ClientConfig, build_http_client};
pub use oauth::{OAuthClient, OAuthError, OAuthToken};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No bearer token was supplied for the connection.
    #[error("not authenticated: no access token available")]
    Unauthenticated,

    /// Upstream answered 401 or "Access is denied".
    #[error("tradovate token expired or access denied (status {status})")]
    TokenExpired { status: u16 },

    /// The request never produced a response.
    #[error("tradovate unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    /// Any other non-2xx answer.
    #[error("tradovate api error {status}: {body}")]
    Upstream { status: u16, body: String },

    /// A 2xx answer whose body did not match the expected shape.
    #[error("malformed tradovate response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Upstream is the JSON transport the risk reconciler is written against.
/// `Client` is the production implementation.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// GET `path` with the given query pairs and return the decoded body.
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value>;

    /// POST `body` as JSON to `path` and return the decoded body.
    async fn post(&self, path: &str, body: &Value) -> Result<Value>;
}
