//! HTTP client for the Tradovate REST API.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client as HttpClient, Method, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use super::{ClientError, Result, Upstream};

const USER_AGENT: &str = concat!("tradovate-risk/", env!("CARGO_PKG_VERSION"));

/// Builds the shared HTTP client. No request timeout is set; the caller's
/// request lifetime bounds each call.
pub fn build_http_client() -> reqwest::Result<HttpClient> {
    HttpClient::builder().user_agent(USER_AGENT).build()
}

/// Configuration for creating a new Client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub access_token: Option<String>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        let access_token = access_token.into();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: if access_token.is_empty() {
                None
            } else {
                Some(access_token)
            },
        }
    }
}

/// Authenticated client for one Tradovate connection.
/// Holds no mutable state beyond the token it was created with.
pub struct Client {
    config: ClientConfig,
    http_client: HttpClient,
}

impl Client {
    /// Creates a client that shares `http_client`'s connection pool.
    pub fn new(config: ClientConfig, http_client: HttpClient) -> Self {
        Self {
            config,
            http_client,
        }
    }

    /// Sends an authenticated request and decodes the JSON answer.
    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let token = self
            .config
            .access_token
            .as_deref()
            .ok_or(ClientError::Unauthenticated)?;

        let query_string = query
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let url = if query_string.is_empty() {
            format!("{}{}", self.config.base_url, endpoint)
        } else {
            format!("{}{}?{}", self.config.base_url, endpoint, query_string)
        };

        let mut request = self
            .http_client
            .request(method.clone(), &url)
            .bearer_auth(token)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json");

        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(method = %method, endpoint = %endpoint, "sending request");

        let response = request.send().await.map_err(ClientError::Unreachable)?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(ClientError::Unreachable)?;

        if !status.is_success() {
            return Err(classify_error(&method, endpoint, status, &bytes));
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl Upstream for Client {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        self.request(Method::GET, path, query, None).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::POST, path, &[], Some(body)).await
    }
}

/// Maps a non-2xx answer to a ClientError.
fn classify_error(method: &Method, endpoint: &str, status: StatusCode, body: &[u8]) -> ClientError {
    let text = String::from_utf8_lossy(body).to_string();

    if status == StatusCode::UNAUTHORIZED || text.to_lowercase().contains("access is denied") {
        debug!(method = %method, endpoint = %endpoint, status = status.as_u16(), "access denied");
        return ClientError::TokenExpired {
            status: status.as_u16(),
        };
    }

    warn!(method = %method, endpoint = %endpoint, status = status.as_u16(), body = %text, "api error");

    ClientError::Upstream {
        status: status.as_u16(),
        body: text,
    }
}
