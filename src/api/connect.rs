//! Session lifecycle endpoints.
//!
//! 1. POST /connect - register a token, get a session id
//! 2. GET /connect - inspect the session named by `X-Session-Id`
//! 3. DELETE /connect - drop that session

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::Result;
use super::extract::header_value;
use super::{ApiError, AppState, SESSION_HEADER};
use crate::config::Environment;
use crate::domain::CallerRole;
use crate::session::{Session, SessionError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectRequest {
    access_token: Option<String>,
    environment: Option<String>,
    role: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ConnectResponse {
    success: bool,
    session_id: String,
    environment: Environment,
    role: CallerRole,
    connected: bool,
}

impl From<&Session> for ConnectResponse {
    fn from(session: &Session) -> Self {
        Self {
            success: true,
            session_id: session.id.clone(),
            environment: session.environment,
            role: session.role,
            connected: true,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    success: bool,
    connected: bool,
    environment: Environment,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<CallerRole>,
    #[serde(skip_serializing_if = "Option::is_none")]
    connected_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cached_accounts: Option<usize>,
}

#[derive(Debug, Serialize)]
struct DisconnectResponse {
    success: bool,
    connected: bool,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/connect", get(status).post(connect).delete(disconnect))
}

/// Parses an optional role string, defaulting to permissioned.
pub(super) fn parse_role(role: Option<&str>) -> Result<CallerRole> {
    match role {
        Some(role) => role.parse().map_err(ApiError::BadRequest),
        None => Ok(CallerRole::default()),
    }
}

/// POST /connect
async fn connect(
    State(state): State<AppState>,
    body: std::result::Result<Json<ConnectRequest>, JsonRejection>,
) -> Result<Json<ConnectResponse>> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let token = request
        .access_token
        .filter(|t| !t.trim().is_empty())
        .ok_or(SessionError::MissingToken)?;
    let environment = request
        .environment
        .as_deref()
        .map(str::parse::<Environment>)
        .transpose()
        .map_err(ApiError::BadRequest)?;
    let role = parse_role(request.role.as_deref())?;

    let session = state.sessions.connect(&token, environment, role).await?;
    Ok(Json(ConnectResponse::from(session.as_ref())))
}

/// GET /connect
async fn status(State(state): State<AppState>, headers: HeaderMap) -> Json<StatusResponse> {
    let session = match header_value(&headers, SESSION_HEADER) {
        Some(id) => state.sessions.get(id).await.ok(),
        None => None,
    };

    let response = match session {
        Some(session) => StatusResponse {
            success: true,
            connected: true,
            environment: session.environment,
            role: Some(session.role),
            connected_at: Some(session.connected_at),
            expires_at: session.expires_at,
            cached_accounts: Some(session.cached_accounts().await),
        },
        None => StatusResponse {
            success: true,
            connected: false,
            environment: state.sessions.default_environment(),
            role: None,
            connected_at: None,
            expires_at: None,
            cached_accounts: None,
        },
    };
    Json(response)
}

/// DELETE /connect
async fn disconnect(State(state): State<AppState>, headers: HeaderMap) -> Json<DisconnectResponse> {
    if let Some(id) = header_value(&headers, SESSION_HEADER) {
        state.sessions.disconnect(id).await;
    }
    Json(DisconnectResponse {
        success: true,
        connected: false,
    })
}
