//! Per-request session resolution.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use super::{ApiError, AppState};
use crate::domain::CallerRole;
use crate::session::{Session, SessionError};

/// Header carrying the id returned by `POST /connect`.
pub const SESSION_HEADER: &str = "x-session-id";
/// Role for bearer-token requests without a session.
pub const CALLER_ROLE_HEADER: &str = "x-caller-role";

/// The session a request runs under.
///
/// Resolved from `X-Session-Id` first, then from `Authorization: Bearer`
/// as a one-off session that is never stored.
pub struct CurrentSession(pub Arc<Session>);

impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(id) = header_value(&parts.headers, SESSION_HEADER) {
            let session = state.sessions.get(id).await?;
            return Ok(CurrentSession(session));
        }

        if let Some(token) = bearer_token(&parts.headers) {
            let role = match header_value(&parts.headers, CALLER_ROLE_HEADER) {
                Some(role) => role.parse::<CallerRole>().map_err(ApiError::BadRequest)?,
                None => CallerRole::default(),
            };
            let session = state.sessions.ephemeral(token, None, role)?;
            return Ok(CurrentSession(Arc::new(session)));
        }

        Err(SessionError::NotConnected.into())
    }
}

/// Trimmed, non-empty header value.
pub(super) fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    header_value(headers, AUTHORIZATION.as_str())?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
