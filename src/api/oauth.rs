//! OAuth login flow.
//!
//! 1. GET /oauth/login - redirect to Tradovate's authorization page
//! 2. GET /oauth/callback - exchange the code, redirect back to `/`
//! 3. POST /oauth/exchange - exchange a code directly, JSON in and out

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    response::Redirect,
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::connect::{ConnectResponse, parse_role};
use super::error::Result;
use super::{ApiError, AppState};
use crate::domain::CallerRole;
use crate::session::Session;
use crate::tradovate::{OAuthClient, OAuthError, OAuthToken};

#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExchangeRequest {
    code: Option<String>,
    role: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/exchange", post(exchange))
}

fn oauth_client(state: &AppState) -> Result<&OAuthClient> {
    state
        .oauth
        .as_deref()
        .ok_or(ApiError::OAuth(OAuthError::NotConfigured))
}

/// Sessions end when the token they carry does.
fn session_lifetime(token: &OAuthToken) -> Duration {
    Duration::from_secs(token.expires_in)
}

async fn connect_with_code(state: &AppState, code: &str, role: CallerRole) -> Result<Arc<Session>> {
    let token = oauth_client(state)?.exchange_code(code).await?;
    let session = state
        .sessions
        .connect_for(&token.access_token, None, role, session_lifetime(&token))
        .await?;
    info!(session = %session.id, expires_in = token.expires_in, "OAuth session established");
    Ok(session)
}

/// GET /oauth/login
async fn login(State(state): State<AppState>) -> Result<Redirect> {
    let url = oauth_client(&state)?.login_url()?;
    Ok(Redirect::to(&url))
}

/// GET /oauth/callback
///
/// Always redirects; failures travel in the `error` query parameter.
async fn callback(State(state): State<AppState>, Query(params): Query<CallbackParams>) -> Redirect {
    if let Some(error) = params.error {
        let message = params.error_description.unwrap_or(error);
        warn!(error = %message, "OAuth provider returned an error");
        return error_redirect(&message);
    }

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        return error_redirect("missing authorization code");
    };

    match connect_with_code(&state, &code, CallerRole::default()).await {
        Ok(session) => Redirect::to(&format!(
            "/?connected=true&session={}",
            urlencoding::encode(&session.id)
        )),
        Err(e) => {
            warn!(error = %e, "OAuth callback failed");
            error_redirect(&e.to_string())
        }
    }
}

/// POST /oauth/exchange
async fn exchange(
    State(state): State<AppState>,
    body: std::result::Result<Json<ExchangeRequest>, JsonRejection>,
) -> Result<Json<ConnectResponse>> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let code = request
        .code
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("authorization code is required".to_string()))?;
    let role = parse_role(request.role.as_deref())?;

    let session = connect_with_code(&state, &code, role).await?;
    Ok(Json(ConnectResponse::from(session.as_ref())))
}

fn error_redirect(message: &str) -> Redirect {
    Redirect::to(&format!("/?error={}", urlencoding::encode(message)))
}
