//! Auto-liq settings endpoints.

use axum::{
    Json, Router,
    extract::{Path, rejection::JsonRejection},
    routing::get,
};
use serde::Serialize;
use serde_json::Value;

use super::error::Result;
use super::{ApiError, AppState, CurrentSession};
use crate::domain::AutoLiqSettings;
use crate::risk::SettingsRead;

#[derive(Serialize)]
struct SettingsResponse {
    success: bool,
    /// Null when neither auto-liq record exists.
    settings: Option<AutoLiqSettings>,
    /// Set on reads: whether the session cache answered.
    #[serde(skip_serializing_if = "Option::is_none")]
    cached: Option<bool>,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/{account_id}", get(get_settings).post(set_settings))
}

pub(super) fn parse_account_id(raw: &str) -> Result<i64> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("invalid account id: {:?}", raw)))
}

/// GET /risk/{account_id}
async fn get_settings(
    CurrentSession(session): CurrentSession,
    Path(account_id): Path<String>,
) -> Result<Json<SettingsResponse>> {
    let account_id = parse_account_id(&account_id)?;
    let SettingsRead { settings, cached } = session.reconciler().read_settings(account_id).await?;
    Ok(Json(SettingsResponse {
        success: true,
        settings,
        cached: Some(cached),
    }))
}

/// POST /risk/{account_id}
///
/// Writes the fields the session's role may change.
async fn set_settings(
    CurrentSession(session): CurrentSession,
    Path(account_id): Path<String>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<SettingsResponse>> {
    let account_id = parse_account_id(&account_id)?;
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let Value::Object(requested) = body else {
        return Err(ApiError::BadRequest("request body must be a JSON object".to_string()));
    };

    let settings = session
        .reconciler()
        .set_settings(account_id, &requested, session.role)
        .await?;
    Ok(Json(SettingsResponse {
        success: true,
        settings: Some(settings),
        cached: None,
    }))
}
