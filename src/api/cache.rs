//! Debug view of the caller's settings cache.

use axum::{Json, Router, extract::State, routing::get};
use chrono::Utc;
use serde::Serialize;

use super::{AppState, CurrentSession};
use crate::domain::AutoLiqSettings;
use crate::risk::CachedRead;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CacheEntryView {
    account_id: i64,
    settings: Option<AutoLiqSettings>,
    age_ms: u128,
    expires_in_ms: u128,
}

impl From<CachedRead> for CacheEntryView {
    fn from(read: CachedRead) -> Self {
        Self {
            account_id: read.account_id,
            settings: read.settings,
            age_ms: read.age.as_millis(),
            expires_in_ms: read.expires_in.as_millis(),
        }
    }
}

#[derive(Serialize)]
struct CacheResponse {
    success: bool,
    /// Registered sessions across all callers.
    sessions: usize,
    entries: Vec<CacheEntryView>,
    timestamp: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/cache", get(cache))
}

/// GET /cache
async fn cache(
    State(state): State<AppState>,
    CurrentSession(session): CurrentSession,
) -> Json<CacheResponse> {
    let entries = session
        .cached_reads()
        .await
        .into_iter()
        .map(CacheEntryView::from)
        .collect();

    Json(CacheResponse {
        success: true,
        sessions: state.sessions.len().await,
        entries,
        timestamp: Utc::now().to_rfc3339(),
    })
}
