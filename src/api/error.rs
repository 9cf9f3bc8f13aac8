//! Error-to-response mapping for the HTTP API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::risk::RiskError;
use crate::session::SessionError;
use crate::tradovate::{ClientError, OAuthError};

/// Stable code attached to expired-token responses.
pub const TOKEN_EXPIRED_CODE: &str = "TOKEN_EXPIRED";

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Risk(#[from] RiskError),

    #[error(transparent)]
    OAuth(#[from] OAuthError),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, Option<&'static str>) {
        match self {
            ApiError::BadRequest(_)
            | ApiError::Session(SessionError::MissingToken)
            | ApiError::Risk(RiskError::Validation { .. }) => (StatusCode::BAD_REQUEST, None),
            ApiError::Client(ClientError::TokenExpired { .. })
            | ApiError::Risk(RiskError::Client(ClientError::TokenExpired { .. })) => {
                (StatusCode::UNAUTHORIZED, Some(TOKEN_EXPIRED_CODE))
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, None),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = self.to_string();

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %message, "request failed");
        } else {
            warn!(status = status.as_u16(), error = %message, "request rejected");
        }

        let body = match code {
            Some(code) => json!({ "success": false, "error": message, "code": code }),
            None => json!({ "success": false, "error": message }),
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
