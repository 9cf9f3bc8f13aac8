//! Auto-liquidation settings reconciliation.
//!
//! Reads both upstream auto-liq records for an account, merges them into one
//! `AutoLiqSettings` view, and writes back only the fields the caller's role
//! may change.

mod cache;
mod reconciler;
pub mod schema;

pub use cache::{CachedRead, SettingsCache};
pub use reconciler::{Reconciler, SettingsRead, WriteOutcome, merge};

use thiserror::Error;

use crate::tradovate::ClientError;

/// Risk reconciliation errors.
#[derive(Debug, Error)]
pub enum RiskError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("tradovate rejected auto-liq update: {text}")]
    UpstreamRejected { text: String },

    #[error("write accepted but no entity returned")]
    UpstreamInconsistent,

    #[error("malformed auto-liq payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl RiskError {
    pub(crate) fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        RiskError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for risk operations.
pub type Result<T> = std::result::Result<T, RiskError>;
