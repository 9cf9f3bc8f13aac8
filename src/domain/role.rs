//! Caller relationship to an account.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// CallerRole describes how the authenticated user relates to the account
/// being configured. It decides which auto-liq fields a write may forward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallerRole {
    /// Legal owner of the account; may edit lock and drawdown controls.
    Owner,
    /// Delegated user with access to the permissioned entity only.
    #[default]
    Permissioned,
}

impl fmt::Display for CallerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallerRole::Owner => write!(f, "owner"),
            CallerRole::Permissioned => write!(f, "permissioned"),
        }
    }
}

impl FromStr for CallerRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "owner" => Ok(CallerRole::Owner),
            "permissioned" => Ok(CallerRole::Permissioned),
            other => Err(format!("role must be \"owner\" or \"permissioned\", got {:?}", other)),
        }
    }
}
