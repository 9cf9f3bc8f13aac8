//! Brokerage account as reported by Tradovate.

use serde::{Deserialize, Serialize};

/// Account represents a Tradovate trading account.
///
/// Sourced from upstream and never written by this system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Account id, also used as `masterid` for auto-liq queries.
    pub id: i64,
    /// Display name (e.g. "DEMO1234567").
    pub name: String,
    /// Id of the user that owns the account.
    pub user_id: i64,
    /// Account type (e.g. "Customer").
    pub account_type: String,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clearing_house_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_category_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_liq_profile_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_account_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readonly: Option<bool>,
}
