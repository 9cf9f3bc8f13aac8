//! Auto-liquidation entities and the reconciled settings view.
//!
//! Tradovate stores auto-liq configuration in two parallel records: one the
//! account owner can see (`userAccountAutoLiq`) and one a delegated user can
//! see (`permissionedAccountAutoLiq`). Both are read as-is here; merging them
//! is the job of `crate::risk`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// When trailing drawdown is re-evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrailingDrawdownMode {
    /// Evaluated at end of day.
    #[serde(rename = "EOD")]
    EndOfDay,
    /// Evaluated on every equity change.
    #[serde(rename = "RealTime")]
    RealTime,
}

/// Owner-scoped auto-liq record (`userAccountAutoLiq`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerAutoLiq {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes_locked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub margin_percentage_alert: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub daily_loss_percentage_alert: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub daily_loss_alert: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub margin_percentage_liq_only: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub daily_loss_percentage_liq_only: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub daily_loss_liq_only: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub margin_percentage_auto_liq: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub daily_loss_percentage_auto_liq: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub daily_loss_auto_liq: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub weekly_loss_auto_liq: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flatten_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub trailing_max_drawdown: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub trailing_max_drawdown_limit: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailing_max_drawdown_mode: Option<TrailingDrawdownMode>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub daily_profit_auto_liq: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub weekly_profit_auto_liq: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub do_not_unlock: Option<bool>,
}

/// Permission-scoped auto-liq record (`permissionedAccountAutoLiq`).
///
/// Carries no lock/unlock controls. `trailing_max_drawdown` is read when
/// upstream includes it, but a permissioned caller can never write it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionedAutoLiq {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub margin_percentage_alert: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub daily_loss_percentage_alert: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub daily_loss_alert: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub margin_percentage_liq_only: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub daily_loss_percentage_liq_only: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub daily_loss_liq_only: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub margin_percentage_auto_liq: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub daily_loss_percentage_auto_liq: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub daily_loss_auto_liq: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub weekly_loss_auto_liq: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub daily_profit_auto_liq: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub weekly_profit_auto_liq: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub trailing_max_drawdown: Option<Decimal>,
}

/// AutoLiqSettings is the single logical view callers see, whichever
/// upstream record(s) it was built from.
///
/// There is no canonical id: `owner_id` and `permissioned_id` name the
/// records that contributed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoLiqSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissioned_id: Option<i64>,

    /// Daily loss that triggers liquidation.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub daily_loss_auto_liq: Option<Decimal>,
    /// Daily profit target that triggers liquidation.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub daily_profit_auto_liq: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub weekly_loss_auto_liq: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub weekly_profit_auto_liq: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub daily_loss_alert: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub daily_loss_percentage_alert: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub margin_percentage_alert: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub daily_loss_liq_only: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub daily_loss_percentage_liq_only: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub margin_percentage_liq_only: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub daily_loss_percentage_auto_liq: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub margin_percentage_auto_liq: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub trailing_max_drawdown: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::float_option")]
    pub trailing_max_drawdown_limit: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trailing_max_drawdown_mode: Option<TrailingDrawdownMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flatten_timestamp: Option<DateTime<Utc>>,
    /// Keep the account closed after a trigger instead of reopening it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub do_not_unlock: Option<bool>,
    /// Upstream refuses further edits while set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes_locked: Option<bool>,
}
