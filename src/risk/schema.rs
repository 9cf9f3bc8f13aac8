//! Declarative auto-liq field table.
//!
//! Every field the system reads or writes is listed once, with its value
//! kind, which upstream record wins on read, and which roles may write it.

use serde_json::Value;

use crate::domain::{CallerRole, TrailingDrawdownMode};

/// Value kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Dollar amount; must be finite and positive.
    Amount,
    /// Percentage; must be finite and positive.
    Percentage,
    Flag,
    DrawdownMode,
    Timestamp,
}

/// Upstream record a value can come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Owner,
    Permissioned,
}

/// Read priority between the two records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOrder {
    PermissionedFirst,
    OwnerFirst,
    OwnerOnly,
}

impl MergeOrder {
    /// Records to consult, in order; the first non-null value wins.
    pub fn sources(self) -> &'static [Source] {
        match self {
            MergeOrder::PermissionedFirst => &[Source::Permissioned, Source::Owner],
            MergeOrder::OwnerFirst => &[Source::Owner, Source::Permissioned],
            MergeOrder::OwnerOnly => &[Source::Owner],
        }
    }
}

/// One row of the field table.
#[derive(Debug)]
pub struct FieldSpec {
    /// Upstream JSON name.
    pub name: &'static str,
    pub kind: FieldKind,
    pub merge: MergeOrder,
    /// Roles allowed to write the field; empty means read-only.
    pub writable_by: &'static [CallerRole],
}

const ANY_ROLE: &[CallerRole] = &[CallerRole::Owner, CallerRole::Permissioned];
const OWNER_ONLY: &[CallerRole] = &[CallerRole::Owner];
const READ_ONLY: &[CallerRole] = &[];

const fn shared(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        merge: MergeOrder::PermissionedFirst,
        writable_by: ANY_ROLE,
    }
}

pub const FIELDS: &[FieldSpec] = &[
    shared("dailyLossAutoLiq", FieldKind::Amount),
    shared("dailyProfitAutoLiq", FieldKind::Amount),
    shared("weeklyLossAutoLiq", FieldKind::Amount),
    shared("weeklyProfitAutoLiq", FieldKind::Amount),
    shared("dailyLossAlert", FieldKind::Amount),
    shared("dailyLossPercentageAlert", FieldKind::Percentage),
    shared("marginPercentageAlert", FieldKind::Percentage),
    shared("dailyLossLiqOnly", FieldKind::Amount),
    shared("dailyLossPercentageLiqOnly", FieldKind::Percentage),
    shared("marginPercentageLiqOnly", FieldKind::Percentage),
    shared("dailyLossPercentageAutoLiq", FieldKind::Percentage),
    shared("marginPercentageAutoLiq", FieldKind::Percentage),
    FieldSpec {
        name: "trailingMaxDrawdown",
        kind: FieldKind::Amount,
        merge: MergeOrder::OwnerFirst,
        writable_by: OWNER_ONLY,
    },
    FieldSpec {
        name: "trailingMaxDrawdownLimit",
        kind: FieldKind::Amount,
        merge: MergeOrder::OwnerOnly,
        writable_by: OWNER_ONLY,
    },
    FieldSpec {
        name: "trailingMaxDrawdownMode",
        kind: FieldKind::DrawdownMode,
        merge: MergeOrder::OwnerOnly,
        writable_by: OWNER_ONLY,
    },
    FieldSpec {
        name: "doNotUnlock",
        kind: FieldKind::Flag,
        merge: MergeOrder::OwnerOnly,
        writable_by: OWNER_ONLY,
    },
    FieldSpec {
        name: "changesLocked",
        kind: FieldKind::Flag,
        merge: MergeOrder::OwnerOnly,
        writable_by: READ_ONLY,
    },
    FieldSpec {
        name: "flattenTimestamp",
        kind: FieldKind::Timestamp,
        merge: MergeOrder::OwnerOnly,
        writable_by: READ_ONLY,
    },
];

/// Looks up a field by its upstream name.
pub fn field(name: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|f| f.name == name)
}

impl FieldSpec {
    pub fn is_writable_by(&self, role: CallerRole) -> bool {
        self.writable_by.contains(&role)
    }

    /// Checks a caller-supplied value against the field kind.
    pub fn validate(&self, value: &Value) -> Result<(), String> {
        match self.kind {
            FieldKind::Amount | FieldKind::Percentage => match value.as_f64() {
                Some(v) if v.is_finite() && v > 0.0 => Ok(()),
                _ => Err(format!("must be a finite positive number, got {}", value)),
            },
            FieldKind::Flag => {
                if value.is_boolean() {
                    Ok(())
                } else {
                    Err(format!("must be a boolean, got {}", value))
                }
            }
            FieldKind::DrawdownMode => serde_json::from_value::<TrailingDrawdownMode>(value.clone())
                .map(|_| ())
                .map_err(|_| format!("must be \"EOD\" or \"RealTime\", got {}", value)),
            FieldKind::Timestamp => Err("is read-only".to_string()),
        }
    }
}
