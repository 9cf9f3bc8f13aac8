//! Domain models for accounts and auto-liquidation settings.

mod account;
mod autoliq;
mod role;

pub use account::Account;
pub use autoliq::{AutoLiqSettings, OwnerAutoLiq, PermissionedAutoLiq, TrailingDrawdownMode};
pub use role::CallerRole;
