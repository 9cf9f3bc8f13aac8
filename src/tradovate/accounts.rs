//! Account queries.

use crate::domain::Account;

use super::{Result, Upstream};

/// Fetches every account visible to the connection.
pub async fn list_accounts(upstream: &dyn Upstream) -> Result<Vec<Account>> {
    let body = upstream.get("/account/list", &[]).await?;
    Ok(serde_json::from_value(body)?)
}

/// Fetches a single account by id.
pub async fn get_account(upstream: &dyn Upstream, id: i64) -> Result<Account> {
    let body = upstream.get("/account/item", &[("id", id.to_string())]).await?;
    Ok(serde_json::from_value(body)?)
}
