use axum::{Json, Router, extract::Path, routing::get};
use serde::Serialize;

use super::error::Result;
use super::risk::parse_account_id;
use super::{AppState, CurrentSession};
use crate::domain::Account;
use crate::tradovate::{get_account, list_accounts};

#[derive(Serialize)]
struct AccountsResponse {
    success: bool,
    accounts: Vec<Account>,
}

#[derive(Serialize)]
struct AccountResponse {
    success: bool,
    account: Account,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(accounts))
        .route("/accounts/{account_id}", get(account))
}

/// GET /accounts
async fn accounts(CurrentSession(session): CurrentSession) -> Result<Json<AccountsResponse>> {
    let accounts = list_accounts(session.upstream()).await?;
    Ok(Json(AccountsResponse {
        success: true,
        accounts,
    }))
}

/// GET /accounts/{account_id}
async fn account(
    CurrentSession(session): CurrentSession,
    Path(account_id): Path<String>,
) -> Result<Json<AccountResponse>> {
    let account_id = parse_account_id(&account_id)?;
    let account = get_account(session.upstream(), account_id).await?;
    Ok(Json(AccountResponse {
        success: true,
        account,
    }))
}
