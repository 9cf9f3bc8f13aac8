//! One-shot command line mode.
//!
//! Lists the caller's accounts, prints the reconciled auto-liq settings and,
//! unless `--view` is given, applies daily loss/profit limits.

use std::fmt::Write as _;
use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::info;

use crate::domain::{Account, AutoLiqSettings, CallerRole, TrailingDrawdownMode};
use crate::risk::{Reconciler, RiskError};
use crate::tradovate::{ClientError, Upstream, list_accounts};

pub const USAGE: &str = "\
Tradovate risk manager

Usage:
  tradovate-risk --daily-loss=<amount> --daily-profit=<amount> [options]
  tradovate-risk --view [--account-id=<id>]
  tradovate-risk [--config=<path>]        run the HTTP API

Options:
  --daily-loss=<n>     Daily loss that triggers auto-liquidation
  --daily-profit=<n>   Daily profit target that triggers auto-liquidation
  --account-id=<id>    Target one account (default: every active account)
  --no-lock            Let the account reopen after a trigger
  --permissioned       Write as a permissioned user instead of the owner
  --view               Print current settings without changing them
  --config=<path>      Config file (default: configs/config.yaml)
  --help               Show this message

Environment:
  TRADOVATE_ACCESS_TOKEN   bearer token used for every call
  TRADOVATE_ENV            live | demo
";

const CLI_FLAGS: &[&str] = &[
    "--view",
    "--help",
    "--no-lock",
    "--permissioned",
    "--daily-loss",
    "--daily-profit",
    "--account-id",
];

/// CLI errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("TRADOVATE_ACCESS_TOKEN is not set")]
    MissingToken,

    #[error("account id {0} not found")]
    AccountNotFound(i64),

    #[error("no active accounts found")]
    NoActiveAccounts,

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Risk(#[from] RiskError),
}

pub type Result<T> = std::result::Result<T, CliError>;

/// Parsed command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    pub view: bool,
    pub help: bool,
    pub daily_loss: Option<Decimal>,
    pub daily_profit: Option<Decimal>,
    pub account_id: Option<i64>,
    pub no_lock: bool,
    pub permissioned: bool,
}

impl CliArgs {
    pub fn role(&self) -> CallerRole {
        if self.permissioned {
            CallerRole::Permissioned
        } else {
            CallerRole::Owner
        }
    }

    /// Fields written to every targeted account.
    fn write_request(&self) -> Option<Map<String, Value>> {
        if self.view {
            return None;
        }
        let (loss, profit) = (self.daily_loss?, self.daily_profit?);

        let mut fields = Map::new();
        fields.insert("dailyLossAutoLiq".to_string(), json!(loss.to_f64()));
        fields.insert("dailyProfitAutoLiq".to_string(), json!(profit.to_f64()));
        fields.insert("doNotUnlock".to_string(), json!(!self.no_lock));
        Some(fields)
    }
}

/// Returns true when the arguments ask for CLI mode rather than the server.
pub fn is_cli_invocation(args: &[String]) -> bool {
    args.iter().any(|arg| {
        let name = arg.split('=').next().unwrap_or(arg);
        CLI_FLAGS.contains(&name)
    })
}

/// Parses `--flag` and `--flag=value` arguments (program name excluded).
pub fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut parsed = CliArgs::default();

    for arg in args {
        let (name, value) = match arg.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (arg.as_str(), None),
        };

        match (name, value) {
            ("--view", None) => parsed.view = true,
            ("--help", None) => parsed.help = true,
            ("--no-lock", None) => parsed.no_lock = true,
            ("--permissioned", None) => parsed.permissioned = true,
            ("--daily-loss", Some(v)) => parsed.daily_loss = Some(parse_amount(name, v)?),
            ("--daily-profit", Some(v)) => parsed.daily_profit = Some(parse_amount(name, v)?),
            ("--account-id", Some(v)) => {
                let id = v
                    .trim()
                    .parse()
                    .map_err(|_| CliError::InvalidArgument(format!("--account-id must be an integer, got {:?}", v)))?;
                parsed.account_id = Some(id);
            }
            ("--config", Some(_)) => {}
            _ => return Err(CliError::InvalidArgument(format!("unknown argument: {}", arg))),
        }
    }

    if !parsed.help && !parsed.view && (parsed.daily_loss.is_none() || parsed.daily_profit.is_none()) {
        return Err(CliError::InvalidArgument(
            "--daily-loss and --daily-profit are required (or use --view)".to_string(),
        ));
    }

    Ok(parsed)
}

fn parse_amount(flag: &str, raw: &str) -> Result<Decimal> {
    match raw.trim().parse::<Decimal>() {
        Ok(v) if v > Decimal::ZERO => Ok(v),
        _ => Err(CliError::InvalidArgument(format!(
            "{} must be a positive number, got {:?}",
            flag, raw
        ))),
    }
}

/// What happened to one account.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountReport {
    pub account: Account,
    pub current: Option<AutoLiqSettings>,
    pub updated: Option<AutoLiqSettings>,
}

/// Result of a whole CLI run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub accounts: Vec<Account>,
    pub targets: Vec<AccountReport>,
}

/// Runs the CLI flow against `upstream`.
pub async fn run(args: &CliArgs, upstream: Arc<dyn Upstream>) -> Result<RunReport> {
    let accounts = list_accounts(upstream.as_ref()).await?;
    info!(count = accounts.len(), "Fetched accounts");

    let targets: Vec<Account> = match args.account_id {
        Some(id) => accounts.iter().filter(|a| a.id == id).cloned().collect(),
        None => accounts.iter().filter(|a| a.active).cloned().collect(),
    };
    if targets.is_empty() {
        return Err(match args.account_id {
            Some(id) => CliError::AccountNotFound(id),
            None => CliError::NoActiveAccounts,
        });
    }

    let reconciler = Reconciler::new(upstream);
    let request = args.write_request();
    let mut reports = Vec::with_capacity(targets.len());

    for account in targets {
        let current = reconciler.get_settings(account.id).await?;

        let updated = match &request {
            Some(fields) => {
                info!(account_id = account.id, role = %args.role(), "Applying daily limits");
                Some(reconciler.set_settings(account.id, fields, args.role()).await?)
            }
            None => None,
        };

        reports.push(AccountReport {
            account,
            current,
            updated,
        });
    }

    Ok(RunReport {
        accounts,
        targets: reports,
    })
}

/// Renders settings as an indented block.
pub fn format_settings(settings: Option<&AutoLiqSettings>) -> String {
    let Some(s) = settings else {
        return "  No auto-liquidation settings configured.\n".to_string();
    };

    let money = |v: Option<Decimal>| v.map_or_else(|| "not set".to_string(), |v| format!("${}", v.normalize()));
    let percent = |v: Option<Decimal>| v.map_or_else(|| "not set".to_string(), |v| format!("{}%", v.normalize()));
    let flag = |v: Option<bool>| v.map_or_else(|| "not set".to_string(), |v| if v { "yes" } else { "no" }.to_string());
    let id = |v: Option<i64>| v.map_or_else(|| "-".to_string(), |v| v.to_string());

    let rows = [
        ("Owner record", id(s.owner_id)),
        ("Permissioned record", id(s.permissioned_id)),
        ("Daily loss auto-liq", money(s.daily_loss_auto_liq)),
        ("Daily profit auto-liq", money(s.daily_profit_auto_liq)),
        ("Weekly loss auto-liq", money(s.weekly_loss_auto_liq)),
        ("Weekly profit auto-liq", money(s.weekly_profit_auto_liq)),
        ("Daily loss alert", money(s.daily_loss_alert)),
        ("Margin alert", percent(s.margin_percentage_alert)),
        ("Trailing max drawdown", money(s.trailing_max_drawdown)),
        ("Drawdown limit", money(s.trailing_max_drawdown_limit)),
        (
            "Drawdown mode",
            s.trailing_max_drawdown_mode
                .map_or_else(|| "not set".to_string(), |m| match m {
                    TrailingDrawdownMode::EndOfDay => "EOD".to_string(),
                    TrailingDrawdownMode::RealTime => "RealTime".to_string(),
                }),
        ),
        (
            "Flatten timestamp",
            s.flatten_timestamp
                .map_or_else(|| "not set".to_string(), |t| t.to_rfc3339()),
        ),
        ("Do not unlock", flag(s.do_not_unlock)),
        ("Changes locked", flag(s.changes_locked)),
    ];

    let mut out = String::new();
    for (label, value) in rows {
        let _ = writeln!(out, "  {:<24}{}", format!("{}:", label), value);
    }
    out
}

/// Renders a whole run for the terminal.
pub fn format_report(report: &RunReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Found {} account(s):", report.accounts.len());
    for a in &report.accounts {
        let _ = writeln!(out, "  [{}] {} ({}, active={})", a.id, a.name, a.account_type, a.active);
    }

    let rule = "=".repeat(60);
    for target in &report.targets {
        let _ = writeln!(out, "\n{}\nAccount: {} (ID: {})\n{}", rule, target.account.name, target.account.id, rule);
        let _ = writeln!(out, "\nCurrent auto-liq settings:");
        out.push_str(&format_settings(target.current.as_ref()));
        if let Some(updated) = &target.updated {
            let _ = writeln!(out, "\nUpdated auto-liq settings:");
            out.push_str(&format_settings(Some(updated)));
        }
    }
    out
}
