//! Owner/permissioned auto-liq reconciliation.

use std::sync::Arc;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use super::cache::SettingsCache;
use super::schema::{self, FIELDS, Source};
use super::{Result, RiskError};
use crate::domain::{AutoLiqSettings, CallerRole, OwnerAutoLiq, PermissionedAutoLiq};
use crate::tradovate::{ClientError, Upstream};

const OWNER_DEPS_PATH: &str = "/userAccountAutoLiq/deps";
const PERMISSIONED_DEPS_PATH: &str = "/permissionedAccountAutoLiq/deps";
const UPDATE_PATH: &str = "/userAccountAutoLiq/updateuserautoliq";

/// Body returned by the update endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateResponse {
    #[serde(default)]
    error_text: Option<String>,
    #[serde(default)]
    user_account_auto_liq: Option<OwnerAutoLiq>,
    #[serde(default)]
    permissioned_account_auto_liq: Option<PermissionedAutoLiq>,
}

/// What an update call produced.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    Owner(OwnerAutoLiq),
    Permissioned(PermissionedAutoLiq),
    Rejected(String),
    Inconsistent,
}

impl From<UpdateResponse> for WriteOutcome {
    fn from(resp: UpdateResponse) -> Self {
        if let Some(text) = resp.error_text.filter(|t| !t.trim().is_empty()) {
            return WriteOutcome::Rejected(text);
        }
        match (resp.user_account_auto_liq, resp.permissioned_account_auto_liq) {
            (Some(owner), _) => WriteOutcome::Owner(owner),
            (None, Some(perm)) => WriteOutcome::Permissioned(perm),
            (None, None) => WriteOutcome::Inconsistent,
        }
    }
}

impl WriteOutcome {
    /// Normalizes a successful write into the settings view.
    pub fn into_settings(self) -> Result<AutoLiqSettings> {
        let settings = match self {
            WriteOutcome::Owner(owner) => merge(Some(&owner), None)?,
            WriteOutcome::Permissioned(perm) => merge(None, Some(&perm))?,
            WriteOutcome::Rejected(text) => return Err(RiskError::UpstreamRejected { text }),
            WriteOutcome::Inconsistent => return Err(RiskError::UpstreamInconsistent),
        };
        settings.ok_or(RiskError::UpstreamInconsistent)
    }
}

/// Merges the two upstream records into one settings view.
///
/// Each field takes the first non-null value in its schema read order.
/// Returns `None` only when both records are absent.
pub fn merge(
    owner: Option<&OwnerAutoLiq>,
    permissioned: Option<&PermissionedAutoLiq>,
) -> Result<Option<AutoLiqSettings>> {
    if owner.is_none() && permissioned.is_none() {
        return Ok(None);
    }

    let owner_fields = owner.map(serde_json::to_value).transpose()?;
    let permissioned_fields = permissioned.map(serde_json::to_value).transpose()?;

    let mut merged = Map::new();
    for spec in FIELDS {
        let value = spec.merge.sources().iter().find_map(|source| {
            let record = match source {
                Source::Owner => owner_fields.as_ref(),
                Source::Permissioned => permissioned_fields.as_ref(),
            }?;
            record.get(spec.name).filter(|v| !v.is_null()).cloned()
        });
        if let Some(value) = value {
            merged.insert(spec.name.to_string(), value);
        }
    }

    let mut settings: AutoLiqSettings = serde_json::from_value(Value::Object(merged))?;
    settings.owner_id = owner.map(|o| o.id);
    settings.permissioned_id = permissioned.map(|p| p.id);
    Ok(Some(settings))
}

/// Keeps the fields `role` may write, then validates them.
///
/// Nulls and unknown or disallowed names are dropped quietly; an empty result
/// or a bad value is a validation error.
pub(crate) fn prepare_write(
    requested: &Map<String, Value>,
    role: CallerRole,
) -> Result<Map<String, Value>> {
    let mut fields = Map::new();
    for (name, value) in requested {
        if value.is_null() {
            continue;
        }
        match schema::field(name) {
            Some(spec) if spec.is_writable_by(role) => {
                spec.validate(value)
                    .map_err(|reason| RiskError::validation(name.as_str(), reason))?;
                fields.insert(name.clone(), value.clone());
            }
            Some(_) => debug!(field = %name, role = %role, "dropping field not writable by role"),
            None => debug!(field = %name, "dropping unknown field"),
        }
    }

    if fields.is_empty() {
        return Err(RiskError::validation(
            "settings",
            "no valid risk parameters provided",
        ));
    }
    Ok(fields)
}

async fn fetch_first<T: DeserializeOwned>(
    upstream: &dyn Upstream,
    path: &str,
    account_id: i64,
) -> Result<Option<T>> {
    let body = match upstream
        .get(path, &[("masterid", account_id.to_string())])
        .await
    {
        Ok(body) => body,
        Err(ClientError::TokenExpired { status }) => {
            debug!(path, status, account_id, "auto-liq entity not visible to caller");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    let records: Vec<T> = serde_json::from_value(body)?;
    Ok(records.into_iter().next())
}

/// A settings read and where it was answered from.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsRead {
    pub settings: Option<AutoLiqSettings>,
    pub cached: bool,
}

/// Reads and writes auto-liq settings for one authenticated caller.
pub struct Reconciler {
    upstream: Arc<dyn Upstream>,
    cache: Option<Arc<SettingsCache>>,
}

impl Reconciler {
    pub fn new(upstream: Arc<dyn Upstream>) -> Self {
        Self {
            upstream,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Arc<SettingsCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Returns the reconciled settings, or `None` when neither record exists.
    pub async fn get_settings(&self, account_id: i64) -> Result<Option<AutoLiqSettings>> {
        Ok(self.read_settings(account_id).await?.settings)
    }

    /// Like [`get_settings`](Self::get_settings), also reporting whether the
    /// answer came from the cache.
    pub async fn read_settings(&self, account_id: i64) -> Result<SettingsRead> {
        let mut generation = None;
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(account_id).await {
                debug!(account_id, "settings served from cache");
                return Ok(SettingsRead {
                    settings: hit,
                    cached: true,
                });
            }
            generation = Some(cache.generation(account_id).await);
        }

        let upstream = self.upstream.as_ref();
        let (owner, permissioned) = tokio::try_join!(
            fetch_first::<OwnerAutoLiq>(upstream, OWNER_DEPS_PATH, account_id),
            fetch_first::<PermissionedAutoLiq>(upstream, PERMISSIONED_DEPS_PATH, account_id),
        )?;

        info!(
            account_id,
            owner = owner.is_some(),
            permissioned = permissioned.is_some(),
            "fetched auto-liq records"
        );

        let settings = merge(owner.as_ref(), permissioned.as_ref())?;

        if let (Some(cache), Some(generation)) = (&self.cache, generation) {
            cache.insert(account_id, generation, settings.clone()).await;
        }
        Ok(SettingsRead {
            settings,
            cached: false,
        })
    }

    /// Writes the fields `role` may change and returns the stored view.
    ///
    /// Nothing is sent upstream when filtering or validation fails.
    pub async fn set_settings(
        &self,
        account_id: i64,
        requested: &Map<String, Value>,
        role: CallerRole,
    ) -> Result<AutoLiqSettings> {
        let fields = prepare_write(requested, role)?;
        let names: Vec<&str> = fields.keys().map(String::as_str).collect();
        info!(account_id, role = %role, fields = ?names, "updating auto-liq settings");

        let mut body = Map::new();
        body.insert("accountId".to_string(), json!(account_id));
        body.extend(fields);

        let response = self.upstream.post(UPDATE_PATH, &Value::Object(body)).await?;

        if let Some(cache) = &self.cache {
            cache.invalidate(account_id).await;
        }

        let response: UpdateResponse = serde_json::from_value(response)?;
        let outcome = WriteOutcome::from(response);
        if let WriteOutcome::Rejected(text) = &outcome {
            warn!(account_id, error = %text, "auto-liq update rejected");
        }
        outcome.into_settings()
    }
}
