//! Short-lived cache of reconciled settings.
//!
//! Entries only save upstream round trips; dropping any of them never
//! changes what callers see beyond latency.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::AutoLiqSettings;

struct CacheEntry {
    settings: Option<AutoLiqSettings>,
    stored_at: Instant,
}

#[derive(Default)]
struct Entries {
    reads: HashMap<i64, CacheEntry>,
    /// Bumped on every invalidation. A read may only be stored under the
    /// generation it started in.
    generations: HashMap<i64, u64>,
}

impl Entries {
    fn generation(&self, account_id: i64) -> u64 {
        self.generations.get(&account_id).copied().unwrap_or(0)
    }
}

/// A live cache entry as reported by [`SettingsCache::snapshot`].
#[derive(Debug, Clone, PartialEq)]
pub struct CachedRead {
    pub account_id: i64,
    pub settings: Option<AutoLiqSettings>,
    pub age: Duration,
    pub expires_in: Duration,
}

/// Per-session settings cache keyed by account id.
pub struct SettingsCache {
    ttl: Duration,
    entries: RwLock<Entries>,
}

impl SettingsCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(Entries::default()),
        }
    }

    /// Returns a fresh entry. The outer `Option` is the hit/miss, the inner
    /// one is "no settings configured".
    pub async fn get(&self, account_id: i64) -> Option<Option<AutoLiqSettings>> {
        let entries = self.entries.read().await;
        entries
            .reads
            .get(&account_id)
            .filter(|e| e.stored_at.elapsed() < self.ttl)
            .map(|e| e.settings.clone())
    }

    /// Current generation for `account_id`; pass it back to [`insert`](Self::insert).
    pub async fn generation(&self, account_id: i64) -> u64 {
        self.entries.read().await.generation(account_id)
    }

    /// Stores a read taken at `generation`. Returns false, storing nothing,
    /// when the account was invalidated after that read began.
    pub async fn insert(
        &self,
        account_id: i64,
        generation: u64,
        settings: Option<AutoLiqSettings>,
    ) -> bool {
        let mut entries = self.entries.write().await;
        if entries.generation(account_id) != generation {
            debug!(account_id, generation, "discarding read that predates a write");
            return false;
        }

        let ttl = self.ttl;
        entries.reads.retain(|_, e| e.stored_at.elapsed() < ttl);
        entries.reads.insert(
            account_id,
            CacheEntry {
                settings,
                stored_at: Instant::now(),
            },
        );
        true
    }

    pub async fn invalidate(&self, account_id: i64) {
        let mut entries = self.entries.write().await;
        *entries.generations.entry(account_id).or_insert(0) += 1;
        if entries.reads.remove(&account_id).is_some() {
            debug!(account_id, "settings cache entry invalidated");
        }
    }

    /// Number of entries that have not expired.
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries
            .reads
            .values()
            .filter(|e| e.stored_at.elapsed() < self.ttl)
            .count()
    }

    /// Live entries ordered by account id.
    pub async fn snapshot(&self) -> Vec<CachedRead> {
        let entries = self.entries.read().await;
        let mut reads: Vec<CachedRead> = entries
            .reads
            .iter()
            .filter_map(|(&account_id, e)| {
                let age = e.stored_at.elapsed();
                let expires_in = self.ttl.checked_sub(age).filter(|d| !d.is_zero())?;
                Some(CachedRead {
                    account_id,
                    settings: e.settings.clone(),
                    age,
                    expires_in,
                })
            })
            .collect();
        reads.sort_by_key(|r| r.account_id);
        reads
    }
}
