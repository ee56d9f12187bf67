//! Cached configuration provider for app versions.
//!
//! [`AppVersionConfig`] is the only write path for version records. Reads are
//! served from a [`SnapshotCache`]; every write for a platform evicts that
//! platform's entry so the next read rebuilds it from the ledger.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::StorageError;
use crate::schema::{Platform, PlatformSnapshot, VersionRecord};
use crate::storage_traits::{SnapshotCache, StorageResult, VersionLedger};

/// Default lifetime of a cached snapshot.
pub const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_secs(600);

/// Version configuration provider over a ledger backend and a snapshot cache.
pub struct AppVersionConfig<L, C> {
    ledger: L,
    cache: C,
    cache_timeout: Option<Duration>,
    write_lock: Mutex<()>,
}

impl<L, C> AppVersionConfig<L, C>
where
    L: VersionLedger,
    C: SnapshotCache,
{
    pub fn new(ledger: L, cache: C) -> Self {
        Self {
            ledger,
            cache,
            cache_timeout: Some(DEFAULT_CACHE_TIMEOUT),
            write_lock: Mutex::new(()),
        }
    }

    /// Override the snapshot lifetime; `None` caches until the next write.
    pub fn with_cache_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.cache_timeout = timeout;
        self
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Cache key holding the current snapshot for `platform`.
    pub fn cache_key_name(platform: Platform) -> String {
        format!("configuration/AppVersionConfig/current/{}", platform.key())
    }

    /// Current records for `platform`, keyed by version string.
    pub async fn get_all_versions(&self, platform: Platform) -> StorageResult<Arc<PlatformSnapshot>> {
        let key = Self::cache_key_name(platform);
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let snapshot = Arc::new(self.load_snapshot(platform).await?);
        self.cache
            .set(&key, Arc::clone(&snapshot), self.cache_timeout)
            .await;

        debug!(
            event = "config.snapshot_loaded",
            platform = platform.key(),
            versions = snapshot.len(),
        );
        Ok(snapshot)
    }

    /// Append `record` as a new configuration entry.
    ///
    /// The stored copy gets a fresh `record_id` and `change_date`. When the
    /// record is flagged latest, every current latest record of the platform
    /// is first re-appended with `is_latest = false`.
    ///
    /// Saves are serialized. The platform's cache entry is evicted even when
    /// an append fails partway through.
    pub async fn save(&self, record: VersionRecord) -> StorageResult<VersionRecord> {
        record
            .parsed_version()
            .map_err(|e| StorageError::InvalidVersion {
                version: record.version.clone(),
                reason: e.to_string(),
            })?;

        let platform = record.platform;
        let _guard = self.write_lock.lock().await;
        let saved = self.append_with_demotions(record).await;
        self.cache.delete(&Self::cache_key_name(platform)).await;
        let record = saved?;

        info!(
            event = "config.version_saved",
            platform = record.platform.key(),
            version = %record.version,
            is_latest = record.is_latest,
            expire_at = ?record.expire_at,
        );
        Ok(record)
    }

    /// Full change history for `platform`, newest first.
    pub async fn history(&self, platform: Platform) -> StorageResult<Vec<VersionRecord>> {
        self.ledger.history(platform).await
    }

    async fn append_with_demotions(&self, mut record: VersionRecord) -> StorageResult<VersionRecord> {
        let now = Utc::now();

        if record.is_latest {
            let current = self.load_snapshot(record.platform).await?;
            for previous in current.iter().filter(|r| r.is_latest) {
                let demoted = VersionRecord {
                    record_id: Uuid::new_v4(),
                    is_latest: false,
                    change_date: now,
                    changed_by: record.changed_by.clone(),
                    ..previous.clone()
                };
                debug!(
                    platform = record.platform.key(),
                    version = %demoted.version,
                    "demoting previous latest version"
                );
                self.ledger.append(demoted).await?;
            }
        }

        record.record_id = Uuid::new_v4();
        record.change_date = now;
        self.ledger.append(record.clone()).await?;
        Ok(record)
    }

    async fn load_snapshot(&self, platform: Platform) -> StorageResult<PlatformSnapshot> {
        let history = self.ledger.history(platform).await?;
        Ok(PlatformSnapshot::from_history(platform, history))
    }
}
