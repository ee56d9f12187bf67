//! AppVersionConfig read/write semantics: caching, invalidation, and the
//! single-latest-per-platform invariant.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use appgate_state::fakes::MemoryVersionLedger;
use appgate_state::{
    AppVersionConfig, FileVersionLedger, InMemorySnapshotCache, Platform, PlatformSnapshot,
    StorageError, StorageResult, VersionLedger, VersionRecord,
};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};

fn provider() -> AppVersionConfig<MemoryVersionLedger, InMemorySnapshotCache> {
    AppVersionConfig::new(MemoryVersionLedger::new(), InMemorySnapshotCache::new())
}

#[test]
fn cache_key_is_platform_scoped() {
    assert_eq!(
        AppVersionConfig::<MemoryVersionLedger, InMemorySnapshotCache>::cache_key_name(
            Platform::Ios
        ),
        "configuration/AppVersionConfig/current/ios"
    );
}

#[tokio::test]
async fn empty_configuration_yields_empty_snapshot() {
    let config = provider();
    let snapshot = config.get_all_versions(Platform::Ios).await.unwrap();
    assert!(snapshot.is_empty());
    assert_eq!(snapshot.platform(), Platform::Ios);
}

#[tokio::test]
async fn snapshot_is_cached_after_first_load() {
    let config = provider();
    config
        .save(VersionRecord::new(Platform::Ios, "1.1.1"))
        .await
        .unwrap();

    let first = config.get_all_versions(Platform::Ios).await.unwrap();
    let second = config.get_all_versions(Platform::Ios).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let stats = config.cache().statistics().await;
    assert_eq!(stats.hits, 1);
}

#[tokio::test]
async fn save_evicts_only_its_platform() {
    let config = provider();
    config
        .save(VersionRecord::new(Platform::Ios, "1.1.1"))
        .await
        .unwrap();
    config
        .save(VersionRecord::new(Platform::Android, "1.1.1"))
        .await
        .unwrap();

    let ios_before = config.get_all_versions(Platform::Ios).await.unwrap();
    let android_before = config.get_all_versions(Platform::Android).await.unwrap();

    config
        .save(VersionRecord::new(Platform::Ios, "2.2.2"))
        .await
        .unwrap();

    let ios_after = config.get_all_versions(Platform::Ios).await.unwrap();
    let android_after = config.get_all_versions(Platform::Android).await.unwrap();

    assert!(!Arc::ptr_eq(&ios_before, &ios_after));
    assert!(ios_after.contains("2.2.2"));
    assert!(Arc::ptr_eq(&android_before, &android_after));
}

#[tokio::test]
async fn saving_latest_demotes_previous_latest() {
    let config = provider();
    config
        .save(VersionRecord::new(Platform::Android, "5.0.0").with_latest(true))
        .await
        .unwrap();
    config
        .save(VersionRecord::new(Platform::Android, "6.6.6").with_latest(true))
        .await
        .unwrap();

    let snapshot = config.get_all_versions(Platform::Android).await.unwrap();
    assert_eq!(snapshot.latest_version(), Some("6.6.6"));
    assert!(!snapshot.get("5.0.0").unwrap().is_latest);
    assert_eq!(snapshot.iter().filter(|r| r.is_latest).count(), 1);
}

#[tokio::test]
async fn demotion_preserves_expire_at() {
    let config = provider();
    let deadline = Utc.with_ymd_and_hms(2030, 6, 1, 0, 0, 0).unwrap();
    config
        .save(
            VersionRecord::new(Platform::Ios, "5.0.0")
                .with_expire_at(deadline)
                .with_latest(true),
        )
        .await
        .unwrap();
    config
        .save(VersionRecord::new(Platform::Ios, "6.0.0").with_latest(true))
        .await
        .unwrap();

    let snapshot = config.get_all_versions(Platform::Ios).await.unwrap();
    assert_eq!(snapshot.get("5.0.0").unwrap().expire_at, Some(deadline));
}

#[tokio::test]
async fn resaving_a_version_overrides_it() {
    let config = provider();
    config
        .save(VersionRecord::new(Platform::Ios, "2.2.2"))
        .await
        .unwrap();
    let deadline = Utc.with_ymd_and_hms(2014, 1, 1, 0, 0, 0).unwrap();
    config
        .save(VersionRecord::new(Platform::Ios, "2.2.2").with_expire_at(deadline))
        .await
        .unwrap();

    let snapshot = config.get_all_versions(Platform::Ios).await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.get("2.2.2").unwrap().expire_at, Some(deadline));
    assert_eq!(config.history(Platform::Ios).await.unwrap().len(), 2);
}

#[tokio::test]
async fn resaving_latest_version_keeps_it_latest() {
    let config = provider();
    config
        .save(VersionRecord::new(Platform::Ios, "6.6.6").with_latest(true))
        .await
        .unwrap();
    config
        .save(VersionRecord::new(Platform::Ios, "6.6.6").with_latest(true))
        .await
        .unwrap();

    let snapshot = config.get_all_versions(Platform::Ios).await.unwrap();
    assert_eq!(snapshot.latest_version(), Some("6.6.6"));
}

#[tokio::test]
async fn save_rejects_malformed_version() {
    let config = provider();
    let err = config
        .save(VersionRecord::new(Platform::Ios, "one.two.three"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::InvalidVersion { .. }));
    assert!(config.ledger().is_empty());
}

#[tokio::test]
async fn save_assigns_fresh_identity() {
    let config = provider();
    let draft = VersionRecord::new(Platform::Ios, "1.0.0");
    let stored = config.save(draft.clone()).await.unwrap();
    assert_ne!(stored.record_id, draft.record_id);
    assert!(stored.change_date >= draft.change_date);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_latest_saves_leave_one_latest() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = FileVersionLedger::open(dir.path().join("versions.jsonl"))
        .await
        .unwrap();
    let config = Arc::new(AppVersionConfig::new(ledger, InMemorySnapshotCache::new()));
    config
        .save(VersionRecord::new(Platform::Ios, "6.6.6").with_latest(true))
        .await
        .unwrap();

    for _ in 0..20 {
        let a = Arc::clone(&config);
        let b = Arc::clone(&config);
        let first = tokio::spawn(async move {
            a.save(VersionRecord::new(Platform::Ios, "7.0.0").with_latest(true))
                .await
        });
        let second = tokio::spawn(async move {
            b.save(VersionRecord::new(Platform::Ios, "8.0.0").with_latest(true))
                .await
        });
        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        let history = config.history(Platform::Ios).await.unwrap();
        let current = PlatformSnapshot::from_history(Platform::Ios, history);
        assert_eq!(current.iter().filter(|r| r.is_latest).count(), 1);
    }
}

/// Ledger whose `fail_on`-th append (1-based) fails.
struct FailingLedger {
    inner: MemoryVersionLedger,
    appends: AtomicUsize,
    fail_on: usize,
}

#[async_trait]
impl VersionLedger for FailingLedger {
    async fn append(&self, record: VersionRecord) -> StorageResult<()> {
        let n = self.appends.fetch_add(1, Ordering::SeqCst) + 1;
        if n == self.fail_on {
            return Err(StorageError::Io(std::io::Error::other("disk full")));
        }
        self.inner.append(record).await
    }

    async fn history(&self, platform: Platform) -> StorageResult<Vec<VersionRecord>> {
        self.inner.history(platform).await
    }
}

#[tokio::test]
async fn failed_save_still_evicts_cached_snapshot() {
    // Append 1 stores 6.6.6, append 2 demotes it, append 3 (7.0.0) fails.
    let ledger = FailingLedger {
        inner: MemoryVersionLedger::new(),
        appends: AtomicUsize::new(0),
        fail_on: 3,
    };
    let config = AppVersionConfig::new(ledger, InMemorySnapshotCache::new())
        .with_cache_timeout(None);
    config
        .save(VersionRecord::new(Platform::Ios, "6.6.6").with_latest(true))
        .await
        .unwrap();
    let cached = config.get_all_versions(Platform::Ios).await.unwrap();
    assert_eq!(cached.latest_version(), Some("6.6.6"));

    let err = config
        .save(VersionRecord::new(Platform::Ios, "7.0.0").with_latest(true))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Io(_)));

    let history = config.history(Platform::Ios).await.unwrap();
    let stored = PlatformSnapshot::from_history(Platform::Ios, history);
    let served = config.get_all_versions(Platform::Ios).await.unwrap();
    assert_eq!(served.latest_version(), stored.latest_version());
    assert_eq!(served.latest_version(), None);
}
