//! Storage trait definitions for app version configuration
//!
//! These traits define the storage abstractions the gate reads through:
//! - `VersionLedger`: append-only history of `VersionRecord`s per platform
//! - `SnapshotCache`: keyed cache of assembled `PlatformSnapshot`s
//!
//! Both traits are async and backend-agnostic. In-memory fakes are provided
//! via the `fakes` module; `FileVersionLedger` persists to disk.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::schema::{Platform, PlatformSnapshot, VersionRecord};

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

// ---------------------------------------------------------------------------
// VersionLedger - Version Record Persistence
// ---------------------------------------------------------------------------

/// Append-only store of version records.
///
/// Guarantees:
/// - `append` never rewrites an earlier record.
/// - `history` returns every record for the platform, newest first
///   (by `change_date`, ties broken by append order).
#[async_trait]
pub trait VersionLedger: Send + Sync {
    /// Persist a record as the newest entry.
    async fn append(&self, record: VersionRecord) -> StorageResult<()>;

    /// All records for `platform`, newest first.
    async fn history(&self, platform: Platform) -> StorageResult<Vec<VersionRecord>>;
}

/// Order records newest first; among equal `change_date`s the later append wins.
pub(crate) fn newest_first<I>(append_order: I) -> Vec<VersionRecord>
where
    I: DoubleEndedIterator<Item = VersionRecord>,
{
    let mut history: Vec<VersionRecord> = append_order.rev().collect();
    history.sort_by(|a, b| b.change_date.cmp(&a.change_date));
    history
}

// ---------------------------------------------------------------------------
// SnapshotCache - Assembled Snapshot Cache
// ---------------------------------------------------------------------------

/// Cache of immutable snapshots.
///
/// Guarantees:
/// - `get` after `set` returns the same `Arc` until the TTL elapses or the
///   key is deleted.
/// - `delete` of an absent key is a no-op.
#[async_trait]
pub trait SnapshotCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<Arc<PlatformSnapshot>>;

    /// Store a value; `ttl = None` keeps it until deleted.
    async fn set(&self, key: &str, value: Arc<PlatformSnapshot>, ttl: Option<Duration>);

    async fn delete(&self, key: &str);
}
