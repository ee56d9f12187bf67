//! In-memory fakes for storage traits (testing only)
//!
//! Provides `MemoryVersionLedger`, which satisfies the `VersionLedger`
//! contract without touching disk.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::schema::{Platform, VersionRecord};
use crate::storage_traits::*;

// ---------------------------------------------------------------------------
// MemoryVersionLedger
// ---------------------------------------------------------------------------

/// In-memory ledger backed by a `Vec<VersionRecord>` in append order.
#[derive(Debug, Default)]
pub struct MemoryVersionLedger {
    records: Mutex<Vec<VersionRecord>>,
}

impl MemoryVersionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of appended records across all platforms.
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl VersionLedger for MemoryVersionLedger {
    async fn append(&self, record: VersionRecord) -> StorageResult<()> {
        let mut records = self.records.lock().unwrap();
        records.push(record);
        Ok(())
    }

    async fn history(&self, platform: Platform) -> StorageResult<Vec<VersionRecord>> {
        let records = self.records.lock().unwrap();
        Ok(newest_first(
            records.iter().filter(|r| r.platform == platform).cloned(),
        ))
    }
}
