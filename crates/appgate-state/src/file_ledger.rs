//! JSON-lines file-backed VersionLedger implementation
//!
//! Each appended record is one line of JSON. The file is never rewritten,
//! so the full change history stays available for audit.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{StateError, StorageError};
use crate::schema::{Platform, VersionRecord};
use crate::storage_traits::{newest_first, StorageResult, VersionLedger};

/// File-backed implementation of [`VersionLedger`].
#[derive(Debug)]
pub struct FileVersionLedger {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileVersionLedger {
    /// Open (creating if needed) the ledger file at `path`.
    pub async fn open(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StateError::Setup(format!("{}: {e}", parent.display())))?;
        }

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| StateError::Open(format!("{}: {e}", path.display())))?;

        info!(path = %path.display(), "FileVersionLedger opened");
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads under the write lock so a line being appended is never seen half-written.
    async fn read_all(&self) -> StorageResult<Vec<VersionRecord>> {
        let contents = {
            let _guard = self.write_lock.lock().await;
            fs::read_to_string(&self.path).await?
        };
        contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                serde_json::from_str(line).map_err(|e| StorageError::Corrupt {
                    line: idx + 1,
                    reason: e.to_string(),
                })
            })
            .collect()
    }
}

#[async_trait]
impl VersionLedger for FileVersionLedger {
    async fn append(&self, record: VersionRecord) -> StorageResult<()> {
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new().append(true).open(&self.path).await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        debug!(
            platform = record.platform.key(),
            version = %record.version,
            "version record appended"
        );
        Ok(())
    }

    async fn history(&self, platform: Platform) -> StorageResult<Vec<VersionRecord>> {
        let records = self.read_all().await?;
        Ok(newest_first(
            records.into_iter().filter(|r| r.platform == platform),
        ))
    }
}
