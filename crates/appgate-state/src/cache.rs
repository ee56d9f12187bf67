//! In-memory snapshot cache with per-entry TTL.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::schema::PlatformSnapshot;
use crate::storage_traits::SnapshotCache;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Arc<PlatformSnapshot>,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.expires_at
            .map(|deadline| Instant::now() >= deadline)
            .unwrap_or(false)
    }
}

/// Hit/miss counters for an [`InMemorySnapshotCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStatistics {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Process-local [`SnapshotCache`].
///
/// Cloning shares the underlying store.
#[derive(Debug, Clone, Default)]
pub struct InMemorySnapshotCache {
    store: Arc<RwLock<HashMap<String, CacheEntry>>>,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl InMemorySnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every expired entry.
    pub async fn cleanup_expired(&self) {
        let mut store = self.store.write().await;
        store.retain(|_, entry| !entry.is_expired());
    }

    pub async fn statistics(&self) -> CacheStatistics {
        let store = self.store.read().await;
        CacheStatistics {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: store.len(),
        }
    }
}

#[async_trait]
impl SnapshotCache for InMemorySnapshotCache {
    async fn get(&self, key: &str) -> Option<Arc<PlatformSnapshot>> {
        let store = self.store.read().await;
        match store.get(key) {
            Some(entry) if !entry.is_expired() => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(&entry.value))
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    async fn set(&self, key: &str, value: Arc<PlatformSnapshot>, ttl: Option<Duration>) {
        let entry = CacheEntry {
            value,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        };
        let mut store = self.store.write().await;
        store.insert(key.to_string(), entry);
    }

    async fn delete(&self, key: &str) {
        let mut store = self.store.write().await;
        store.remove(key);
    }
}
