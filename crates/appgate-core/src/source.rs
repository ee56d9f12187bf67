//! Read-only seam between the gate and version configuration.

use std::sync::Arc;

use async_trait::async_trait;

use appgate_state::{
    AppVersionConfig, Platform, PlatformSnapshot, SnapshotCache, StorageResult, VersionLedger,
};

/// Supplies the current snapshot for a platform. The gate only ever reads.
#[async_trait]
pub trait VersionSource: Send + Sync {
    async fn get_all_versions(&self, platform: Platform) -> StorageResult<Arc<PlatformSnapshot>>;
}

#[async_trait]
impl<L, C> VersionSource for AppVersionConfig<L, C>
where
    L: VersionLedger,
    C: SnapshotCache,
{
    async fn get_all_versions(&self, platform: Platform) -> StorageResult<Arc<PlatformSnapshot>> {
        AppVersionConfig::get_all_versions(self, platform).await
    }
}

#[async_trait]
impl<S: VersionSource + ?Sized> VersionSource for Arc<S> {
    async fn get_all_versions(&self, platform: Platform) -> StorageResult<Arc<PlatformSnapshot>> {
        (**self).get_all_versions(platform).await
    }
}
