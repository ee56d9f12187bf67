//! Appgate-State: version configuration persistence for the mobile app gate
//!
//! This crate owns the configuration side of the gate: the records that say
//! which app versions exist per platform, when each stops being supported,
//! and which one is the latest release.
//!
//! ## Layer 0 - Data/Persistence
//!
//! Focus: append-only history, cached snapshots, single-latest invariant.
//!
//! ## Key Components
//!
//! - `VersionRecord` / `PlatformSnapshot`: configuration schema
//! - `AppVersion`: parsed, ordered version strings
//! - `AppVersionConfig`: cached read path and invariant-enforcing write path
//! - `FileVersionLedger`: JSON-lines ledger on disk

mod cache;
mod error;
pub mod fakes;
mod file_ledger;
mod provider;
mod schema;
pub mod storage_traits;
pub mod version;

pub use cache::{CacheStatistics, InMemorySnapshotCache};
pub use error::{StateError, StorageError};
pub use file_ledger::FileVersionLedger;
pub use provider::{AppVersionConfig, DEFAULT_CACHE_TIMEOUT};
pub use schema::{MobileApiConfig, Platform, PlatformSnapshot, VersionRecord};
pub use storage_traits::{SnapshotCache, StorageResult, VersionLedger};
pub use version::{AppVersion, ParseError};

/// Result type for ledger setup operations
pub type Result<T> = std::result::Result<T, StateError>;
