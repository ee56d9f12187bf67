//! Configuration records for mobile app versions.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::version::{AppVersion, ParseError};

/// Mobile operating system family of a native app client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
}

impl Platform {
    /// Every supported platform, in detection order.
    pub const ALL: [Platform; 2] = [Platform::Ios, Platform::Android];

    /// Storage key used in ledgers and cache keys.
    pub fn key(&self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Ios => write!(f, "iOS"),
            Platform::Android => write!(f, "Android"),
        }
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ios" => Ok(Platform::Ios),
            "android" => Ok(Platform::Android),
            other => Err(format!("unknown platform '{other}' (expected ios or android)")),
        }
    }
}

/// One configured app version for a platform.
///
/// Ledgers are append-only: every save produces a new record with a fresh
/// `record_id` and `change_date`, and the newest record per version string
/// wins when a [`PlatformSnapshot`] is assembled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub record_id: Uuid,
    pub platform: Platform,
    pub version: String,
    /// Last supported date; `None` means no sunset policy for this version.
    pub expire_at: Option<DateTime<Utc>>,
    pub is_latest: bool,
    pub change_date: DateTime<Utc>,
    pub changed_by: Option<String>,
}

impl VersionRecord {
    pub fn new(platform: Platform, version: impl Into<String>) -> Self {
        Self {
            record_id: Uuid::new_v4(),
            platform,
            version: version.into(),
            expire_at: None,
            is_latest: false,
            change_date: Utc::now(),
            changed_by: None,
        }
    }

    pub fn with_expire_at(mut self, expire_at: DateTime<Utc>) -> Self {
        self.expire_at = Some(expire_at);
        self
    }

    pub fn with_latest(mut self, is_latest: bool) -> Self {
        self.is_latest = is_latest;
        self
    }

    pub fn with_changed_by(mut self, who: impl Into<String>) -> Self {
        self.changed_by = Some(who.into());
        self
    }

    pub fn parsed_version(&self) -> Result<AppVersion, ParseError> {
        self.version.parse()
    }
}

/// All current version records for one platform, keyed by version string.
///
/// Immutable once built; shared between concurrent evaluations behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformSnapshot {
    platform: Platform,
    versions: BTreeMap<String, VersionRecord>,
}

impl PlatformSnapshot {
    pub fn empty(platform: Platform) -> Self {
        Self {
            platform,
            versions: BTreeMap::new(),
        }
    }

    /// Fold a newest-first history into a snapshot, keeping the first record
    /// seen for each version string. Records for other platforms are skipped.
    pub fn from_history<I>(platform: Platform, newest_first: I) -> Self
    where
        I: IntoIterator<Item = VersionRecord>,
    {
        let mut versions = BTreeMap::new();
        for record in newest_first {
            if record.platform != platform {
                continue;
            }
            versions.entry(record.version.clone()).or_insert(record);
        }
        Self { platform, versions }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn get(&self, version: &str) -> Option<&VersionRecord> {
        self.versions.get(version)
    }

    pub fn contains(&self, version: &str) -> bool {
        self.versions.contains_key(version)
    }

    /// Records ordered by version string.
    pub fn iter(&self) -> impl Iterator<Item = &VersionRecord> {
        self.versions.values()
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Version string of the record flagged as latest, if any.
    pub fn latest_version(&self) -> Option<&str> {
        self.versions
            .values()
            .find(|r| r.is_latest)
            .map(|r| r.version.as_str())
    }
}

/// Settings for the mobile API that are not tied to a platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MobileApiConfig {
    /// Comma-separated video profile names, highest priority first.
    #[serde(default)]
    pub video_profiles: String,
}

impl MobileApiConfig {
    pub fn profiles(&self) -> Vec<String> {
        self.video_profiles
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }
}
