//! Request-scoped evaluation of a client's app version.
//!
//! An [`EvaluationContext`] is built once per request from the detected
//! platform/version and the platform's current snapshot. It never mutates
//! configuration, and its queries are pure: the wall clock is captured at
//! construction so repeated calls agree.
//!
//! # Clock comparison
//!
//! Deadlines are compared as naive timestamps: the local wall clock against
//! the UTC value of `expire_at` with its offset dropped. On hosts whose local
//! zone is not UTC the effective deadline shifts by the zone offset.

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDateTime, Utc};

use appgate_state::{AppVersion, ParseError, Platform, PlatformSnapshot, VersionRecord};

use crate::platform::DetectedPlatform;
use crate::resolver::min_supported_version;

/// A client's version evaluated against one platform snapshot.
#[derive(Debug, Clone)]
pub struct EvaluationContext {
    platform: Platform,
    version: String,
    parsed_version: AppVersion,
    snapshot: Arc<PlatformSnapshot>,
    min_supported_version: Option<VersionRecord>,
    now: NaiveDateTime,
}

impl EvaluationContext {
    /// Build a context using the current local wall clock.
    pub fn new(
        platform: Platform,
        version: impl Into<String>,
        snapshot: Arc<PlatformSnapshot>,
    ) -> Result<Self, ParseError> {
        Self::at(platform, version, snapshot, Local::now().naive_local())
    }

    /// Build a context evaluated at a fixed naive instant.
    pub fn at(
        platform: Platform,
        version: impl Into<String>,
        snapshot: Arc<PlatformSnapshot>,
        now: NaiveDateTime,
    ) -> Result<Self, ParseError> {
        let version = version.into();
        let parsed_version: AppVersion = version.parse()?;
        let min_supported_version =
            min_supported_version(&parsed_version, &snapshot)?.cloned();

        Ok(Self {
            platform,
            version,
            parsed_version,
            snapshot,
            min_supported_version,
            now,
        })
    }

    pub fn from_detected(
        detected: DetectedPlatform,
        snapshot: Arc<PlatformSnapshot>,
    ) -> Result<Self, ParseError> {
        Self::new(detected.platform, detected.version, snapshot)
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn parsed_version(&self) -> &AppVersion {
        &self.parsed_version
    }

    pub fn snapshot(&self) -> &PlatformSnapshot {
        &self.snapshot
    }

    pub fn min_supported_version(&self) -> Option<&VersionRecord> {
        self.min_supported_version.as_ref()
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    /// Whether the client's version is configured and flagged latest.
    pub fn is_latest_version(&self) -> bool {
        self.snapshot
            .get(&self.version)
            .map(|r| r.is_latest)
            .unwrap_or(false)
    }

    /// The platform's latest version string, if one is flagged.
    pub fn latest_version(&self) -> Option<&str> {
        self.snapshot.latest_version()
    }

    /// The latest version, only when it is strictly newer than the client's.
    pub fn newer_latest_version(&self) -> Result<Option<&str>, ParseError> {
        let Some(latest) = self.latest_version() else {
            return Ok(None);
        };
        if latest.parse::<AppVersion>()? > self.parsed_version {
            Ok(Some(latest))
        } else {
            Ok(None)
        }
    }

    /// Deadline by which the client must upgrade, if any.
    pub fn upgrade_date(&self) -> Option<DateTime<Utc>> {
        let own = self.snapshot.get(&self.version);
        match (own, &self.min_supported_version) {
            (Some(own), None) => own.expire_at,
            (Some(own), Some(min)) => match own.expire_at {
                Some(_) if self.version == min.version => own.expire_at,
                Some(deadline) if self.now >= deadline.naive_utc() => min.expire_at,
                Some(deadline) => Some(deadline),
                None => min.expire_at,
            },
            (None, Some(min)) if min.version != self.version => min.expire_at,
            _ => None,
        }
    }

    /// Whether the upgrade deadline has already passed.
    pub fn is_outdated_version(&self) -> bool {
        self.upgrade_date()
            .map(|deadline| self.now > deadline.naive_utc())
            .unwrap_or(false)
    }
}
