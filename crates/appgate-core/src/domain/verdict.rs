//! Serializable outcome of a gate evaluation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use appgate_state::{ParseError, Platform};

use crate::domain::evaluation::EvaluationContext;
use crate::middleware::{LATEST_VERSION_HEADER, UPGRADE_DEADLINE_HEADER};

/// Header timestamp layout, e.g. `9000-01-01 00:00:00+00:00`.
pub const UPGRADE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

/// What the gate decided for one client version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateVerdict {
    pub platform: Platform,
    pub version: String,
    pub min_supported_version: Option<String>,
    pub is_latest: bool,
    /// Latest configured version, present only when newer than `version`.
    pub newer_latest_version: Option<String>,
    pub upgrade_date: Option<DateTime<Utc>>,
    pub outdated: bool,
}

impl GateVerdict {
    pub fn from_context(ctx: &EvaluationContext) -> Result<Self, ParseError> {
        Ok(Self {
            platform: ctx.platform(),
            version: ctx.version().to_string(),
            min_supported_version: ctx.min_supported_version().map(|r| r.version.clone()),
            is_latest: ctx.is_latest_version(),
            newer_latest_version: ctx.newer_latest_version()?.map(str::to_string),
            upgrade_date: ctx.upgrade_date(),
            outdated: ctx.is_outdated_version(),
        })
    }

    /// HTTP status the gate imposes: 426 when outdated, otherwise 200.
    pub fn status(&self) -> http::StatusCode {
        if self.outdated {
            http::StatusCode::UPGRADE_REQUIRED
        } else {
            http::StatusCode::OK
        }
    }

    /// Upgrade deadline to advertise. Suppressed once the client is outdated
    /// and when the client already runs the minimum supported version.
    pub fn advertised_upgrade_date(&self) -> Option<DateTime<Utc>> {
        if self.outdated {
            return None;
        }
        if self.min_supported_version.as_deref() == Some(self.version.as_str()) {
            return None;
        }
        self.upgrade_date
    }

    /// Response headers to add for a request that was not blocked.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = Vec::new();
        if let Some(latest) = &self.newer_latest_version {
            headers.push((LATEST_VERSION_HEADER, latest.clone()));
        }
        if let Some(deadline) = self.advertised_upgrade_date() {
            headers.push((
                UPGRADE_DEADLINE_HEADER,
                deadline.format(UPGRADE_DATE_FORMAT).to_string(),
            ));
        }
        headers
    }
}
