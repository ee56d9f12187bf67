//! Structured observability hooks for gate decisions.
//!
//! This module provides:
//! - Request-scoped tracing spans via the `GateSpan` RAII guard
//! - Emission functions for evaluation, blocking and header events
//!
//! Events are emitted at `info!` level unless noted (filter via `APPGATE_LOG`).
//! For JSON output, set `APPGATE_LOG_FORMAT=json`.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use appgate_state::Platform;

/// RAII guard that enters a span tagged with the client platform and version.
///
/// # Example
///
/// ```ignore
/// let _span = GateSpan::enter(Platform::Ios, "2.2.2");
/// // every event below is associated with platform = ios, version = 2.2.2
/// ```
pub struct GateSpan {
    _span: tracing::span::EnteredSpan,
}

impl GateSpan {
    pub fn enter(platform: Platform, version: &str) -> Self {
        let span = tracing::info_span!("appgate.request", platform = platform.key(), version = %version);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: a mobile request was evaluated.
pub fn emit_gate_evaluated(
    platform: Platform,
    version: &str,
    outdated: bool,
    upgrade_date: Option<DateTime<Utc>>,
) {
    info!(
        event = "gate.evaluated",
        platform = platform.key(),
        version = %version,
        outdated = outdated,
        upgrade_date = ?upgrade_date,
    );
}

/// Emit event: a request was rejected with 426 Upgrade Required (warning level).
pub fn emit_request_blocked(platform: Platform, version: &str) {
    warn!(event = "gate.blocked", platform = platform.key(), version = %version);
}

/// Emit event: upgrade headers were attached to a response (debug level).
pub fn emit_headers_applied(platform: Platform, version: &str, count: usize) {
    debug!(
        event = "gate.headers_applied",
        platform = platform.key(),
        version = %version,
        count = count,
    );
}

/// Emit event: a request on a mobile path carried no recognisable app user agent.
pub fn emit_unrecognized_user_agent(user_agent: &str) {
    debug!(event = "gate.unrecognized_user_agent", user_agent = %user_agent);
}
