//! Appgate Core Library
//!
//! Gates native mobile app requests on their app version: detects the
//! platform from the user agent, resolves the minimum supported version from
//! configuration, blocks outdated clients with `426 Upgrade Required`, and
//! advertises newer releases and upgrade deadlines in response headers.

pub mod config;
pub mod domain;
pub mod metrics;
pub mod middleware;
pub mod obs;
pub mod platform;
pub mod resolver;
pub mod source;
pub mod telemetry;

/// Version parsing and ordering, shared with the configuration layer.
pub mod version {
    pub use appgate_state::version::{AppVersion, ParseError};
}

pub use config::GateConfig;
pub use domain::{EvaluationContext, GateError, GateVerdict, Result};
pub use middleware::{
    apply_headers, upgrade_required, AppVersionUpgrade, LATEST_VERSION_HEADER, UPGRADE_DEADLINE_HEADER,
};
pub use platform::{detect, DetectedPlatform};
pub use resolver::min_supported_version;
pub use source::VersionSource;
pub use version::{AppVersion, ParseError};

pub use appgate_state::{
    AppVersionConfig, FileVersionLedger, InMemorySnapshotCache, Platform, PlatformSnapshot,
    VersionRecord,
};

pub use metrics::METRICS;
pub use obs::{
    emit_gate_evaluated, emit_headers_applied, emit_request_blocked,
    emit_unrecognized_user_agent, GateSpan,
};
pub use telemetry::init_tracing;

/// Appgate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
