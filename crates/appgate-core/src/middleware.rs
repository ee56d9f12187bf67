//! Request/response middleware for native mobile app traffic.
//!
//! [`AppVersionUpgrade`] runs in two phases around a handler:
//! - `process_request` rejects outdated app versions with `426 Upgrade Required`;
//! - `process_response` tells supported clients about a newer release
//!   (`EDX-APP-LATEST-VERSION`) and their upgrade deadline (`EDX-APP-UPGRADE-DATE`).
//!
//! Requests that are not from the mobile app, or whose user agent matches no
//! platform, pass through untouched.

use http::header::{HeaderName, HeaderValue, USER_AGENT};
use http::{Request, Response, StatusCode};

use crate::config::GateConfig;
use crate::domain::error::Result;
use crate::domain::evaluation::EvaluationContext;
use crate::domain::verdict::GateVerdict;
use crate::metrics::METRICS;
use crate::obs::{
    emit_gate_evaluated, emit_headers_applied, emit_request_blocked, emit_unrecognized_user_agent,
    GateSpan,
};
use crate::platform;
use crate::source::VersionSource;

pub const LATEST_VERSION_HEADER: &str = "EDX-APP-LATEST-VERSION";
pub const UPGRADE_DEADLINE_HEADER: &str = "EDX-APP-UPGRADE-DATE";

/// Version gate over a [`VersionSource`].
pub struct AppVersionUpgrade<S> {
    source: S,
    config: GateConfig,
}

impl<S> AppVersionUpgrade<S>
where
    S: VersionSource,
{
    pub fn new(source: S, config: GateConfig) -> Self {
        Self { source, config }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Whether `req` is native app traffic: a configured mobile API path, or
    /// a user agent that matches one of the platform patterns.
    pub fn is_request_from_mobile_app<B>(&self, req: &Request<B>) -> bool {
        self.config.is_mobile_path(req.uri().path())
            || user_agent(req).and_then(platform::detect).is_some()
    }

    /// Evaluate a raw user agent. `None` when no platform matches.
    ///
    /// Does not touch request counters; see [`Self::check_request`].
    pub async fn evaluate(&self, user_agent: &str) -> Result<Option<GateVerdict>> {
        let Some(detected) = platform::detect(user_agent) else {
            emit_unrecognized_user_agent(user_agent);
            return Ok(None);
        };

        let snapshot = self.source.get_all_versions(detected.platform).await?;

        let _span = GateSpan::enter(detected.platform, &detected.version);
        let ctx = EvaluationContext::from_detected(detected, snapshot)?;
        let verdict = GateVerdict::from_context(&ctx)?;

        emit_gate_evaluated(
            verdict.platform,
            &verdict.version,
            verdict.outdated,
            verdict.upgrade_date,
        );
        Ok(Some(verdict))
    }

    /// Gate one incoming request and record it in [`METRICS`].
    ///
    /// Returns the verdict for recognised app clients. Each request is
    /// counted exactly once: evaluated (and blocked, when outdated) or
    /// passed through.
    pub async fn check_request<B>(&self, req: &Request<B>) -> Result<Option<GateVerdict>> {
        let verdict = match self.gated_user_agent(req) {
            Some(user_agent) => self.evaluate(&user_agent).await?,
            None => None,
        };

        match &verdict {
            Some(verdict) => {
                METRICS.inc_evaluated();
                if verdict.outdated {
                    METRICS.inc_blocked();
                    emit_request_blocked(verdict.platform, &verdict.version);
                }
            }
            None => METRICS.inc_passed_through(),
        }
        Ok(verdict)
    }

    /// Returns the blocking response when the client's version is outdated.
    pub async fn process_request<B>(&self, req: &Request<B>) -> Result<Option<Response<()>>> {
        let verdict = self.check_request(req).await?;
        Ok(verdict
            .filter(|verdict| verdict.outdated)
            .map(|_| upgrade_required()))
    }

    /// Attach upgrade headers to `response` for mobile app requests.
    pub async fn process_response<B, R>(
        &self,
        req: &Request<B>,
        response: &mut Response<R>,
    ) -> Result<()> {
        let Some(user_agent) = self.gated_user_agent(req) else {
            return Ok(());
        };
        match self.evaluate(&user_agent).await? {
            Some(verdict) => apply_headers(&verdict, response),
            None => Ok(()),
        }
    }

    fn gated_user_agent<B>(&self, req: &Request<B>) -> Option<String> {
        if !self.config.enabled || !self.is_request_from_mobile_app(req) {
            return None;
        }
        user_agent(req).map(str::to_string)
    }
}

fn user_agent<B>(req: &Request<B>) -> Option<&str> {
    req.headers()
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
}

/// Insert the verdict's upgrade headers into `response`.
pub fn apply_headers<R>(verdict: &GateVerdict, response: &mut Response<R>) -> Result<()> {
    let headers = verdict.headers();
    for (name, value) in &headers {
        response.headers_mut().insert(
            HeaderName::from_bytes(name.as_bytes())?,
            HeaderValue::from_str(value)?,
        );
    }
    if !headers.is_empty() {
        emit_headers_applied(verdict.platform, &verdict.version, headers.len());
    }
    Ok(())
}

/// Empty-bodied `426 Upgrade Required`.
pub fn upgrade_required() -> Response<()> {
    let mut response = Response::new(());
    *response.status_mut() = StatusCode::UPGRADE_REQUIRED;
    response
}
