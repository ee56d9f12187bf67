//! Native app platform detection from `User-Agent` strings.
//!
//! Detection walks a fixed table of `(Platform, Regex)` pairs in order; the
//! first pattern that matches decides the platform and supplies the version.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use appgate_state::Platform;

/// `edX/org.edx.mobile (2.2.2; OS Version 9.2 (Build 13C75))`
pub const IOS_USER_AGENT_PATTERN: &str =
    r"\((?P<version>[0-9]+\.[0-9]+\.[0-9]+(\.[0-9a-zA-Z]*)?); OS Version [0-9.]+ \(Build [0-9a-zA-Z]*\)\)";

/// `Dalvik/2.1.0 (Linux; U; Android 5.1; Nexus 5 Build/LMY47I) edX/org.edx.mobile/2.2.2`
pub const ANDROID_USER_AGENT_PATTERN: &str = concat!(
    r"Dalvik/[.0-9]+ \(Linux; U; Android [.0-9]+; (.*) Build/[0-9a-zA-Z]*\) ",
    r"(.*)/(?P<version>[0-9]+\.[0-9]+\.[0-9]+(\.[0-9a-zA-Z]*)?)"
);

struct Matcher {
    platform: Platform,
    pattern: Regex,
}

static MATCHERS: Lazy<Vec<Matcher>> = Lazy::new(|| {
    vec![
        Matcher {
            platform: Platform::Ios,
            pattern: Regex::new(IOS_USER_AGENT_PATTERN).expect("iOS user-agent pattern compiles"),
        },
        Matcher {
            platform: Platform::Android,
            pattern: Regex::new(ANDROID_USER_AGENT_PATTERN)
                .expect("Android user-agent pattern compiles"),
        },
    ]
});

/// Platform and app version extracted from a user agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedPlatform {
    pub platform: Platform,
    pub version: String,
}

/// Identify the native app platform behind `user_agent`.
///
/// Returns `None` for anything that is not a recognised mobile app; such
/// requests are not subject to version gating.
pub fn detect(user_agent: &str) -> Option<DetectedPlatform> {
    MATCHERS.iter().find_map(|m| {
        m.pattern
            .captures(user_agent)
            .and_then(|caps| caps.name("version"))
            .map(|version| DetectedPlatform {
                platform: m.platform,
                version: version.as_str().to_string(),
            })
    })
}
