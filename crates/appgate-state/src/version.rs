//! Mobile app version strings.
//!
//! An [`AppVersion`] is parsed from `major.minor.patch[.suffix]`. Ordering is
//! lexicographic over `(major, minor, patch, suffix)` with an absent suffix
//! treated as the empty string, so `1.2.3 < 1.2.3.beta < 1.2.4`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Failure to parse a version string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("version string is empty")]
    Empty,

    #[error("version '{input}' is missing its {component} component")]
    MissingComponent {
        input: String,
        component: &'static str,
    },

    #[error("version '{input}' has a non-numeric {component} component")]
    NonNumeric {
        input: String,
        component: &'static str,
    },

    #[error("version '{input}' has more than four components")]
    TooManyComponents { input: String },
}

/// Parsed `major.minor.patch[.suffix]` version.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AppVersion {
    major: u64,
    minor: u64,
    patch: u64,
    suffix: String,
}

impl AppVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            suffix: String::new(),
        }
    }

    /// Attach a fourth, free-form component (builder pattern).
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    /// Fourth component, empty when absent.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Parse `input`, returning [`ParseError`] on malformed strings.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        if input.is_empty() {
            return Err(ParseError::Empty);
        }

        let mut parts = input.splitn(5, '.');
        let major = numeric_component(input, parts.next(), "major")?;
        let minor = numeric_component(input, parts.next(), "minor")?;
        let patch = numeric_component(input, parts.next(), "patch")?;
        let suffix = parts.next().unwrap_or_default().to_string();
        if parts.next().is_some() {
            return Err(ParseError::TooManyComponents {
                input: input.to_string(),
            });
        }

        Ok(Self {
            major,
            minor,
            patch,
            suffix,
        })
    }
}

fn numeric_component(
    input: &str,
    part: Option<&str>,
    component: &'static str,
) -> Result<u64, ParseError> {
    let part = part.ok_or_else(|| ParseError::MissingComponent {
        input: input.to_string(),
        component,
    })?;
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::NonNumeric {
            input: input.to_string(),
            component,
        });
    }
    part.parse().map_err(|_| ParseError::NonNumeric {
        input: input.to_string(),
        component,
    })
}

impl Ord for AppVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| self.suffix.cmp(&other.suffix))
    }
}

impl PartialOrd for AppVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for AppVersion {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AppVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.suffix.is_empty() {
            write!(f, ".{}", self.suffix)?;
        }
        Ok(())
    }
}

impl Serialize for AppVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AppVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> AppVersion {
        s.parse().expect("valid version")
    }

    #[test]
    fn parses_three_components() {
        let parsed = v("4.12.0");
        assert_eq!(parsed.major(), 4);
        assert_eq!(parsed.minor(), 12);
        assert_eq!(parsed.patch(), 0);
        assert_eq!(parsed.suffix(), "");
    }

    #[test]
    fn parses_suffix() {
        let parsed = v("2.0.5.rc1");
        assert_eq!(parsed, AppVersion::new(2, 0, 5).with_suffix("rc1"));
        assert_eq!(parsed.to_string(), "2.0.5.rc1");
    }

    #[test]
    fn numeric_components_compare_numerically() {
        assert!(v("1.10.0") > v("1.9.9"));
        assert!(v("10.0.0") > v("9.99.99"));
    }

    #[test]
    fn suffix_sorts_after_bare_triple() {
        assert!(v("1.2.3") < v("1.2.3.beta"));
        assert!(v("1.2.3.beta") < v("1.2.4"));
        assert!(v("1.2.3.a") < v("1.2.3.b"));
    }

    #[test]
    fn rejects_malformed() {
        assert_eq!(AppVersion::parse(""), Err(ParseError::Empty));
        assert!(matches!(
            AppVersion::parse("1.2"),
            Err(ParseError::MissingComponent {
                component: "patch",
                ..
            })
        ));
        assert!(matches!(
            AppVersion::parse("1.x.3"),
            Err(ParseError::NonNumeric {
                component: "minor",
                ..
            })
        ));
        assert!(matches!(
            AppVersion::parse("+1.2.3"),
            Err(ParseError::NonNumeric { .. })
        ));
        assert!(matches!(
            AppVersion::parse("1.2.3.4.5"),
            Err(ParseError::TooManyComponents { .. })
        ));
    }

    #[test]
    fn ordering_is_transitive_and_antisymmetric() {
        let samples: Vec<AppVersion> = [
            "0.0.1", "1.0.0", "1.0.0.a", "1.0.0.b", "1.0.1", "1.1.0", "2.0.0", "10.0.0",
        ]
        .iter()
        .map(|s| v(s))
        .collect();

        for a in &samples {
            for b in &samples {
                if a < b {
                    assert!(b > a, "antisymmetry violated for {a} / {b}");
                }
                if a == b {
                    assert_eq!(a.cmp(b), Ordering::Equal);
                }
                for c in &samples {
                    if a < b && b < c {
                        assert!(a < c, "transitivity violated for {a} < {b} < {c}");
                    }
                }
            }
        }
    }

    #[test]
    fn serde_uses_plain_string() {
        let json = serde_json::to_string(&v("3.3.3")).unwrap();
        assert_eq!(json, "\"3.3.3\"");
        let back: AppVersion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v("3.3.3"));
        assert!(serde_json::from_str::<AppVersion>("\"abc\"").is_err());
    }
}
