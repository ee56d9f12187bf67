//! Gate configuration.
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! enabled = true
//! cache_timeout_secs = 600
//! mobile_path_prefixes = ["/api/mobile/"]
//!
//! [mobile_api]
//! video_profiles = "mobile_low,mobile_high"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use appgate_state::{MobileApiConfig, DEFAULT_CACHE_TIMEOUT};

use crate::domain::error::{GateError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GateConfig {
    /// Master switch; a disabled gate passes every request through untouched.
    pub enabled: bool,
    /// Lifetime of a cached platform snapshot.
    pub cache_timeout_secs: u64,
    /// Request paths under these prefixes count as mobile app traffic even
    /// when the user agent is not recognised.
    pub mobile_path_prefixes: Vec<String>,
    /// Platform-independent mobile API settings.
    pub mobile_api: MobileApiConfig,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cache_timeout_secs: DEFAULT_CACHE_TIMEOUT.as_secs(),
            mobile_path_prefixes: vec!["/api/mobile/".to_string()],
            mobile_api: MobileApiConfig::default(),
        }
    }
}

impl GateConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| GateError::Config(e.to_string()))
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_toml_str(&raw)
    }

    pub fn cache_timeout(&self) -> Duration {
        Duration::from_secs(self.cache_timeout_secs)
    }

    pub fn is_mobile_path(&self, path: &str) -> bool {
        self.mobile_path_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }
}
