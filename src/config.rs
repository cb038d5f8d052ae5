//! NVS client configuration.
//!
//! Loaded from `~/.nvs/config.toml`. Defaults apply when the file is missing.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use jiff::tz::TimeZone;
use serde::{Deserialize, Serialize};

use crate::directory::AssetDirectory;
use crate::provider::{DEFAULT_BASE_URL, UreqTransport};
use crate::time::DEFAULT_PROVIDER_TIME_ZONE;

/// NVS client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Config {
    /// Provider endpoint.
    pub base_url: String,

    /// Per-request timeout, in seconds.
    pub timeout_secs: u64,

    /// IANA zone the provider's timestamps are recorded in.
    pub provider_time_zone: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            provider_time_zone: DEFAULT_PROVIDER_TIME_ZONE.to_string(),
        }
    }
}

impl Config {
    /// Load config from `~/.nvs/config.toml`, or defaults if there is none.
    pub fn load() -> Result<Self, String> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load config from `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;

        let config: Self = toml::from_str(&contents)
            .map_err(|e| format!("invalid config at {}: {e}", path.display()))?;

        config
            .validate()
            .map_err(|e| format!("{e} (in {})", path.display()))?;

        Ok(config)
    }

    /// Check values that parse but cannot be used.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.trim().is_empty() {
            return Err("base-url is empty".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("timeout-secs must be at least 1".to_string());
        }
        self.time_zone()?;
        Ok(())
    }

    /// The config file path: `~/.nvs/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".nvs").join("config.toml"))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Resolve `provider-time-zone` against the bundled tz database.
    pub fn time_zone(&self) -> Result<TimeZone, String> {
        TimeZone::get(&self.provider_time_zone)
            .map_err(|e| format!("unknown provider-time-zone '{}': {e}", self.provider_time_zone))
    }

    /// Build a directory that talks to the configured endpoint over HTTP.
    pub fn directory(&self) -> Result<AssetDirectory<UreqTransport>, String> {
        let transport = UreqTransport::new(self.base_url.clone(), self.timeout());
        Ok(AssetDirectory::new(transport, self.time_zone()?))
    }
}
