//! Dashboard configuration.
//!
//! The API base URL is resolved once at startup and injected into the
//! [`ApiClient`](crate::client::ApiClient); no view reads the environment
//! on its own. Values come from, in increasing precedence: built-in
//! defaults, an optional TOML file, and environment variables.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::views::sentiment::TIME_RANGES;

/// Environment variable overriding [`DashboardConfig::api_base`].
pub const API_BASE_ENV: &str = "CITYPULSE_API_BASE";

/// Environment variable overriding [`DashboardConfig::scroll_offset`].
pub const SCROLL_OFFSET_ENV: &str = "CITYPULSE_SCROLL_OFFSET";

/// Errors from loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for [`DashboardConfig`].
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A value parsed but is not usable.
    #[error("Invalid configuration: {message}")]
    Invalid {
        /// Description of the problem.
        message: String,
    },
}

/// Runtime settings for the dashboard.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Base URL of the analytics service, without a trailing slash.
    pub api_base: String,
    /// Pixels added to the scroll position before matching sections.
    pub scroll_offset: f64,
    /// Minimum time between two active-section recomputations.
    pub scroll_throttle_ms: u64,
    /// Initial sentiment time range in days.
    pub default_days: u32,
    /// Per-request timeout. `None` leaves the client default in place.
    pub request_timeout_secs: Option<u64>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base: "http://127.0.0.1:8080".to_string(),
            scroll_offset: crate::sections::DEFAULT_SCROLL_OFFSET,
            scroll_throttle_ms: 100,
            default_days: citypulse_server_models::DEFAULT_SENTIMENT_DAYS,
            request_timeout_secs: None,
        }
    }
}

impl DashboardConfig {
    /// Loads configuration from an optional TOML file, then applies
    /// environment overrides and validates the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or if
    /// the final values are invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(path) => {
                log::debug!("Reading dashboard config from {}", path.display());
                Self::from_toml_str(&std::fs::read_to_string(path)?)?
            }
            None => Self::default(),
        };

        base.with_overrides(|key| std::env::var(key).ok())
    }

    /// Parses a TOML document. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the document is malformed.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Applies overrides from `lookup` (normally the process environment)
    /// and validates.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if an override cannot be parsed,
    /// the API base is not an HTTP(S) URL, or `default_days` is not one of
    /// the selectable time ranges.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base) = lookup(API_BASE_ENV) {
            self.api_base = base;
        }

        if let Some(raw) = lookup(SCROLL_OFFSET_ENV) {
            self.scroll_offset = raw.trim().parse().map_err(|_| ConfigError::Invalid {
                message: format!("{SCROLL_OFFSET_ENV} must be a number, got {raw:?}"),
            })?;
        }

        self.validate()
    }

    fn validate(mut self) -> Result<Self, ConfigError> {
        let trimmed = self.api_base.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                message: format!("api_base must be an http(s) URL, got {:?}", self.api_base),
            });
        }
        self.api_base = trimmed.to_string();

        if !self.scroll_offset.is_finite() {
            return Err(ConfigError::Invalid {
                message: "scroll_offset must be finite".to_string(),
            });
        }

        if !TIME_RANGES.contains(&self.default_days) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "default_days must be one of {TIME_RANGES:?}, got {}",
                    self.default_days
                ),
            });
        }

        Ok(self)
    }

    /// Throttle interval as a [`Duration`].
    #[must_use]
    pub const fn scroll_throttle(&self) -> Duration {
        Duration::from_millis(self.scroll_throttle_ms)
    }

    /// Request timeout as a [`Duration`], if configured.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
