#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Sensor collection for the CityPulse analytics service.
//!
//! [`Monitor`] pulls traffic, grid load and air quality from upstream
//! providers, simulates water usage and citizen complaints, records every
//! reading in the store and raises alerts when thresholds are crossed.
//! [`scheduler`] runs each collector on its own interval.

pub mod air;
pub mod electricity;
pub mod retry;
pub mod rules;
pub mod scheduler;
pub mod simulated;
pub mod traffic;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use citypulse_database::StoreError;
use citypulse_feedback::FeedbackError;
use switchy_database::Database;
use thiserror::Error;

/// Timeout applied to every upstream request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Environment variable holding the `TomTom` API key.
pub const TRAFFIC_API_KEY_ENV: &str = "TRAFFIC_API_KEY";
/// Environment variable holding the Electricity Maps token.
pub const ELECTRICITY_API_KEY_ENV: &str = "ELECTRICITY_API_KEY";
/// Environment variable overriding [`DEFAULT_ELECTRICITY_URL`].
pub const ELECTRICITY_URL_ENV: &str = "ELECTRICITY_URL";
/// Environment variable holding the `OpenWeatherMap` key.
pub const OWM_KEY_ENV: &str = "OWM_KEY";

/// Electricity Maps power breakdown endpoint.
pub const DEFAULT_ELECTRICITY_URL: &str =
    "https://api.electricitymaps.com/v3/power-breakdown/latest";
/// `TomTom` flow segment endpoint.
pub const DEFAULT_TRAFFIC_URL: &str =
    "https://api.tomtom.com/traffic/services/4/flowSegmentData/relative0/10/json";
/// `OpenWeatherMap` air pollution endpoint.
pub const DEFAULT_AIR_URL: &str = "http://api.openweathermap.org/data/2.5/air_pollution";

/// Errors from collecting a reading or evaluating alerts.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// The HTTP request itself failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("Upstream returned HTTP {status}")]
    Status { status: u16 },

    /// The provider's body was not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The API key for a provider is not configured.
    #[error("{0} is not set")]
    MissingKey(&'static str),

    /// Recording or reading from the store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The feedback file could not be read.
    #[error(transparent)]
    Feedback(#[from] FeedbackError),
}

/// Provider keys and endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub traffic_api_key: Option<String>,
    pub electricity_api_key: Option<String>,
    pub owm_key: Option<String>,
    pub traffic_url: String,
    pub electricity_url: String,
    pub air_url: String,
    /// Feedback file checked for negative sentiment spikes.
    pub feedback_path: PathBuf,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            traffic_api_key: None,
            electricity_api_key: None,
            owm_key: None,
            traffic_url: DEFAULT_TRAFFIC_URL.to_string(),
            electricity_url: DEFAULT_ELECTRICITY_URL.to_string(),
            air_url: DEFAULT_AIR_URL.to_string(),
            feedback_path: PathBuf::from(citypulse_feedback::DEFAULT_FEEDBACK_PATH),
        }
    }
}

impl MonitorConfig {
    /// Builds the config from `lookup` (normally `std::env::var`). Blank
    /// values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            traffic_api_key: get(TRAFFIC_API_KEY_ENV),
            electricity_api_key: get(ELECTRICITY_API_KEY_ENV),
            owm_key: get(OWM_KEY_ENV),
            electricity_url: get(ELECTRICITY_URL_ENV)
                .unwrap_or_else(|| DEFAULT_ELECTRICITY_URL.to_string()),
            feedback_path: PathBuf::from(citypulse_feedback::feedback_path(&lookup)),
            ..Self::default()
        }
    }

    /// Reads the config from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

/// Collectors sharing an HTTP client and the store.
#[derive(Clone)]
pub struct Monitor {
    client: reqwest::Client,
    config: MonitorConfig,
    db: Arc<dyn Database>,
}

impl Monitor {
    /// Creates a monitor with a client that times out after
    /// [`REQUEST_TIMEOUT`].
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Http`] if the HTTP client cannot be built.
    pub fn new(config: MonitorConfig, db: Arc<dyn Database>) -> Result<Self, MonitorError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, config, db })
    }

    /// The store readings are recorded in.
    #[must_use]
    pub fn db(&self) -> &dyn Database {
        self.db.as_ref()
    }

    /// Provider configuration.
    #[must_use]
    pub const fn config(&self) -> &MonitorConfig {
        &self.config
    }

    fn key<'a>(value: Option<&'a String>, env: &'static str) -> Result<&'a str, MonitorError> {
        value.map(String::as_str).ok_or(MonitorError::MissingKey(env))
    }
}

/// Rounds to two decimals.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
