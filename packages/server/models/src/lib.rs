#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the CityPulse analytics server.
//!
//! These types are the contract between the server and the dashboard.
//! The dashboard deserializes responses straight into them, so a body that
//! does not match is rejected as malformed instead of rendering blank
//! fields. Field casing follows what the endpoints have always emitted:
//! sensor and forecast payloads are `snake_case`, zone and alert payloads
//! are `camelCase`.

use citypulse_city_models::{AlertSeverity, AlertStatus, DemandLevel, Sentiment, ZonePriority};
use serde::{Deserialize, Serialize};

/// Default look-back window, in days, for the sentiment endpoints.
pub const DEFAULT_SENTIMENT_DAYS: u32 = 30;

// ---------------------------------------------------------------------------
// Sensor readings
// ---------------------------------------------------------------------------

/// `GET /traffic`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficReading {
    /// Congestion as a percentage string (`"132.5%"`), or `"unknown"`.
    pub congestion: String,
}

/// `GET /air`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirReading {
    /// `OpenWeatherMap` AQI index (1-5), if the provider reported one.
    pub aqi: Option<u8>,
    /// Human label for the index.
    pub description: String,
}

/// `GET /water`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterReading {
    /// Usage with unit, e.g. `"2.54 ML"`.
    pub water_usage: String,
    /// `"High"`, `"Low"` or `"Normal range"`.
    pub condition: String,
}

/// `GET /electricity`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectricityReading {
    /// Grid zone code, e.g. `"IN-WE"`.
    pub zone: String,
    /// Load with unit, e.g. `"24113 MW"`, or `"unknown"`.
    pub electricity_load: String,
}

/// A single simulated citizen complaint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintEntry {
    /// Service category (`"Roads"`, `"Water Supply"`, ...).
    pub category: String,
    /// Free-text description.
    pub description: String,
    /// `"Open"`, `"In Progress"` or `"Resolved"`.
    pub status: String,
    /// `%Y-%m-%d %H:%M:%S` UTC timestamp.
    pub timestamp: String,
}

/// `GET /complaints`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintsReading {
    /// Number of complaints in this batch.
    pub count: usize,
    /// The complaints themselves.
    pub complaints: Vec<ComplaintEntry>,
}

/// Query parameters for `GET /air`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct AirQueryParams {
    /// Latitude; defaults to the city centre.
    pub lat: Option<f64>,
    /// Longitude; defaults to the city centre.
    pub lon: Option<f64>,
}

// ---------------------------------------------------------------------------
// Forecast
// ---------------------------------------------------------------------------

/// One forecast step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiForecastPoint {
    /// ISO 8601 timestamp of the step.
    pub timestamp: String,
    /// Point forecast.
    pub value: f64,
    /// Lower bound of the 95% interval.
    #[serde(default)]
    pub lower: Option<f64>,
    /// Upper bound of the 95% interval.
    #[serde(default)]
    pub upper: Option<f64>,
    /// Demand band for `value`.
    #[serde(default)]
    pub level: Option<DemandLevel>,
}

/// Relative weight of a forecast input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    /// Feature name.
    pub feature: String,
    /// Weight in `[0, 1]`.
    pub importance: f64,
}

/// Holdout accuracy and provenance of a forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastStats {
    /// Model family.
    pub method: String,
    /// R² on the holdout, as a percentage.
    pub accuracy_r2: f64,
    /// Mean absolute error.
    pub mae: f64,
    /// Root mean squared error.
    pub rmse: f64,
    /// Mean absolute percentage error.
    pub mape: f64,
    /// Points used to fit.
    pub training_points: usize,
    /// Points held out.
    pub test_points: usize,
    /// When the forecast was produced (ISO 8601).
    pub last_updated: String,
}

/// `GET /electricity/forecast`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    /// Forecast steps, oldest first.
    pub forecast: Vec<ApiForecastPoint>,
    /// Input weights.
    #[serde(default)]
    pub feature_importance: Vec<FeatureImportance>,
    /// Accuracy statistics.
    pub stats: ForecastStats,
}

// ---------------------------------------------------------------------------
// Zones
// ---------------------------------------------------------------------------

/// Screen position of a zone marker, as CSS percentages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZonePosition {
    /// Offset from the top, e.g. `"35%"`.
    pub top: String,
    /// Offset from the left, e.g. `"45%"`.
    pub left: String,
}

/// `GET /zones` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiZone {
    /// Zone ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Planning priority.
    pub priority: ZonePriority,
    /// Marker position.
    pub position: ZonePosition,
    /// AQI index; 0 when unknown.
    pub aqi: u8,
    /// Complaints currently attributed to the zone.
    pub complaints: u32,
    /// Water usage as a percentage of allocation.
    pub water_usage: u32,
    /// Suggested actions.
    pub recommendations: Vec<String>,
}

// ---------------------------------------------------------------------------
// Sentiment
// ---------------------------------------------------------------------------

/// Query parameters shared by the sentiment endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DaysQueryParams {
    /// Look-back window in days.
    pub days: Option<u32>,
}

impl DaysQueryParams {
    /// Look-back window, falling back to [`DEFAULT_SENTIMENT_DAYS`].
    #[must_use]
    pub fn days(&self) -> u32 {
        self.days.unwrap_or(DEFAULT_SENTIMENT_DAYS)
    }
}

/// `GET /api/sentiment/summary`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentSummaryResponse {
    /// Rounded positive percentage.
    pub positive: u32,
    /// Rounded neutral percentage.
    pub neutral: u32,
    /// Rounded negative percentage.
    pub negative: u32,
    /// Feedback items in the window.
    pub total: u64,
}

/// `GET /api/sentiment/trend`: parallel arrays of per-day counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentTrendResponse {
    /// Day labels (`YYYY-MM-DD`), ascending.
    pub days: Vec<String>,
    /// Positive counts per day.
    pub positive: Vec<u64>,
    /// Negative counts per day.
    pub negative: Vec<u64>,
    /// Neutral counts per day.
    pub neutral: Vec<u64>,
}

/// A word and its frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    /// The word.
    pub text: String,
    /// Occurrences in the window.
    pub value: u64,
}

/// `GET /api/sentiment/wordcloud`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCloudResponse {
    /// Most frequent words, most frequent first.
    pub words: Vec<WordCount>,
}

/// `GET /api/sentiment/topics` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiTopic {
    /// Topic name.
    pub name: String,
    /// Share of all feedback, rounded percentage.
    pub percentage: u32,
    /// Most common sentiment within the topic.
    pub sentiment: Sentiment,
}

/// `GET /api/sentiment/complaints` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSampleComplaint {
    /// Original text.
    pub raw: String,
    /// Cleaned text.
    pub processed: String,
    /// Assigned sentiment.
    pub sentiment: Sentiment,
    /// Classifier confidence percentage.
    pub confidence: u8,
    /// Feedback channel category.
    pub category: String,
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

/// `GET /api/alerts` element and `POST /api/alerts/{id}/resolve` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAlert {
    /// Alert ID.
    pub id: i64,
    /// Short title.
    pub title: String,
    /// Details.
    pub description: String,
    /// Severity.
    pub severity: AlertSeverity,
    /// `%Y-%m-%d %H:%M:%S` UTC timestamp.
    pub timestamp: String,
    /// Where it is happening.
    pub location: String,
    /// Lifecycle status.
    pub status: AlertStatus,
    /// Responsible team.
    pub assigned_to: String,
    /// Expected time to resolution.
    pub estimated_resolution: String,
}

// ---------------------------------------------------------------------------
// Misc
// ---------------------------------------------------------------------------

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// What went wrong.
    pub error: String,
}

impl ApiError {
    /// Creates an error body.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
