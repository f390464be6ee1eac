#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Shared status, severity and classification types for CityPulse.
//!
//! These enums are the vocabulary shared by the analytics server, the
//! sensor monitor and the dashboard. Their serialized forms are part of
//! the wire contract, so variants must not be renamed casually.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Qualitative health of a single metric, used to colour KPI cards and
/// zone readings.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MetricStatus {
    /// Within normal parameters.
    #[default]
    Good,
    /// Elevated, worth watching.
    Warning,
    /// Needs attention now.
    Critical,
}

/// Direction indicator shown next to a KPI value.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Trend {
    /// Value is rising.
    Up,
    /// Value is falling.
    Down,
    /// No direction (live readings without history).
    #[default]
    Neutral,
}

/// Severity of an operational alert.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AlertSeverity {
    /// Requires immediate response.
    Urgent,
    /// Degraded conditions.
    Warning,
    /// Closed out; kept for history.
    Resolved,
}

impl AlertSeverity {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Urgent, Self::Warning, Self::Resolved]
    }
}

/// Lifecycle status of an alert.
///
/// Alerts start [`Active`](Self::Active), move through any of the working
/// states, and end [`Resolved`](Self::Resolved). Resolution only happens
/// through the explicit resolve action.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AlertStatus {
    /// Newly raised.
    Active,
    /// Someone is looking at it.
    Investigating,
    /// A fix is underway.
    InProgress,
    /// Fixed or stable, under observation.
    Monitoring,
    /// Closed.
    Resolved,
}

impl AlertStatus {
    /// Returns `true` for every status other than [`Self::Resolved`].
    #[must_use]
    pub const fn is_open(self) -> bool {
        !matches!(self, Self::Resolved)
    }
}

/// Planning priority attached to a city zone.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ZonePriority {
    /// Dense or industrial areas that get the most attention.
    High,
    /// Ordinary residential or campus areas.
    Normal,
    /// Parks and green zones.
    Eco,
}

/// Sentiment bucket for a piece of citizen feedback.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Sentiment {
    /// Praise or approval.
    Positive,
    /// Informational or mixed.
    Neutral,
    /// Complaints.
    Negative,
}

impl Sentiment {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Positive, Self::Neutral, Self::Negative]
    }
}

/// `OpenWeatherMap` air quality index, 1 (good) to 5 (very poor).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum AqiLevel {
    /// Index 1.
    Good = 1,
    /// Index 2.
    Fair = 2,
    /// Index 3.
    Moderate = 3,
    /// Index 4.
    Poor = 4,
    /// Index 5.
    #[strum(serialize = "Very Poor")]
    VeryPoor = 5,
}

impl AqiLevel {
    /// Returns the numeric index of this level.
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Creates a level from its numeric index.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not in the range 1-5.
    pub const fn from_value(value: u8) -> Result<Self, InvalidAqiError> {
        match value {
            1 => Ok(Self::Good),
            2 => Ok(Self::Fair),
            3 => Ok(Self::Moderate),
            4 => Ok(Self::Poor),
            5 => Ok(Self::VeryPoor),
            _ => Err(InvalidAqiError { value }),
        }
    }

    /// Display label for an optional raw index; anything outside 1-5 is
    /// `"Unknown"`.
    #[must_use]
    pub fn label_for(value: Option<u8>) -> String {
        value
            .and_then(|v| Self::from_value(v).ok())
            .map_or_else(|| "Unknown".to_string(), |level| level.to_string())
    }

    /// Colour status for this index: 4 and up is critical, 3 is a warning.
    #[must_use]
    pub const fn status(self) -> MetricStatus {
        match self {
            Self::Poor | Self::VeryPoor => MetricStatus::Critical,
            Self::Moderate => MetricStatus::Warning,
            Self::Good | Self::Fair => MetricStatus::Good,
        }
    }
}

/// Error returned when an AQI index is outside 1-5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidAqiError {
    /// The rejected index.
    pub value: u8,
}

impl std::fmt::Display for InvalidAqiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid AQI value {}: expected 1-5", self.value)
    }
}

impl std::error::Error for InvalidAqiError {}

/// Band for a forecast demand value.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum DemandLevel {
    /// 40 and below.
    Low,
    /// Above 40, up to 70.
    Medium,
    /// Above 70.
    High,
}

impl DemandLevel {
    /// Classifies a demand value.
    #[must_use]
    pub fn from_value(value: f64) -> Self {
        if value > 70.0 {
            Self::High
        } else if value > 40.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Qualitative reading of a model confidence percentage.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum ConfidenceLevel {
    /// Above 85%.
    #[strum(serialize = "High Confidence")]
    High,
    /// Above 65%, up to 85%.
    #[strum(serialize = "Medium Confidence")]
    Medium,
    /// 65% and below.
    #[strum(serialize = "Low Confidence")]
    Low,
}

impl ConfidenceLevel {
    /// Classifies a percentage in `[0, 100]`.
    #[must_use]
    pub fn from_percent(percent: f64) -> Self {
        if percent > 85.0 {
            Self::High
        } else if percent > 65.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

/// Generation state of a report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReportStatus {
    /// Available for download.
    Ready,
    /// Still being produced.
    Generating,
    /// Generation failed.
    Error,
}

/// Output format of a report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum ReportFormat {
    /// Portable document.
    #[serde(rename = "PDF")]
    #[strum(serialize = "PDF")]
    Pdf,
    /// Spreadsheet.
    Excel,
}

/// A section of the dashboard page, in page order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Section {
    /// Overview KPI cards.
    Dashboard,
    /// Predictive analytics.
    Analytics,
    /// Zone map and clustering.
    Zones,
    /// Sentiment analysis.
    Sentiment,
    /// Alerts and notifications.
    Alerts,
    /// Report catalog.
    Reports,
}

impl Section {
    /// Every section, in the order they are stacked on the page.
    pub const ALL: &[Self] = &[
        Self::Dashboard,
        Self::Analytics,
        Self::Zones,
        Self::Sentiment,
        Self::Alerts,
        Self::Reports,
    ];

    /// Navigation label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Analytics => "Predictive Analytics",
            Self::Zones => "Zones",
            Self::Sentiment => "Sentiment",
            Self::Alerts => "Alerts",
            Self::Reports => "Reports",
        }
    }
}
