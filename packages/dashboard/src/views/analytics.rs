//! Predictive analytics: demand forecast, feature importance and model
//! confidence.

use citypulse_city_models::ConfidenceLevel;
use citypulse_server_models::{FeatureImportance, ForecastResponse};
use serde::Serialize;

use crate::client::ApiClient;
use crate::fallback;
use crate::loaded::{Loaded, load_or_fallback};

/// A point on the forecast line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    /// X-axis label.
    pub time: String,
    /// Forecast demand.
    pub value: f64,
}

/// Model details shown under the forecast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelStats {
    /// Size of the training set, human formatted.
    pub training_data: String,
    /// When the model last ran.
    pub last_updated: String,
    /// Forecast horizon.
    pub prediction_range: String,
    /// Model family.
    pub model_type: String,
    /// Root mean squared error.
    pub rmse: f64,
    /// Mean absolute error.
    pub mae: f64,
    /// Mean absolute percentage error, formatted.
    pub mape: String,
}

/// Everything the analytics section renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsData {
    /// Forecast line.
    pub forecast: Vec<ForecastPoint>,
    /// Feature weights.
    pub feature_importance: Vec<FeatureImportance>,
    /// Model details.
    pub stats: ModelStats,
    /// Confidence percentage, 0-100.
    pub confidence: f64,
}

impl AnalyticsData {
    /// Qualitative band for [`Self::confidence`].
    #[must_use]
    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_percent(self.confidence)
    }
}

/// Shapes a forecast response. Confidence is the holdout R² percentage,
/// clamped to `[0, 100]` since a poor fit can drive R² negative.
#[must_use]
pub fn shape_forecast(response: ForecastResponse) -> AnalyticsData {
    let stats = &response.stats;
    let model_stats = ModelStats {
        training_data: format!("{} points", thousands(stats.training_points)),
        last_updated: stats.last_updated.clone(),
        prediction_range: format!("{} hours", response.forecast.len()),
        model_type: stats.method.clone(),
        rmse: stats.rmse,
        mae: stats.mae,
        mape: format!("{:.1}%", stats.mape),
    };
    let confidence = if stats.accuracy_r2.is_finite() {
        stats.accuracy_r2.clamp(0.0, 100.0)
    } else {
        0.0
    };

    AnalyticsData {
        forecast: response
            .forecast
            .into_iter()
            .map(|p| ForecastPoint {
                time: p.timestamp,
                value: p.value,
            })
            .collect(),
        feature_importance: response.feature_importance,
        stats: model_stats,
        confidence,
    }
}

/// Formats an integer with comma thousands separators.
fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Fetches and shapes the demand forecast.
pub async fn load(client: &ApiClient) -> Loaded<AnalyticsData> {
    load_or_fallback(
        "analytics",
        async { Ok(shape_forecast(client.forecast().await?)) },
        fallback::analytics,
    )
    .await
}
