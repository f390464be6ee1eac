//! Overview KPI cards.

use citypulse_city_models::{AqiLevel, MetricStatus, Trend};
use citypulse_server_models::{
    AirReading, ComplaintsReading, ElectricityReading, TrafficReading, WaterReading,
};
use serde::Serialize;

use crate::client::ApiClient;
use crate::fallback;
use crate::loaded::{Loaded, load_or_fallback};
use crate::shaping::leading_number;

/// A single KPI card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSnapshot {
    /// Card title.
    pub title: String,
    /// Current value; `None` renders as `N/A`.
    pub value: Option<f64>,
    /// Unit suffix, possibly empty.
    pub unit: String,
    /// Direction arrow.
    pub trend: Trend,
    /// Short text next to the arrow.
    pub trend_label: String,
    /// Card colouring.
    pub status: MetricStatus,
}

impl MetricSnapshot {
    pub(crate) fn new(
        title: &str,
        value: Option<f64>,
        unit: &str,
        trend_label: &str,
        status: MetricStatus,
    ) -> Self {
        Self {
            title: title.to_string(),
            value,
            unit: unit.to_string(),
            trend: Trend::Neutral,
            trend_label: trend_label.to_string(),
            status,
        }
    }
}

/// Builds the five KPI cards from live sensor readings.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn shape_kpis(
    traffic: &TrafficReading,
    air: &AirReading,
    water: &WaterReading,
    electricity: &ElectricityReading,
    complaints: &ComplaintsReading,
) -> Vec<MetricSnapshot> {
    let air_status = air
        .aqi
        .and_then(|v| AqiLevel::from_value(v).ok())
        .map_or(MetricStatus::Good, AqiLevel::status);

    let water_status = if water.condition.starts_with("High") {
        MetricStatus::Warning
    } else {
        MetricStatus::Good
    };

    vec![
        MetricSnapshot::new(
            "Traffic Congestion",
            leading_number(&traffic.congestion),
            "%",
            "Live",
            MetricStatus::Warning,
        ),
        MetricSnapshot::new(
            "Air Quality Index",
            air.aqi.map(f64::from),
            "AQI",
            &air.description,
            air_status,
        ),
        MetricSnapshot::new(
            "Water Usage",
            leading_number(&water.water_usage),
            "ML",
            &water.condition,
            water_status,
        ),
        MetricSnapshot::new(
            "Electricity Load",
            leading_number(&electricity.electricity_load),
            "MW",
            &electricity.zone,
            MetricStatus::Critical,
        ),
        MetricSnapshot::new(
            "Active Complaints",
            Some(complaints.count as f64),
            "",
            "Live data",
            MetricStatus::Warning,
        ),
    ]
}

/// Fetches all five sensor endpoints together and shapes them into cards.
pub async fn load(client: &ApiClient) -> Loaded<Vec<MetricSnapshot>> {
    load_or_fallback(
        "overview",
        async {
            let (traffic, air, water, electricity, complaints) = tokio::try_join!(
                client.traffic(),
                client.air(),
                client.water(),
                client.electricity(),
                client.complaints(),
            )?;
            Ok(shape_kpis(&traffic, &air, &water, &electricity, &complaints))
        },
        fallback::kpis,
    )
    .await
}
