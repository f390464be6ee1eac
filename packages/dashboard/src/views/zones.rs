//! Zone map and per-zone details.
//!
//! Unlike the other sections there is no demo zone set: a failed fetch
//! leaves the map empty with an inline error.

use citypulse_city_models::{AqiLevel, MetricStatus};
use citypulse_server_models::ApiZone;
use serde::Serialize;

use crate::client::ApiClient;
use crate::fallback;
use crate::loaded::{Loaded, load_or_fallback};

/// Inline message shown when zones could not be fetched.
pub const ZONE_LOAD_ERROR: &str = "Could not load zone data. Ensure backend is running.";

/// Zones to plot, or an error message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ZoneMap {
    /// Zones in server order.
    pub zones: Vec<ApiZone>,
    /// Inline error, set when the fetch failed.
    pub error: Option<String>,
}

impl ZoneMap {
    /// Looks up a zone by ID.
    #[must_use]
    pub fn find(&self, id: i64) -> Option<&ApiZone> {
        self.zones.iter().find(|z| z.id == id)
    }
}

/// Colour for a zone AQI: 4 and up critical, 3 warning, anything else
/// (including 0 for unknown) good.
#[must_use]
pub fn aqi_status(aqi: u8) -> MetricStatus {
    AqiLevel::from_value(aqi).map_or(MetricStatus::Good, AqiLevel::status)
}

/// Colour for a complaint count: above 10 critical, above 5 warning.
#[must_use]
pub const fn complaints_status(complaints: u32) -> MetricStatus {
    if complaints > 10 {
        MetricStatus::Critical
    } else if complaints > 5 {
        MetricStatus::Warning
    } else {
        MetricStatus::Good
    }
}

/// Colour for water usage percentage: above 100 critical, above 75 warning.
#[must_use]
pub const fn water_status(water_usage: u32) -> MetricStatus {
    if water_usage > 100 {
        MetricStatus::Critical
    } else if water_usage > 75 {
        MetricStatus::Warning
    } else {
        MetricStatus::Good
    }
}

/// `"Moderate (3)"`, or `"Unknown (0)"` for an index outside 1-5.
#[must_use]
pub fn aqi_label(aqi: u8) -> String {
    format!("{} ({aqi})", AqiLevel::label_for(Some(aqi)))
}

/// Fetches all zones.
pub async fn load(client: &ApiClient) -> Loaded<ZoneMap> {
    load_or_fallback(
        "zones",
        async {
            Ok(ZoneMap {
                zones: client.zones().await?,
                error: None,
            })
        },
        fallback::zones,
    )
    .await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use crate::testing::StubTransport;

    use super::*;

    #[test]
    fn status_thresholds() {
        assert_eq!(aqi_status(0), MetricStatus::Good);
        assert_eq!(aqi_status(3), MetricStatus::Warning);
        assert_eq!(aqi_status(4), MetricStatus::Critical);
        assert_eq!(complaints_status(5), MetricStatus::Good);
        assert_eq!(complaints_status(6), MetricStatus::Warning);
        assert_eq!(complaints_status(11), MetricStatus::Critical);
        assert_eq!(water_status(75), MetricStatus::Good);
        assert_eq!(water_status(76), MetricStatus::Warning);
        assert_eq!(water_status(101), MetricStatus::Critical);
    }

    #[test]
    fn labels_aqi() {
        assert_eq!(aqi_label(2), "Fair (2)");
        assert_eq!(aqi_label(0), "Unknown (0)");
    }

    #[tokio::test]
    async fn loads_zones() {
        let stub = StubTransport::new().with_json(
            "/zones",
            json!([{
                "id": 1,
                "name": "Downtown District (CP)",
                "priority": "high",
                "position": { "top": "35%", "left": "45%" },
                "aqi": 4,
                "complaints": 18,
                "waterUsage": 104,
                "recommendations": ["Deploy air purifiers and monitor emissions."]
            }]),
        );
        let client = ApiClient::new(Arc::new(stub));
        let loaded = load(&client).await;
        assert!(!loaded.is_fallback());
        assert!(loaded.data.error.is_none());
        assert_eq!(loaded.data.find(1).unwrap().water_usage, 104);
        assert!(loaded.data.find(2).is_none());
    }

    #[tokio::test]
    async fn failure_shows_inline_error() {
        let stub = StubTransport::new().with_status("/zones", 500);
        let client = ApiClient::new(Arc::new(stub));
        let loaded = load(&client).await;
        assert!(loaded.is_fallback());
        assert!(loaded.data.zones.is_empty());
        assert_eq!(loaded.data.error.as_deref(), Some(ZONE_LOAD_ERROR));
    }
}
