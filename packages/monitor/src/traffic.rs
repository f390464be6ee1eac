//! `TomTom` traffic flow.

use chrono::NaiveDateTime;
use citypulse_database::readings::{self, TrafficSample};
use citypulse_server_models::TrafficReading;
use serde_json::Value;

use crate::{Monitor, MonitorError, TRAFFIC_API_KEY_ENV, retry, round2};

/// Point whose road segment is sampled (central New Delhi).
pub const TRAFFIC_POINT: (f64, f64) = (28.6139, 77.2090);

/// Extracts travel times from a flow segment response.
#[must_use]
pub fn parse_flow(body: &Value, timestamp: NaiveDateTime) -> TrafficSample {
    let flow = &body["flowSegmentData"];
    TrafficSample {
        timestamp,
        current_travel_time: flow["currentTravelTime"].as_f64(),
        free_flow_travel_time: flow["freeFlowTravelTime"].as_f64(),
    }
}

/// Congestion as a percentage of free-flow travel time, e.g. `"150%"`,
/// or `"unknown"` when either time is missing or zero.
#[must_use]
pub fn congestion_label(sample: &TrafficSample) -> String {
    match (sample.current_travel_time, sample.free_flow_travel_time) {
        (Some(current), Some(free)) if current > 0.0 && free > 0.0 => {
            format!("{}%", round2(current / free * 100.0))
        }
        _ => "unknown".to_string(),
    }
}

impl Monitor {
    /// Fetches the current flow at [`TRAFFIC_POINT`] and records it.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError`] if the key is missing, the request fails
    /// or the reading cannot be stored.
    pub async fn traffic(&self) -> Result<TrafficReading, MonitorError> {
        let key = Self::key(self.config.traffic_api_key.as_ref(), TRAFFIC_API_KEY_ENV)?;
        let point = format!("{},{}", TRAFFIC_POINT.0, TRAFFIC_POINT.1);

        let body = retry::send_json(|| {
            self.client
                .get(&self.config.traffic_url)
                .query(&[("key", key), ("point", point.as_str())])
        })
        .await?;

        let sample = parse_flow(&body, citypulse_database::now());
        readings::record_traffic(self.db(), &sample).await?;

        Ok(TrafficReading {
            congestion: congestion_label(&sample),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn now() -> NaiveDateTime {
        citypulse_database::parse_timestamp("2025-01-01 08:00:00").unwrap()
    }

    #[test]
    fn parses_flow_segment() {
        let body = json!({
            "flowSegmentData": {
                "currentSpeed": 21,
                "freeFlowSpeed": 40,
                "currentTravelTime": 412,
                "freeFlowTravelTime": 220
            }
        });
        let sample = parse_flow(&body, now());

        assert_eq!(sample.current_travel_time, Some(412.0));
        assert_eq!(sample.free_flow_travel_time, Some(220.0));
        assert_eq!(congestion_label(&sample), "187.27%");
    }

    #[test]
    fn whole_percentages_have_no_decimals() {
        let sample = parse_flow(
            &json!({"flowSegmentData": {"currentTravelTime": 300, "freeFlowTravelTime": 200}}),
            now(),
        );
        assert_eq!(congestion_label(&sample), "150%");
    }

    #[test]
    fn missing_or_zero_times_are_unknown() {
        let missing = parse_flow(&json!({}), now());
        assert_eq!(missing.current_travel_time, None);
        assert_eq!(congestion_label(&missing), "unknown");

        let zero = parse_flow(
            &json!({"flowSegmentData": {"currentTravelTime": 0, "freeFlowTravelTime": 200}}),
            now(),
        );
        assert_eq!(congestion_label(&zero), "unknown");
    }

    #[tokio::test]
    async fn missing_key_fails_without_request() {
        let (monitor, dir) = crate::test_monitor::open("traffic_key").await;
        let err = monitor.traffic().await.unwrap_err();
        assert!(matches!(err, MonitorError::MissingKey("TRAFFIC_API_KEY")));
        assert!(readings::latest_traffic(monitor.db()).await.unwrap().is_none());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
