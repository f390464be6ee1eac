//! Electricity Maps grid load.

use chrono::NaiveDateTime;
use citypulse_database::readings::{self, ElectricitySample};
use citypulse_server_models::ElectricityReading;
use serde_json::Value;

use crate::{ELECTRICITY_API_KEY_ENV, Monitor, MonitorError, retry};

/// Grid zone queried (Western India).
pub const GRID_ZONE: &str = "IN-WE";

/// Extracts total consumption from a power breakdown response.
#[must_use]
pub fn parse_breakdown(body: &Value, zone: &str, timestamp: NaiveDateTime) -> ElectricitySample {
    ElectricitySample {
        timestamp,
        zone: zone.to_string(),
        consumption_mw: body["powerConsumptionTotal"].as_f64(),
    }
}

/// Load with unit, e.g. `"24113 MW"`, or `"unknown"`.
#[must_use]
pub fn load_label(sample: &ElectricitySample) -> String {
    match sample.consumption_mw {
        Some(mw) if mw != 0.0 => format!("{mw} MW"),
        _ => "unknown".to_string(),
    }
}

impl Monitor {
    /// Fetches the latest power breakdown for [`GRID_ZONE`] and records it.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError`] if the token is missing, the request fails
    /// or the reading cannot be stored.
    pub async fn electricity(&self) -> Result<ElectricityReading, MonitorError> {
        let token = Self::key(
            self.config.electricity_api_key.as_ref(),
            ELECTRICITY_API_KEY_ENV,
        )?;

        let body = retry::send_json(|| {
            self.client
                .get(&self.config.electricity_url)
                .query(&[("zone", GRID_ZONE)])
                .header("auth-token", token)
        })
        .await?;

        let sample = parse_breakdown(&body, GRID_ZONE, citypulse_database::now());
        readings::record_electricity(self.db(), &sample).await?;

        Ok(ElectricityReading {
            zone: sample.zone.clone(),
            electricity_load: load_label(&sample),
        })
    }
}
