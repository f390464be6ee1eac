//! `OpenWeatherMap` air pollution.

use chrono::NaiveDateTime;
use citypulse_city_models::AqiLevel;
use citypulse_database::readings::{self, AirSample};
use citypulse_server_models::AirReading;
use serde_json::Value;

use crate::{Monitor, MonitorError, OWM_KEY_ENV, retry};

/// Coordinates used when a request does not name a location.
pub const DEFAULT_AIR_POINT: (f64, f64) = (28.6139, 77.2090);

/// Extracts the AQI from `list[0].main.aqi` and labels it.
#[must_use]
pub fn parse_pollution(body: &Value, timestamp: NaiveDateTime) -> AirSample {
    let aqi = body["list"][0]["main"]["aqi"]
        .as_u64()
        .and_then(|v| u8::try_from(v).ok());
    AirSample {
        timestamp,
        aqi,
        description: AqiLevel::label_for(aqi),
    }
}

impl Monitor {
    /// Fetches air quality at `lat`/`lon` and records it.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError`] if the key is missing, the request fails
    /// or the reading cannot be stored.
    pub async fn air(&self, lat: f64, lon: f64) -> Result<AirReading, MonitorError> {
        let key = Self::key(self.config.owm_key.as_ref(), OWM_KEY_ENV)?;
        let (lat, lon) = (lat.to_string(), lon.to_string());

        let body = retry::send_json(|| {
            self.client.get(&self.config.air_url).query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", key),
            ])
        })
        .await?;

        let sample = parse_pollution(&body, citypulse_database::now());
        readings::record_air(self.db(), &sample).await?;

        Ok(AirReading {
            aqi: sample.aqi,
            description: sample.description,
        })
    }
}
