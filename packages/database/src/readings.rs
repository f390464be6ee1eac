//! Raw sensor readings recorded by the collectors.
//!
//! Each table only needs two operations: append a reading and fetch the
//! most recent one for the alert rules. Complaints also support counting
//! recent entries.

use chrono::NaiveDateTime;
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue, Row};

use crate::{StoreError, first_i64, format_timestamp, parse_timestamp};

/// One traffic flow observation.
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficSample {
    pub timestamp: NaiveDateTime,
    /// Current travel time over the segment, in seconds.
    pub current_travel_time: Option<f64>,
    /// Travel time with no congestion, in seconds.
    pub free_flow_travel_time: Option<f64>,
}

impl TrafficSample {
    /// Current over free-flow travel time, when both are known and the
    /// free-flow time is positive.
    #[must_use]
    pub fn congestion_ratio(&self) -> Option<f64> {
        match (self.current_travel_time, self.free_flow_travel_time) {
            (Some(current), Some(free)) if free > 0.0 => Some(current / free),
            _ => None,
        }
    }
}

/// One grid consumption observation.
#[derive(Debug, Clone, PartialEq)]
pub struct ElectricitySample {
    pub timestamp: NaiveDateTime,
    /// Grid zone code, e.g. `IN-WE`.
    pub zone: String,
    /// Total consumption in MW.
    pub consumption_mw: Option<f64>,
}

/// One water usage observation.
#[derive(Debug, Clone, PartialEq)]
pub struct WaterSample {
    pub timestamp: NaiveDateTime,
    /// Usage in megalitres.
    pub usage_ml: f64,
    /// `High`, `Low` or `Normal range`.
    pub condition: String,
}

/// One air quality observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirSample {
    pub timestamp: NaiveDateTime,
    /// AQI on the 1..=5 scale.
    pub aqi: Option<u8>,
    pub description: String,
}

/// One citizen complaint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Complaint {
    pub timestamp: NaiveDateTime,
    pub category: String,
    pub description: String,
    pub status: String,
}

fn opt_f64(value: Option<f64>) -> DatabaseValue {
    value.map_or(DatabaseValue::Null, DatabaseValue::Real64)
}

fn row_timestamp(row: &Row) -> Result<NaiveDateTime, StoreError> {
    let raw: String = row.to_value("timestamp").unwrap_or_default();
    parse_timestamp(&raw).ok_or_else(|| StoreError::Conversion {
        message: format!("invalid timestamp: {raw}"),
    })
}

async fn exec(db: &dyn Database, sql: &str, params: &[DatabaseValue]) -> Result<(), StoreError> {
    db.exec_raw_params(sql, params)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;
    Ok(())
}

async fn latest_row(db: &dyn Database, table: &str) -> Result<Option<Row>, StoreError> {
    let rows = db
        .query_raw_params(
            &format!("SELECT * FROM {table} ORDER BY timestamp DESC, id DESC LIMIT 1"),
            &[],
        )
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;
    Ok(rows.into_iter().next())
}

// ---------------------------------------------------------------------------
// Traffic
// ---------------------------------------------------------------------------

/// Appends a traffic reading.
///
/// # Errors
///
/// Returns [`StoreError`] if the insert fails.
pub async fn record_traffic(db: &dyn Database, sample: &TrafficSample) -> Result<(), StoreError> {
    exec(
        db,
        "INSERT INTO traffic_readings (timestamp, current_travel_time, free_flow_travel_time)
         VALUES ($1, $2, $3)",
        &[
            DatabaseValue::String(format_timestamp(sample.timestamp)),
            opt_f64(sample.current_travel_time),
            opt_f64(sample.free_flow_travel_time),
        ],
    )
    .await
}

/// Most recent traffic reading.
///
/// # Errors
///
/// Returns [`StoreError`] if the query fails.
pub async fn latest_traffic(db: &dyn Database) -> Result<Option<TrafficSample>, StoreError> {
    let Some(ref row) = latest_row(db, "traffic_readings").await? else {
        return Ok(None);
    };
    Ok(Some(TrafficSample {
        timestamp: row_timestamp(&row)?,
        current_travel_time: row.to_value("current_travel_time").unwrap_or(None),
        free_flow_travel_time: row.to_value("free_flow_travel_time").unwrap_or(None),
    }))
}

// ---------------------------------------------------------------------------
// Electricity
// ---------------------------------------------------------------------------

/// Appends an electricity reading.
///
/// # Errors
///
/// Returns [`StoreError`] if the insert fails.
pub async fn record_electricity(
    db: &dyn Database,
    sample: &ElectricitySample,
) -> Result<(), StoreError> {
    exec(
        db,
        "INSERT INTO electricity_readings (timestamp, zone, consumption_mw) VALUES ($1, $2, $3)",
        &[
            DatabaseValue::String(format_timestamp(sample.timestamp)),
            DatabaseValue::String(sample.zone.clone()),
            opt_f64(sample.consumption_mw),
        ],
    )
    .await
}

/// Most recent electricity reading.
///
/// # Errors
///
/// Returns [`StoreError`] if the query fails.
pub async fn latest_electricity(
    db: &dyn Database,
) -> Result<Option<ElectricitySample>, StoreError> {
    let Some(ref row) = latest_row(db, "electricity_readings").await? else {
        return Ok(None);
    };
    Ok(Some(ElectricitySample {
        timestamp: row_timestamp(&row)?,
        zone: row.to_value("zone").unwrap_or_default(),
        consumption_mw: row.to_value("consumption_mw").unwrap_or(None),
    }))
}

// ---------------------------------------------------------------------------
// Water
// ---------------------------------------------------------------------------

/// Appends a water reading.
///
/// # Errors
///
/// Returns [`StoreError`] if the insert fails.
pub async fn record_water(db: &dyn Database, sample: &WaterSample) -> Result<(), StoreError> {
    exec(
        db,
        "INSERT INTO water_readings (timestamp, usage_ml, condition) VALUES ($1, $2, $3)",
        &[
            DatabaseValue::String(format_timestamp(sample.timestamp)),
            DatabaseValue::Real64(sample.usage_ml),
            DatabaseValue::String(sample.condition.clone()),
        ],
    )
    .await
}

/// Most recent water reading.
///
/// # Errors
///
/// Returns [`StoreError`] if the query fails.
pub async fn latest_water(db: &dyn Database) -> Result<Option<WaterSample>, StoreError> {
    let Some(ref row) = latest_row(db, "water_readings").await? else {
        return Ok(None);
    };
    Ok(Some(WaterSample {
        timestamp: row_timestamp(&row)?,
        usage_ml: row.to_value("usage_ml").unwrap_or(0.0),
        condition: row.to_value("condition").unwrap_or_default(),
    }))
}

// ---------------------------------------------------------------------------
// Air quality
// ---------------------------------------------------------------------------

/// Appends an air quality reading.
///
/// # Errors
///
/// Returns [`StoreError`] if the insert fails.
pub async fn record_air(db: &dyn Database, sample: &AirSample) -> Result<(), StoreError> {
    exec(
        db,
        "INSERT INTO air_quality_readings (timestamp, aqi, description) VALUES ($1, $2, $3)",
        &[
            DatabaseValue::String(format_timestamp(sample.timestamp)),
            sample
                .aqi
                .map_or(DatabaseValue::Null, |v| DatabaseValue::Int64(i64::from(v))),
            DatabaseValue::String(sample.description.clone()),
        ],
    )
    .await
}

/// Most recent air quality reading.
///
/// # Errors
///
/// Returns [`StoreError`] if the query fails.
pub async fn latest_air(db: &dyn Database) -> Result<Option<AirSample>, StoreError> {
    let Some(ref row) = latest_row(db, "air_quality_readings").await? else {
        return Ok(None);
    };
    Ok(Some(AirSample {
        timestamp: row_timestamp(&row)?,
        aqi: row
            .to_value::<Option<i64>>("aqi")
            .unwrap_or(None)
            .and_then(|v| u8::try_from(v).ok()),
        description: row.to_value("description").unwrap_or_default(),
    }))
}

// ---------------------------------------------------------------------------
// Complaints
// ---------------------------------------------------------------------------

/// Appends a complaint.
///
/// # Errors
///
/// Returns [`StoreError`] if the insert fails.
pub async fn record_complaint(db: &dyn Database, complaint: &Complaint) -> Result<(), StoreError> {
    exec(
        db,
        "INSERT INTO complaints (timestamp, category, description, status)
         VALUES ($1, $2, $3, $4)",
        &[
            DatabaseValue::String(format_timestamp(complaint.timestamp)),
            DatabaseValue::String(complaint.category.clone()),
            DatabaseValue::String(complaint.description.clone()),
            DatabaseValue::String(complaint.status.clone()),
        ],
    )
    .await
}

/// Number of complaints recorded at or after `since`.
///
/// # Errors
///
/// Returns [`StoreError`] if the query fails.
pub async fn count_complaints_since(
    db: &dyn Database,
    since: NaiveDateTime,
) -> Result<u64, StoreError> {
    let rows = db
        .query_raw_params(
            "SELECT COUNT(*) as cnt FROM complaints WHERE timestamp >= $1",
            &[DatabaseValue::String(format_timestamp(since))],
        )
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

    let count = first_i64(&rows, "cnt")?;
    Ok(u64::try_from(count).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::test_db;

    fn at(s: &str) -> NaiveDateTime {
        parse_timestamp(s).unwrap()
    }

    #[test]
    fn congestion_ratio_needs_positive_free_flow() {
        let sample = |current, free| TrafficSample {
            timestamp: at("2025-01-01 00:00:00"),
            current_travel_time: current,
            free_flow_travel_time: free,
        };
        assert_eq!(sample(Some(300.0), Some(200.0)).congestion_ratio(), Some(1.5));
        assert_eq!(sample(Some(300.0), Some(0.0)).congestion_ratio(), None);
        assert_eq!(sample(None, Some(200.0)).congestion_ratio(), None);
    }

    #[tokio::test]
    async fn latest_returns_newest_reading() {
        let (db, dir) = test_db::open("readings_latest").await;
        assert!(latest_water(db.as_ref()).await.unwrap().is_none());

        for (ts, usage, condition) in [
            ("2025-01-01 10:00:00", 2.9, "High"),
            ("2025-01-01 12:00:00", 2.1, "Low"),
            ("2025-01-01 11:00:00", 2.5, "Normal range"),
        ] {
            let sample = WaterSample {
                timestamp: at(ts),
                usage_ml: usage,
                condition: condition.to_string(),
            };
            record_water(db.as_ref(), &sample).await.unwrap();
        }

        let latest = latest_water(db.as_ref()).await.unwrap().unwrap();
        assert_eq!(latest.condition, "Low");
        assert_eq!(latest.timestamp, at("2025-01-01 12:00:00"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn optional_columns_survive_storage() {
        let (db, dir) = test_db::open("readings_optional").await;

        let air = AirSample {
            timestamp: at("2025-01-01 10:00:00"),
            aqi: None,
            description: "Unknown".to_string(),
        };
        record_air(db.as_ref(), &air).await.unwrap();
        assert_eq!(latest_air(db.as_ref()).await.unwrap(), Some(air));

        let traffic = TrafficSample {
            timestamp: at("2025-01-01 10:00:00"),
            current_travel_time: Some(420.0),
            free_flow_travel_time: Some(240.0),
        };
        record_traffic(db.as_ref(), &traffic).await.unwrap();
        assert_eq!(latest_traffic(db.as_ref()).await.unwrap(), Some(traffic));

        let power = ElectricitySample {
            timestamp: at("2025-01-01 10:00:00"),
            zone: "IN-WE".to_string(),
            consumption_mw: Some(26_500.0),
        };
        record_electricity(db.as_ref(), &power).await.unwrap();
        assert_eq!(latest_electricity(db.as_ref()).await.unwrap(), Some(power));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn counts_recent_complaints() {
        let (db, dir) = test_db::open("readings_complaints").await;
        let now = at("2025-01-01 12:00:00");

        for minutes in [5, 30, 59, 61, 180] {
            let complaint = Complaint {
                timestamp: now - Duration::minutes(minutes),
                category: "Roads".to_string(),
                description: "Potholes causing traffic jams".to_string(),
                status: "Open".to_string(),
            };
            record_complaint(db.as_ref(), &complaint).await.unwrap();
        }

        let count = count_complaints_since(db.as_ref(), now - Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(count, 3);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
