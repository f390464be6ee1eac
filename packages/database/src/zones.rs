//! Monitored city zones.

use citypulse_city_models::ZonePriority;
use citypulse_server_models::ZonePosition;
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};

use crate::{StoreError, first_i64, required_i64};

/// A stored zone.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub id: i64,
    pub name: String,
    pub priority: ZonePriority,
    /// Marker placement on the city map.
    pub position: ZonePosition,
    pub latitude: f64,
    pub longitude: f64,
}

/// Zones inserted into an empty table:
/// `(name, priority, top, left, latitude, longitude)`.
pub const DEFAULT_ZONES: &[(&str, ZonePriority, &str, &str, f64, f64)] = &[
    ("Downtown District (CP)", ZonePriority::High, "35%", "45%", 28.6324, 77.2187),
    ("Residential South", ZonePriority::Normal, "60%", "30%", 28.5273, 77.2088),
    ("Eco Park Zone", ZonePriority::Eco, "25%", "70%", 28.6129, 77.2295),
    ("Industrial Hub", ZonePriority::High, "80%", "65%", 28.5611, 77.2884),
    ("University Campus", ZonePriority::Normal, "15%", "20%", 28.6872, 77.1658),
];

/// Inserts [`DEFAULT_ZONES`] if the table is empty.
///
/// # Errors
///
/// Returns [`StoreError`] if a query fails.
pub async fn seed_zones(db: &dyn Database) -> Result<(), StoreError> {
    let rows = db
        .query_raw_params("SELECT COUNT(*) as cnt FROM zones", &[])
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;
    let count = first_i64(&rows, "cnt")?;
    if count > 0 {
        return Ok(());
    }

    for &(name, priority, top, left, latitude, longitude) in DEFAULT_ZONES {
        db.exec_raw_params(
            "INSERT INTO zones (name, priority, position_top, position_left, latitude, longitude)
             VALUES ($1, $2, $3, $4, $5, $6)",
            &[
                DatabaseValue::String(name.to_string()),
                DatabaseValue::String(priority.as_ref().to_string()),
                DatabaseValue::String(top.to_string()),
                DatabaseValue::String(left.to_string()),
                DatabaseValue::Real64(latitude),
                DatabaseValue::Real64(longitude),
            ],
        )
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;
    }

    log::info!("Seeded {} zones", DEFAULT_ZONES.len());
    Ok(())
}

/// Lists every zone in insertion order.
///
/// # Errors
///
/// Returns [`StoreError`] if the query fails or a stored priority is
/// unknown.
pub async fn list_zones(db: &dyn Database) -> Result<Vec<Zone>, StoreError> {
    let rows = db
        .query_raw_params(
            "SELECT id, name, priority, position_top, position_left, latitude, longitude
             FROM zones ORDER BY id",
            &[],
        )
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

    let mut zones = Vec::with_capacity(rows.len());
    for row in &rows {
        let priority: String = row.to_value("priority").unwrap_or_default();
        zones.push(Zone {
            id: required_i64(row, "id")?,
            name: row.to_value("name").unwrap_or_default(),
            priority: priority.parse().map_err(|_| StoreError::Conversion {
                message: format!("unknown zone priority: {priority}"),
            })?,
            position: ZonePosition {
                top: row.to_value("position_top").unwrap_or_default(),
                left: row.to_value("position_left").unwrap_or_default(),
            },
            latitude: row.to_value("latitude").unwrap_or(0.0),
            longitude: row.to_value("longitude").unwrap_or(0.0),
        });
    }

    Ok(zones)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_db;

    #[tokio::test]
    async fn seeds_default_zones_once() {
        let (db, dir) = test_db::open("zones_seed").await;

        seed_zones(db.as_ref()).await.unwrap();
        let zones = list_zones(db.as_ref()).await.unwrap();

        assert_eq!(zones.len(), 5);
        assert_eq!(zones[0].name, "Downtown District (CP)");
        assert_eq!(zones[0].priority, ZonePriority::High);
        assert_eq!(zones[0].position.top, "35%");
        assert_eq!(zones[2].priority, ZonePriority::Eco);
        assert!((zones[4].latitude - 28.6872).abs() < 1e-9);
        assert!(zones.windows(2).all(|w| w[0].id < w[1].id));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
