//! Operational alerts.

use chrono::{Duration, NaiveDateTime};
use citypulse_city_models::{AlertSeverity, AlertStatus};
use citypulse_server_models::ApiAlert;
use moosicbox_json_utils::database::ToValue as _;
use rand::Rng;
use switchy_database::{Database, DatabaseValue, Row};

use crate::{StoreError, first_i64, format_timestamp, required_i64};

/// Resolution text written when an alert is resolved.
pub const RESOLVED_ESTIMATE: &str = "Completed";

/// An alert to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAlert {
    pub title: String,
    pub description: String,
    pub severity: AlertSeverity,
    pub location: String,
    pub status: AlertStatus,
    pub assigned_to: String,
    pub estimated_resolution: String,
}

/// Alerts inserted into an empty table:
/// `(title, description, severity, location, status, assigned_to, estimate)`.
const SEED_ALERTS: &[(&str, &str, AlertSeverity, &str, AlertStatus, &str, &str)] = &[
    (
        "High Traffic Congestion Detected",
        "Traffic volume exceeding normal capacity by 45% in Downtown District",
        AlertSeverity::Urgent,
        "Downtown District - Main St & 5th Ave",
        AlertStatus::Active,
        "Traffic Control Team",
        "15 minutes",
    ),
    (
        "Air Quality Alert",
        "AQI levels above recommended threshold in Industrial Zone",
        AlertSeverity::Warning,
        "Industrial Zone - Sector 7",
        AlertStatus::Investigating,
        "Environmental Team",
        "45 minutes",
    ),
    (
        "Water Main Pressure Drop",
        "Significant pressure reduction detected in residential water supply",
        AlertSeverity::Warning,
        "Residential Area B - Block 12",
        AlertStatus::InProgress,
        "Water Management",
        "2 hours",
    ),
    (
        "Street Light Maintenance Complete",
        "LED street light installation completed successfully",
        AlertSeverity::Resolved,
        "Commercial Hub - Oak Street",
        AlertStatus::Resolved,
        "Maintenance Team",
        "Completed",
    ),
    (
        "Emergency Response Dispatch",
        "Fire department responding to commercial building alarm",
        AlertSeverity::Urgent,
        "Business District - Tower Plaza",
        AlertStatus::Active,
        "Emergency Services",
        "30 minutes",
    ),
    (
        "Public Transport Delay",
        "Bus route 42 experiencing delays due to road construction",
        AlertSeverity::Warning,
        "Transit Route 42 - Central Station",
        AlertStatus::Monitoring,
        "Transit Authority",
        "4 hours",
    ),
    (
        "Waste Collection Completed",
        "Scheduled waste collection completed ahead of schedule",
        AlertSeverity::Resolved,
        "Residential Area A - All Sectors",
        AlertStatus::Resolved,
        "Sanitation Team",
        "Completed",
    ),
    (
        "Power Grid Optimization",
        "Electrical load balancing completed successfully",
        AlertSeverity::Resolved,
        "City-wide Grid Network",
        AlertStatus::Resolved,
        "Power Grid Team",
        "Completed",
    ),
];

const SELECT_ALERT: &str = "SELECT id, title, description, severity, timestamp, location,
        status, assigned_to, estimated_resolution
     FROM alerts";

/// Inserts the seed alerts, stamped 5 to 240 minutes before `now`, if the
/// table is empty.
///
/// # Errors
///
/// Returns [`StoreError`] if a query fails.
pub async fn seed_alerts<R: Rng + ?Sized>(
    db: &dyn Database,
    rng: &mut R,
    now: NaiveDateTime,
) -> Result<(), StoreError> {
    let rows = db
        .query_raw_params("SELECT COUNT(*) as cnt FROM alerts", &[])
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;
    if first_i64(&rows, "cnt")? > 0 {
        return Ok(());
    }

    for &(title, description, severity, location, status, assigned_to, estimate) in SEED_ALERTS
    {
        let at = now - Duration::minutes(rng.gen_range(5..=240));
        let alert = NewAlert {
            title: title.to_string(),
            description: description.to_string(),
            severity,
            location: location.to_string(),
            status,
            assigned_to: assigned_to.to_string(),
            estimated_resolution: estimate.to_string(),
        };
        insert_alert(db, &alert, at).await?;
    }

    log::info!("Seeded {} alerts", SEED_ALERTS.len());
    Ok(())
}

/// Inserts an alert stamped at `at` and returns its ID.
///
/// # Errors
///
/// Returns [`StoreError`] if the insert fails.
pub async fn insert_alert(
    db: &dyn Database,
    alert: &NewAlert,
    at: NaiveDateTime,
) -> Result<i64, StoreError> {
    let rows = db
        .query_raw_params(
            "INSERT INTO alerts (title, description, severity, timestamp, location, status,
                 assigned_to, estimated_resolution)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING id",
            &[
                DatabaseValue::String(alert.title.clone()),
                DatabaseValue::String(alert.description.clone()),
                DatabaseValue::String(alert.severity.as_ref().to_string()),
                DatabaseValue::String(format_timestamp(at)),
                DatabaseValue::String(alert.location.clone()),
                DatabaseValue::String(alert.status.as_ref().to_string()),
                DatabaseValue::String(alert.assigned_to.clone()),
                DatabaseValue::String(alert.estimated_resolution.clone()),
            ],
        )
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

    first_i64(&rows, "id")
}

/// Inserts `alert` unless an active alert with the same title exists.
/// Returns the new ID, or `None` if it was skipped.
///
/// # Errors
///
/// Returns [`StoreError`] if a query fails.
pub async fn insert_if_not_active(
    db: &dyn Database,
    alert: &NewAlert,
    at: NaiveDateTime,
) -> Result<Option<i64>, StoreError> {
    if has_active_alert(db, &alert.title).await? {
        log::debug!("Active alert already open: {}", alert.title);
        return Ok(None);
    }
    let id = insert_alert(db, alert, at).await?;
    log::info!("Raised alert {id}: {}", alert.title);
    Ok(Some(id))
}

/// Whether an alert titled `title` is currently `active`.
///
/// # Errors
///
/// Returns [`StoreError`] if the query fails.
pub async fn has_active_alert(db: &dyn Database, title: &str) -> Result<bool, StoreError> {
    let rows = db
        .query_raw_params(
            "SELECT id FROM alerts WHERE title = $1 AND status = $2 LIMIT 1",
            &[
                DatabaseValue::String(title.to_string()),
                DatabaseValue::String(AlertStatus::Active.as_ref().to_string()),
            ],
        )
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

    Ok(!rows.is_empty())
}

/// Lists every alert, newest first.
///
/// # Errors
///
/// Returns [`StoreError`] if the query fails or a stored row is invalid.
pub async fn list_alerts(db: &dyn Database) -> Result<Vec<ApiAlert>, StoreError> {
    let rows = db
        .query_raw_params(&format!("{SELECT_ALERT} ORDER BY timestamp DESC, id DESC"), &[])
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

    rows.iter().map(row_to_alert).collect()
}

/// Loads one alert.
///
/// # Errors
///
/// Returns [`StoreError`] if the query fails or the stored row is invalid.
pub async fn get_alert(db: &dyn Database, id: i64) -> Result<Option<ApiAlert>, StoreError> {
    let rows = db
        .query_raw_params(
            &format!("{SELECT_ALERT} WHERE id = $1"),
            &[DatabaseValue::Int64(id)],
        )
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

    rows.first().map(row_to_alert).transpose()
}

/// Marks an alert resolved: status and severity become `resolved` and the
/// estimate becomes [`RESOLVED_ESTIMATE`]. Returns `None` for an unknown
/// ID.
///
/// # Errors
///
/// Returns [`StoreError`] if a query fails.
pub async fn resolve_alert(db: &dyn Database, id: i64) -> Result<Option<ApiAlert>, StoreError> {
    let updated = db
        .exec_raw_params(
            "UPDATE alerts SET status = $1, severity = $2, estimated_resolution = $3
             WHERE id = $4",
            &[
                DatabaseValue::String(AlertStatus::Resolved.as_ref().to_string()),
                DatabaseValue::String(AlertSeverity::Resolved.as_ref().to_string()),
                DatabaseValue::String(RESOLVED_ESTIMATE.to_string()),
                DatabaseValue::Int64(id),
            ],
        )
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

    if updated == 0 {
        return Ok(None);
    }
    get_alert(db, id).await
}

fn row_to_alert(row: &Row) -> Result<ApiAlert, StoreError> {
    let severity: String = row.to_value("severity").unwrap_or_default();
    let status: String = row.to_value("status").unwrap_or_default();

    Ok(ApiAlert {
        id: required_i64(row, "id")?,
        title: row.to_value("title").unwrap_or_default(),
        description: row.to_value("description").unwrap_or_default(),
        severity: severity.parse().map_err(|_| StoreError::Conversion {
            message: format!("unknown alert severity: {severity}"),
        })?,
        timestamp: row.to_value("timestamp").unwrap_or_default(),
        location: row.to_value("location").unwrap_or_default(),
        status: status.parse().map_err(|_| StoreError::Conversion {
            message: format!("unknown alert status: {status}"),
        })?,
        assigned_to: row.to_value("assigned_to").unwrap_or_default(),
        estimated_resolution: row.to_value("estimated_resolution").unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::{now, parse_timestamp, test_db};

    fn pollution_alert() -> NewAlert {
        NewAlert {
            title: "High Air Pollution".to_string(),
            description: "AQI levels are at 4 (Poor)".to_string(),
            severity: AlertSeverity::Warning,
            location: "City-wide".to_string(),
            status: AlertStatus::Active,
            assigned_to: "Environmental Team".to_string(),
            estimated_resolution: "2 hours".to_string(),
        }
    }

    #[tokio::test]
    async fn seeded_alerts_are_recent_and_newest_first() {
        let (db, dir) = test_db::open("alerts_seed").await;
        let alerts = list_alerts(db.as_ref()).await.unwrap();

        assert_eq!(alerts.len(), 8);
        let stamps: Vec<NaiveDateTime> = alerts
            .iter()
            .map(|a| parse_timestamp(&a.timestamp).unwrap())
            .collect();
        assert!(stamps.windows(2).all(|w| w[0] >= w[1]));
        let current = now();
        for stamp in &stamps {
            let age = current - *stamp;
            assert!(age >= Duration::minutes(4) && age <= Duration::minutes(241));
        }

        let resolved = alerts
            .iter()
            .filter(|a| a.severity == AlertSeverity::Resolved)
            .count();
        assert_eq!(resolved, 3);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn seeding_skips_non_empty_table() {
        let (db, dir) = test_db::open("alerts_reseed").await;
        let mut rng = StdRng::seed_from_u64(3);
        seed_alerts(db.as_ref(), &mut rng, now()).await.unwrap();
        assert_eq!(list_alerts(db.as_ref()).await.unwrap().len(), 8);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn resolve_updates_status_severity_and_estimate() {
        let (db, dir) = test_db::open("alerts_resolve").await;
        let id = insert_alert(db.as_ref(), &pollution_alert(), now())
            .await
            .unwrap();

        let resolved = resolve_alert(db.as_ref(), id).await.unwrap().unwrap();
        assert_eq!(resolved.id, id);
        assert_eq!(resolved.status, AlertStatus::Resolved);
        assert_eq!(resolved.severity, AlertSeverity::Resolved);
        assert_eq!(resolved.estimated_resolution, "Completed");
        assert_eq!(resolved.title, "High Air Pollution");

        let stored = get_alert(db.as_ref(), id).await.unwrap().unwrap();
        assert_eq!(stored, resolved);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn resolving_unknown_alert_returns_none() {
        let (db, dir) = test_db::open("alerts_unknown").await;
        assert!(resolve_alert(db.as_ref(), 9_999).await.unwrap().is_none());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn duplicate_active_alerts_are_skipped() {
        let (db, dir) = test_db::open("alerts_dedupe").await;
        let alert = pollution_alert();

        let first = insert_if_not_active(db.as_ref(), &alert, now()).await.unwrap();
        assert!(first.is_some());
        assert!(has_active_alert(db.as_ref(), &alert.title).await.unwrap());

        let second = insert_if_not_active(db.as_ref(), &alert, now()).await.unwrap();
        assert!(second.is_none());

        resolve_alert(db.as_ref(), first.unwrap()).await.unwrap();
        assert!(!has_active_alert(db.as_ref(), &alert.title).await.unwrap());
        let third = insert_if_not_active(db.as_ref(), &alert, now()).await.unwrap();
        assert!(third.is_some());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
