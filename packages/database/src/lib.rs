#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `SQLite` storage for the CityPulse analytics service.
//!
//! Holds the monitored zones, operational alerts and the raw readings the
//! collectors record. Uses `switchy_database` for every query; timestamps
//! are stored as UTC `%Y-%m-%d %H:%M:%S` strings so they sort and compare
//! lexically.

pub mod alerts;
pub mod readings;
pub mod zones;

use std::path::Path;

use chrono::{NaiveDateTime, Utc};
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, Row};
use switchy_database_connection::init_sqlite_rusqlite;
use thiserror::Error;

/// Default location of the database file.
pub const DEFAULT_DB_PATH: &str = "data/citypulse.db";

/// Environment variable overriding [`DEFAULT_DB_PATH`].
pub const DATABASE_PATH_ENV: &str = "DATABASE_PATH";

/// Format of every stored timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A database query or command failed.
    #[error("Database error: {0}")]
    Database(String),

    /// An I/O operation failed (e.g., creating the database directory).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored value could not be converted back into its type.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

/// Reads a required integer `column` from `row`.
pub(crate) fn required_i64(row: &Row, column: &str) -> Result<i64, StoreError> {
    row.to_value(column).map_err(|e| StoreError::Conversion {
        message: format!("missing or non-integer {column} column: {e:?}"),
    })
}

/// Reads a required integer `column` from the first of `rows`, as
/// returned by `COUNT(*)` or `RETURNING id`.
pub(crate) fn first_i64(rows: &[Row], column: &str) -> Result<i64, StoreError> {
    let row = rows.first().ok_or_else(|| StoreError::Conversion {
        message: format!("query returned no row for {column}"),
    })?;
    required_i64(row, column)
}

/// Resolves the database path from `lookup` (normally `std::env::var`).
pub fn database_path(lookup: impl Fn(&str) -> Option<String>) -> String {
    lookup(DATABASE_PATH_ENV)
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DB_PATH.to_string())
}

/// Opens (or creates) the database, ensures the schema exists and seeds
/// the default zones and alerts into empty tables.
///
/// # Errors
///
/// Returns [`StoreError`] if the database cannot be opened, or schema
/// creation or seeding fails.
pub async fn open_db(path: &Path) -> Result<Box<dyn Database>, StoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let db = init_sqlite_rusqlite(Some(path)).map_err(|e| StoreError::Database(e.to_string()))?;

    ensure_schema(db.as_ref()).await?;
    zones::seed_zones(db.as_ref()).await?;
    alerts::seed_alerts(db.as_ref(), &mut rand::thread_rng(), now()).await?;

    log::info!("Opened database at {}", path.display());
    Ok(db)
}

/// Creates all tables if they don't already exist.
async fn ensure_schema(db: &dyn Database) -> Result<(), StoreError> {
    const STATEMENTS: &[&str] = &[
        "CREATE TABLE IF NOT EXISTS zones (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            name          TEXT NOT NULL UNIQUE,
            priority      TEXT NOT NULL,
            position_top  TEXT NOT NULL,
            position_left TEXT NOT NULL,
            latitude      REAL NOT NULL,
            longitude     REAL NOT NULL
        )",
        "CREATE TABLE IF NOT EXISTS alerts (
            id                   INTEGER PRIMARY KEY AUTOINCREMENT,
            title                TEXT NOT NULL,
            description          TEXT NOT NULL,
            severity             TEXT NOT NULL,
            timestamp            TEXT NOT NULL,
            location             TEXT NOT NULL,
            status               TEXT NOT NULL,
            assigned_to          TEXT NOT NULL,
            estimated_resolution TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_alerts_timestamp ON alerts (timestamp)",
        "CREATE TABLE IF NOT EXISTS traffic_readings (
            id                    INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp             TEXT NOT NULL,
            current_travel_time   REAL,
            free_flow_travel_time REAL
        )",
        "CREATE TABLE IF NOT EXISTS electricity_readings (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp      TEXT NOT NULL,
            zone           TEXT NOT NULL,
            consumption_mw REAL
        )",
        "CREATE TABLE IF NOT EXISTS water_readings (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp TEXT NOT NULL,
            usage_ml  REAL NOT NULL,
            condition TEXT NOT NULL
        )",
        "CREATE TABLE IF NOT EXISTS air_quality_readings (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp   TEXT NOT NULL,
            aqi         INTEGER,
            description TEXT NOT NULL
        )",
        "CREATE TABLE IF NOT EXISTS complaints (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            timestamp   TEXT NOT NULL,
            category    TEXT NOT NULL,
            description TEXT NOT NULL,
            status      TEXT NOT NULL
        )",
        "CREATE INDEX IF NOT EXISTS idx_complaints_timestamp ON complaints (timestamp)",
    ];

    for statement in STATEMENTS {
        db.exec_raw(statement)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;
    }

    Ok(())
}

/// Current UTC time without an offset, as stored.
#[must_use]
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Formats a timestamp the way it is stored.
#[must_use]
pub fn format_timestamp(t: NaiveDateTime) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a stored timestamp.
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).ok()
}
