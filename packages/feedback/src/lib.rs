#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Citizen feedback for the sentiment endpoints.
//!
//! Feedback lives in a CSV file with `id,text,timestamp` columns. Each row
//! is classified with a keyword model ([`classify`]) and aggregated over a
//! look-back window ([`analysis`]). [`generate`] writes a synthetic file
//! for development.

pub mod analysis;
pub mod classify;
pub mod generate;

use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use analysis::{Feedback, FeedbackSet, NegativeSpike};

/// Default location of the feedback file.
pub const DEFAULT_FEEDBACK_PATH: &str = "data/feedback_synthetic.csv";

/// Environment variable overriding [`DEFAULT_FEEDBACK_PATH`].
pub const FEEDBACK_CSV_ENV: &str = "FEEDBACK_CSV";

/// Timestamp format used in the feedback file.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors from reading or writing feedback files.
#[derive(Debug, Error)]
pub enum FeedbackError {
    /// Opening or creating the file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// One row of the feedback file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    /// Row ID.
    #[serde(default)]
    pub id: u64,
    /// Free-text feedback.
    #[serde(default)]
    pub text: String,
    /// `%Y-%m-%d %H:%M:%S` local time.
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl FeedbackRecord {
    /// Parses the row timestamp. Missing or unparseable timestamps resolve
    /// to `now`.
    #[must_use]
    pub fn timestamp_or(&self, now: NaiveDateTime) -> NaiveDateTime {
        match self.timestamp.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => {
                NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).unwrap_or_else(|e| {
                    log::warn!("Feedback {}: bad timestamp {raw:?} ({e})", self.id);
                    now
                })
            }
            _ => now,
        }
    }
}

/// Resolves the feedback file path from an environment lookup.
#[must_use]
pub fn feedback_path(lookup: impl Fn(&str) -> Option<String>) -> String {
    lookup(FEEDBACK_CSV_ENV).unwrap_or_else(|| DEFAULT_FEEDBACK_PATH.to_string())
}

/// Reads feedback rows from `path`. A missing file yields no rows.
///
/// # Errors
///
/// Returns [`FeedbackError`] if the file exists but cannot be read or
/// parsed.
pub fn read_records(path: &Path) -> Result<Vec<FeedbackRecord>, FeedbackError> {
    if !path.exists() {
        log::debug!("No feedback file at {}", path.display());
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut records = Vec::new();
    for result in reader.deserialize() {
        records.push(result?);
    }

    log::debug!("Read {} feedback rows from {}", records.len(), path.display());
    Ok(records)
}

/// Reads and classifies the feedback file.
///
/// # Errors
///
/// See [`read_records`].
pub fn load(path: &Path, now: NaiveDateTime) -> Result<FeedbackSet, FeedbackError> {
    Ok(FeedbackSet::from_records(read_records(path)?, now))
}

/// Writes rows to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`FeedbackError`] if the file cannot be created or written.
pub fn write_records(path: &Path, records: &[FeedbackRecord]) -> Result<(), FeedbackError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
