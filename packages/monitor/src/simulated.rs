//! Simulated water usage and citizen complaints.

use chrono::NaiveDateTime;
use citypulse_database::readings::{self, Complaint, WaterSample};
use citypulse_server_models::{ComplaintEntry, ComplaintsReading, WaterReading};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::{Monitor, MonitorError, round2};

/// Complaint categories.
pub const CATEGORIES: &[&str] = &[
    "Roads",
    "Water Supply",
    "Electricity",
    "Garbage",
    "Public Transport",
    "Noise",
];

/// Complaint descriptions.
pub const SAMPLE_COMPLAINTS: &[&str] = &[
    "Potholes causing traffic jams",
    "Street lights not working",
    "Water leakage near colony",
    "Uncollected garbage in street",
    "Frequent electricity cuts",
    "Broken bus stop shelter",
    "High noise from construction at night",
];

/// Complaint statuses.
pub const COMPLAINT_STATUSES: &[&str] = &["Open", "In Progress", "Resolved"];

/// Complaints generated per collection.
pub const COMPLAINTS_PER_BATCH: usize = 5;

/// Condition label for a usage in megalitres.
#[must_use]
pub fn water_condition(usage_ml: f64) -> &'static str {
    if usage_ml > 2.8 {
        "High"
    } else if usage_ml < 2.2 {
        "Low"
    } else {
        "Normal range"
    }
}

/// Draws a usage between 2.0 and 3.0 ML.
pub fn water_sample<R: Rng + ?Sized>(rng: &mut R, timestamp: NaiveDateTime) -> WaterSample {
    let usage_ml = round2(rng.gen_range(2.0..=3.0));
    WaterSample {
        timestamp,
        usage_ml,
        condition: water_condition(usage_ml).to_string(),
    }
}

/// Draws [`COMPLAINTS_PER_BATCH`] complaints.
pub fn complaint_batch<R: Rng + ?Sized>(rng: &mut R, timestamp: NaiveDateTime) -> Vec<Complaint> {
    let mut pick = |options: &[&str]| {
        options
            .choose(&mut *rng)
            .copied()
            .unwrap_or_default()
            .to_string()
    };
    (0..COMPLAINTS_PER_BATCH)
        .map(|_| Complaint {
            timestamp,
            category: pick(CATEGORIES),
            description: pick(SAMPLE_COMPLAINTS),
            status: pick(COMPLAINT_STATUSES),
        })
        .collect()
}

impl Monitor {
    /// Simulates a water reading and records it.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Store`] if the reading cannot be stored.
    pub async fn water(&self) -> Result<WaterReading, MonitorError> {
        let sample = water_sample(&mut rand::thread_rng(), citypulse_database::now());
        readings::record_water(self.db(), &sample).await?;

        Ok(WaterReading {
            water_usage: format!("{} ML", sample.usage_ml),
            condition: sample.condition,
        })
    }

    /// Simulates a batch of complaints and records them.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::Store`] if a complaint cannot be stored.
    pub async fn complaints(&self) -> Result<ComplaintsReading, MonitorError> {
        let batch = complaint_batch(&mut rand::thread_rng(), citypulse_database::now());

        let mut complaints = Vec::with_capacity(batch.len());
        for complaint in batch {
            readings::record_complaint(self.db(), &complaint).await?;
            complaints.push(ComplaintEntry {
                category: complaint.category,
                description: complaint.description,
                status: complaint.status,
                timestamp: citypulse_database::format_timestamp(complaint.timestamp),
            });
        }

        Ok(ComplaintsReading {
            count: complaints.len(),
            complaints,
        })
    }
}
