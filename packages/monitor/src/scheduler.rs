//! Background polling of every collector.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use crate::air::DEFAULT_AIR_POINT;
use crate::{Monitor, MonitorError};

/// A periodic collection task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    Traffic,
    Electricity,
    Air,
    Water,
    Complaints,
    Alerts,
}

impl Job {
    /// Every job, in start order.
    pub const ALL: [Self; 6] = [
        Self::Traffic,
        Self::Electricity,
        Self::Air,
        Self::Water,
        Self::Complaints,
        Self::Alerts,
    ];

    /// Time between runs.
    #[must_use]
    pub const fn period(self) -> Duration {
        let minutes = match self {
            Self::Traffic | Self::Electricity | Self::Alerts => 5,
            Self::Air => 10,
            Self::Water => 3,
            Self::Complaints => 7,
        };
        Duration::from_secs(minutes * 60)
    }

    /// Name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Traffic => "traffic",
            Self::Electricity => "electricity",
            Self::Air => "air quality",
            Self::Water => "water",
            Self::Complaints => "complaints",
            Self::Alerts => "alert check",
        }
    }
}

/// Runs one job once.
///
/// # Errors
///
/// Returns whatever the underlying collector returns.
pub async fn run_job(monitor: &Monitor, job: Job) -> Result<(), MonitorError> {
    match job {
        Job::Traffic => monitor.traffic().await.map(drop),
        Job::Electricity => monitor.electricity().await.map(drop),
        Job::Air => monitor
            .air(DEFAULT_AIR_POINT.0, DEFAULT_AIR_POINT.1)
            .await
            .map(drop),
        Job::Water => monitor.water().await.map(drop),
        Job::Complaints => monitor.complaints().await.map(drop),
        Job::Alerts => monitor.check_alerts().await.map(drop),
    }
}

/// Spawns one task per [`Job`]. Each first runs one full period after
/// start, then every period; a failed run is logged and retried on the
/// next tick.
#[must_use]
pub fn spawn(monitor: Arc<Monitor>) -> Vec<JoinHandle<()>> {
    Job::ALL
        .into_iter()
        .map(|job| {
            let monitor = Arc::clone(&monitor);
            tokio::spawn(async move {
                let period = job.period();
                let mut interval = interval_at(Instant::now() + period, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    interval.tick().await;
                    match run_job(&monitor, job).await {
                        Ok(()) => log::debug!("Scheduled {} run finished", job.name()),
                        Err(e) => log::error!("Scheduled {} run failed: {e}", job.name()),
                    }
                }
            })
        })
        .collect()
}
