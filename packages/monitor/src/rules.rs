//! Threshold rules that raise operational alerts.
//!
//! Rules look only at the latest reading of each kind. A rule that fires
//! while an active alert with the same title is open is skipped.

use chrono::{Duration, Local};
use citypulse_city_models::{AlertSeverity, AlertStatus};
use citypulse_database::alerts::{self, NewAlert};
use citypulse_database::readings::{self, AirSample, ElectricitySample, TrafficSample, WaterSample};
use citypulse_feedback::NegativeSpike;

use crate::{Monitor, MonitorError};

/// AQI at or above which air pollution is flagged.
pub const AQI_THRESHOLD: u8 = 4;

/// Current over free-flow travel time above which traffic is flagged.
pub const CONGESTION_THRESHOLD: f64 = 1.5;

/// Complaints in the last hour above which volume is flagged.
pub const COMPLAINT_THRESHOLD: u64 = 10;

/// Grid consumption above which strain is flagged.
pub const POWER_THRESHOLD_MW: f64 = 25_000.0;

/// Latest state the rules are evaluated against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Observations {
    pub air: Option<AirSample>,
    pub traffic: Option<TrafficSample>,
    /// Complaints recorded in the last hour.
    pub recent_complaints: u64,
    pub power: Option<ElectricitySample>,
    pub water: Option<WaterSample>,
    /// Negative feedback share, when there is enough feedback to judge.
    pub sentiment: Option<NegativeSpike>,
}

fn active(
    title: &str,
    description: String,
    severity: AlertSeverity,
    location: &str,
    assigned_to: &str,
    estimated_resolution: &str,
) -> NewAlert {
    NewAlert {
        title: title.to_string(),
        description,
        severity,
        location: location.to_string(),
        status: AlertStatus::Active,
        assigned_to: assigned_to.to_string(),
        estimated_resolution: estimated_resolution.to_string(),
    }
}

/// Alerts the observations call for, in rule order.
#[must_use]
pub fn evaluate(obs: &Observations) -> Vec<NewAlert> {
    let mut raised = Vec::new();

    if let Some(air) = &obs.air
        && let Some(aqi) = air.aqi
        && aqi >= AQI_THRESHOLD
    {
        raised.push(active(
            "High Air Pollution",
            format!("AQI levels are at {aqi} ({})", air.description),
            AlertSeverity::Warning,
            "City-wide",
            "Environmental Team",
            "2 hours",
        ));
    }

    if let Some(ratio) = obs.traffic.as_ref().and_then(TrafficSample::congestion_ratio)
        && ratio > CONGESTION_THRESHOLD
    {
        raised.push(active(
            "High Traffic Congestion",
            format!("Traffic is {:.0}% of free-flow speed.", ratio * 100.0),
            AlertSeverity::Urgent,
            "Downtown District",
            "Traffic Control",
            "45 minutes",
        ));
    }

    if obs.recent_complaints > COMPLAINT_THRESHOLD {
        raised.push(active(
            "High Complaint Volume",
            format!("{} new complaints in the last hour.", obs.recent_complaints),
            AlertSeverity::Warning,
            "City-wide",
            "Public Grievance Team",
            "Investigating",
        ));
    }

    if let Some(mw) = obs.power.as_ref().and_then(|p| p.consumption_mw)
        && mw > POWER_THRESHOLD_MW
    {
        raised.push(active(
            "Power Grid Strain",
            "Total power consumption has exceeded 25,000 MW.".to_string(),
            AlertSeverity::Warning,
            "IN-WE Grid",
            "Power Grid Team",
            "Monitoring",
        ));
    }

    if let Some(water) = &obs.water
        && water.condition.contains("High")
    {
        raised.push(active(
            "High Water Consumption",
            format!(
                "Water usage at {} ML, exceeding normal levels.",
                water.usage_ml
            ),
            AlertSeverity::Warning,
            "City Water Supply",
            "Water Management",
            "1 hour",
        ));
    }

    if let Some(spike) = obs.sentiment
        && spike.is_spike()
    {
        raised.push(active(
            "Spike in Negative Sentiment",
            format!(
                "Negative sentiment is at {:.0}% in the last 24h, a significant increase.",
                spike.recent_percent
            ),
            AlertSeverity::Urgent,
            "Public Feedback Channels",
            "PR Department",
            "Under Review",
        ));
    }

    raised
}

impl Monitor {
    /// Gathers the latest readings, recent complaint volume and the
    /// feedback sentiment balance.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError`] if the store or the feedback file cannot
    /// be read.
    pub async fn observe(&self) -> Result<Observations, MonitorError> {
        let db = self.db();
        let hour_ago = citypulse_database::now() - Duration::hours(1);

        let local_now = Local::now().naive_local();
        let feedback = citypulse_feedback::load(&self.config.feedback_path, local_now)?;

        Ok(Observations {
            air: readings::latest_air(db).await?,
            traffic: readings::latest_traffic(db).await?,
            recent_complaints: readings::count_complaints_since(db, hour_ago).await?,
            power: readings::latest_electricity(db).await?,
            water: readings::latest_water(db).await?,
            sentiment: feedback.negative_spike(local_now),
        })
    }

    /// Evaluates every rule and stores the alerts that are not already
    /// active. Returns the IDs of the new alerts.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError`] if observations cannot be gathered or an
    /// alert cannot be stored.
    pub async fn check_alerts(&self) -> Result<Vec<i64>, MonitorError> {
        let observations = self.observe().await?;
        let now = citypulse_database::now();

        let mut created = Vec::new();
        for alert in evaluate(&observations) {
            if let Some(id) = alerts::insert_if_not_active(self.db(), &alert, now).await? {
                created.push(id);
            }
        }

        log::debug!("Alert check raised {} alert(s)", created.len());
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;

    fn at() -> NaiveDateTime {
        citypulse_database::parse_timestamp("2025-01-01 08:00:00").unwrap()
    }

    fn titles(obs: &Observations) -> Vec<String> {
        evaluate(obs).into_iter().map(|a| a.title).collect()
    }

    fn air(aqi: Option<u8>) -> AirSample {
        AirSample {
            timestamp: at(),
            aqi,
            description: citypulse_city_models::AqiLevel::label_for(aqi),
        }
    }

    fn traffic(current: f64, free: f64) -> TrafficSample {
        TrafficSample {
            timestamp: at(),
            current_travel_time: Some(current),
            free_flow_travel_time: Some(free),
        }
    }

    #[test]
    fn quiet_observations_raise_nothing() {
        let obs = Observations {
            air: Some(air(Some(3))),
            traffic: Some(traffic(300.0, 200.0)),
            recent_complaints: 10,
            power: Some(ElectricitySample {
                timestamp: at(),
                zone: "IN-WE".to_string(),
                consumption_mw: Some(25_000.0),
            }),
            water: Some(WaterSample {
                timestamp: at(),
                usage_ml: 2.5,
                condition: "Normal range".to_string(),
            }),
            sentiment: Some(NegativeSpike {
                recent_percent: 25.0,
                baseline_percent: 20.0,
            }),
        };
        assert!(evaluate(&obs).is_empty());
        assert!(evaluate(&Observations::default()).is_empty());
    }

    #[test]
    fn poor_air_raises_warning() {
        let obs = Observations {
            air: Some(air(Some(4))),
            ..Observations::default()
        };
        let raised = evaluate(&obs);
        assert_eq!(raised.len(), 1);
        assert_eq!(raised[0].title, "High Air Pollution");
        assert_eq!(raised[0].description, "AQI levels are at 4 (Poor)");
        assert_eq!(raised[0].severity, AlertSeverity::Warning);
        assert_eq!(raised[0].status, AlertStatus::Active);
        assert_eq!(raised[0].assigned_to, "Environmental Team");
    }

    #[test]
    fn congestion_above_ratio_is_urgent() {
        let obs = Observations {
            traffic: Some(traffic(330.0, 200.0)),
            ..Observations::default()
        };
        let raised = evaluate(&obs);
        assert_eq!(raised[0].title, "High Traffic Congestion");
        assert_eq!(raised[0].description, "Traffic is 165% of free-flow speed.");
        assert_eq!(raised[0].severity, AlertSeverity::Urgent);
        assert_eq!(raised[0].estimated_resolution, "45 minutes");
    }

    #[test]
    fn each_threshold_fires_its_rule() {
        let obs = Observations {
            air: Some(air(Some(5))),
            traffic: Some(traffic(400.0, 200.0)),
            recent_complaints: 11,
            power: Some(ElectricitySample {
                timestamp: at(),
                zone: "IN-WE".to_string(),
                consumption_mw: Some(26_000.0),
            }),
            water: Some(WaterSample {
                timestamp: at(),
                usage_ml: 2.95,
                condition: "High".to_string(),
            }),
            sentiment: Some(NegativeSpike {
                recent_percent: 45.0,
                baseline_percent: 30.0,
            }),
        };
        assert_eq!(
            titles(&obs),
            vec![
                "High Air Pollution",
                "High Traffic Congestion",
                "High Complaint Volume",
                "Power Grid Strain",
                "High Water Consumption",
                "Spike in Negative Sentiment",
            ]
        );

        let raised = evaluate(&obs);
        assert_eq!(raised[2].description, "11 new complaints in the last hour.");
        assert_eq!(
            raised[4].description,
            "Water usage at 2.95 ML, exceeding normal levels."
        );
        assert_eq!(
            raised[5].description,
            "Negative sentiment is at 45% in the last 24h, a significant increase."
        );
    }

    #[tokio::test]
    async fn check_alerts_skips_open_duplicates() {
        let (monitor, dir) = crate::test_monitor::open("rules_dedupe").await;
        readings::record_air(monitor.db(), &air(Some(5))).await.unwrap();
        readings::record_traffic(monitor.db(), &traffic(100.0, 200.0))
            .await
            .unwrap();

        let first = monitor.check_alerts().await.unwrap();
        assert_eq!(first.len(), 1);
        let second = monitor.check_alerts().await.unwrap();
        assert!(second.is_empty());

        let stored = alerts::get_alert(monitor.db(), first[0]).await.unwrap().unwrap();
        assert_eq!(stored.title, "High Air Pollution");
        assert_eq!(stored.status, AlertStatus::Active);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
