//! Alerts section: list, severity filter and the resolve action.

use std::str::FromStr;

use citypulse_city_models::AlertSeverity;
use citypulse_server_models::ApiAlert;
use serde::Serialize;

use crate::client::ApiClient;
use crate::error::FetchError;
use crate::fallback;
use crate::loaded::{Loaded, load_or_fallback};
use crate::state::ViewState;

/// Severity filter applied to the alert list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SeverityFilter {
    /// Show every alert.
    #[default]
    All,
    /// Show only alerts of one severity.
    Only(AlertSeverity),
}

impl SeverityFilter {
    /// Returns `true` if `alert` passes the filter.
    #[must_use]
    pub fn matches(self, alert: &ApiAlert) -> bool {
        match self {
            Self::All => true,
            Self::Only(severity) => alert.severity == severity,
        }
    }
}

impl FromStr for SeverityFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.to_ascii_lowercase()
            .parse()
            .map(Self::Only)
            .map_err(|_| format!("unknown severity filter: {s}"))
    }
}

/// Alert counts per severity, for the header badges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    /// Urgent alerts.
    pub urgent: usize,
    /// Warnings.
    pub warning: usize,
    /// Resolved alerts.
    pub resolved: usize,
}

/// Alerts passing `filter`, in list order.
#[must_use]
pub fn filter_alerts(alerts: &[ApiAlert], filter: SeverityFilter) -> Vec<&ApiAlert> {
    alerts.iter().filter(|a| filter.matches(a)).collect()
}

/// Counts alerts by severity.
#[must_use]
pub fn count_by_severity(alerts: &[ApiAlert]) -> SeverityCounts {
    alerts
        .iter()
        .fold(SeverityCounts::default(), |mut counts, alert| {
            match alert.severity {
                AlertSeverity::Urgent => counts.urgent += 1,
                AlertSeverity::Warning => counts.warning += 1,
                AlertSeverity::Resolved => counts.resolved += 1,
            }
            counts
        })
}

/// Replaces the alert with `updated.id` by `updated`. Any duplicate entries
/// with that ID are dropped so exactly one remains. Returns `false`, leaving
/// the list untouched, if no alert has that ID.
pub fn apply_resolved(alerts: &mut Vec<ApiAlert>, updated: ApiAlert) -> bool {
    let Some(pos) = alerts.iter().position(|a| a.id == updated.id) else {
        return false;
    };

    let id = updated.id;
    alerts[pos] = updated;

    let mut index = 0;
    alerts.retain(|a| {
        let keep = a.id != id || index == pos;
        index += 1;
        keep
    });
    true
}

/// Fetches the alert list.
pub async fn load(client: &ApiClient) -> Loaded<Vec<ApiAlert>> {
    load_or_fallback(
        "alerts",
        async { client.alerts().await },
        fallback::alerts,
    )
    .await
}

/// Resolves an alert on the server and patches the in-memory list with the
/// returned record. Nothing is changed locally until the server confirms.
///
/// # Errors
///
/// Returns the [`FetchError`] if the server call fails; the list is left
/// as it was.
pub async fn resolve(
    client: &ApiClient,
    state: &ViewState<Loaded<Vec<ApiAlert>>>,
    id: i64,
) -> Result<ApiAlert, FetchError> {
    match client.resolve_alert(id).await {
        Ok(updated) => {
            let replaced = state
                .update(|loaded| apply_resolved(&mut loaded.data, updated.clone()))
                .unwrap_or(false);
            if !replaced {
                log::warn!("Resolved alert {id} is not in the loaded list");
            }
            Ok(updated)
        }
        Err(e) => {
            log::error!("Failed to resolve alert {id}: {e}");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use citypulse_city_models::AlertStatus;

    use crate::testing::StubTransport;

    use super::*;

    fn resolved_json(id: i64) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "title": "Air Quality Alert",
            "description": "AQI levels above recommended threshold in Industrial Zone",
            "severity": "resolved",
            "timestamp": "2025-01-01 09:00:00",
            "location": "Industrial Zone - Sector 7",
            "status": "resolved",
            "assignedTo": "Environmental Team",
            "estimatedResolution": "Completed"
        })
    }

    fn loaded_state() -> ViewState<Loaded<Vec<ApiAlert>>> {
        let state = ViewState::default();
        let ticket = state.begin();
        state.apply(ticket, Loaded::live(fallback::alerts()));
        state
    }

    #[test]
    fn parses_filters() {
        assert_eq!("all".parse::<SeverityFilter>().unwrap(), SeverityFilter::All);
        assert_eq!(
            "Urgent".parse::<SeverityFilter>().unwrap(),
            SeverityFilter::Only(AlertSeverity::Urgent)
        );
        assert!("loud".parse::<SeverityFilter>().is_err());
    }

    #[test]
    fn filters_and_counts_demo_alerts() {
        let alerts = fallback::alerts();
        let counts = count_by_severity(&alerts);
        assert_eq!(
            counts,
            SeverityCounts {
                urgent: 2,
                warning: 3,
                resolved: 3
            }
        );
        let urgent = filter_alerts(&alerts, SeverityFilter::Only(AlertSeverity::Urgent));
        assert_eq!(urgent.len(), 2);
        assert_eq!(filter_alerts(&alerts, SeverityFilter::All).len(), 8);
    }

    #[test]
    fn apply_resolved_dedupes() {
        let mut alerts = fallback::alerts();
        alerts.push(alerts[1].clone());
        let updated: ApiAlert = serde_json::from_value(resolved_json(2)).unwrap();

        assert!(apply_resolved(&mut alerts, updated));
        let matching: Vec<&ApiAlert> = alerts.iter().filter(|a| a.id == 2).collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].status, AlertStatus::Resolved);
        assert_eq!(alerts.len(), 8);
    }

    #[test]
    fn apply_resolved_ignores_unknown_id() {
        let mut alerts = fallback::alerts();
        let updated: ApiAlert = serde_json::from_value(resolved_json(99)).unwrap();
        assert!(!apply_resolved(&mut alerts, updated));
        assert_eq!(alerts, fallback::alerts());
    }

    #[tokio::test]
    async fn resolve_replaces_entry_with_server_record() {
        let stub = StubTransport::new().with_json("/api/alerts/2/resolve", resolved_json(2));
        let client = ApiClient::new(Arc::new(stub));
        let state = loaded_state();

        let updated = resolve(&client, &state, 2).await.unwrap();
        let alerts = state.get().unwrap().data;
        let matching: Vec<&ApiAlert> = alerts.iter().filter(|a| a.id == 2).collect();
        assert_eq!(matching.len(), 1);
        assert_eq!(matching[0].status, updated.status);
        assert_eq!(matching[0].estimated_resolution, "Completed");
    }

    #[tokio::test]
    async fn failed_resolve_leaves_state_unchanged() {
        let stub = StubTransport::new().with_status("/api/alerts/2/resolve", 500);
        let client = ApiClient::new(Arc::new(stub));
        let state = loaded_state();

        assert!(resolve(&client, &state, 2).await.is_err());
        assert_eq!(state.get().unwrap().data, fallback::alerts());
    }
}
