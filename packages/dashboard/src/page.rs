//! The single-page dashboard: every section's state plus navigation.

use std::sync::Mutex;
use std::time::Instant;

use citypulse_city_models::Section;
use citypulse_server_models::{ApiAlert, ApiZone};
use serde::Serialize;

use crate::client::ApiClient;
use crate::config::DashboardConfig;
use crate::error::FetchError;
use crate::loaded::Loaded;
use crate::sections::{ScrollTracker, SectionBounds};
use crate::state::ViewState;
use crate::views::analytics::AnalyticsData;
use crate::views::overview::MetricSnapshot;
use crate::views::reports::ReportCatalog;
use crate::views::sentiment::{SentimentData, TIME_RANGES};
use crate::views::zones::ZoneMap;
use crate::views::{alerts, analytics, overview, sentiment, zones};

/// Point-in-time copy of every loaded section.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    /// Highlighted navigation section.
    pub active_section: Section,
    /// Sentiment time range in days.
    pub sentiment_days: u32,
    /// Overview cards.
    pub overview: Option<Loaded<Vec<MetricSnapshot>>>,
    /// Forecast.
    pub analytics: Option<Loaded<AnalyticsData>>,
    /// Zone map.
    pub zones: Option<Loaded<ZoneMap>>,
    /// Selected zone.
    pub selected_zone: Option<ApiZone>,
    /// Sentiment.
    pub sentiment: Option<Loaded<SentimentData>>,
    /// Alerts.
    pub alerts: Option<Loaded<Vec<ApiAlert>>>,
}

/// Owns one [`ViewState`] per section and the navigation state.
#[derive(Debug)]
pub struct DashboardPage {
    client: ApiClient,
    overview: ViewState<Loaded<Vec<MetricSnapshot>>>,
    analytics: ViewState<Loaded<AnalyticsData>>,
    zones: ViewState<Loaded<ZoneMap>>,
    sentiment: ViewState<Loaded<SentimentData>>,
    alerts: ViewState<Loaded<Vec<ApiAlert>>>,
    sentiment_days: Mutex<u32>,
    selected_zone: Mutex<Option<i64>>,
    scroll: Mutex<ScrollTracker>,
    reports: Mutex<ReportCatalog>,
}

impl DashboardPage {
    /// Creates a page with nothing loaded yet.
    #[must_use]
    pub fn new(client: ApiClient, config: &DashboardConfig) -> Self {
        Self {
            client,
            overview: ViewState::default(),
            analytics: ViewState::default(),
            zones: ViewState::default(),
            sentiment: ViewState::default(),
            alerts: ViewState::default(),
            sentiment_days: Mutex::new(config.default_days),
            selected_zone: Mutex::new(None),
            scroll: Mutex::new(ScrollTracker::new(
                config.scroll_offset,
                config.scroll_throttle(),
            )),
            reports: Mutex::new(ReportCatalog::default()),
        }
    }

    /// Reloads every section concurrently. Each section succeeds or falls
    /// back on its own.
    pub async fn refresh_all(&self) {
        tokio::join!(
            self.refresh_overview(),
            self.refresh_analytics(),
            self.refresh_zones(),
            self.refresh_sentiment(),
            self.refresh_alerts(),
        );
    }

    /// Reloads the overview cards.
    pub async fn refresh_overview(&self) {
        let ticket = self.overview.begin();
        self.overview.apply(ticket, overview::load(&self.client).await);
    }

    /// Reloads the forecast.
    pub async fn refresh_analytics(&self) {
        let ticket = self.analytics.begin();
        self.analytics
            .apply(ticket, analytics::load(&self.client).await);
    }

    /// Reloads the zone map.
    pub async fn refresh_zones(&self) {
        let ticket = self.zones.begin();
        self.zones.apply(ticket, zones::load(&self.client).await);
    }

    /// Reloads sentiment for the current time range.
    pub async fn refresh_sentiment(&self) {
        let days = self.sentiment_days();
        let ticket = self.sentiment.begin();
        self.sentiment
            .apply(ticket, sentiment::load(&self.client, days).await);
    }

    /// Reloads the alert list.
    pub async fn refresh_alerts(&self) {
        let ticket = self.alerts.begin();
        self.alerts.apply(ticket, alerts::load(&self.client).await);
    }

    /// Current sentiment time range.
    pub fn sentiment_days(&self) -> u32 {
        *self
            .sentiment_days
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Switches the sentiment time range and reloads. Ranges other than
    /// 7, 30 and 90 days are ignored. Returns whether the range changed.
    pub async fn set_time_range(&self, days: u32) -> bool {
        if !TIME_RANGES.contains(&days) {
            log::warn!("Ignoring unsupported time range {days}");
            return false;
        }
        *self
            .sentiment_days
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = days;
        self.refresh_sentiment().await;
        true
    }

    /// Resolves an alert through the service and patches the list.
    ///
    /// # Errors
    ///
    /// Returns the [`FetchError`] if the service call fails.
    pub async fn resolve_alert(&self, id: i64) -> Result<ApiAlert, FetchError> {
        alerts::resolve(&self.client, &self.alerts, id).await
    }

    /// Selects a zone on the map. Returns it, or `None` (clearing the
    /// selection) if no loaded zone has that ID.
    pub fn select_zone(&self, id: i64) -> Option<ApiZone> {
        let zone = self
            .zones
            .get()
            .and_then(|loaded| loaded.data.find(id).cloned());
        *self
            .selected_zone
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = zone.as_ref().map(|z| z.id);
        zone
    }

    /// Jumps to a section from the navigation bar.
    pub fn navigate(&self, section: Section) {
        self.scroll
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .navigate(section);
    }

    /// Handles a scroll event; returns the highlighted section.
    pub fn on_scroll(&self, bounds: &[SectionBounds], scroll_y: f64) -> Section {
        self.scroll
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .on_scroll(bounds, scroll_y, Instant::now())
    }

    /// Called once scrolling goes idle; applies the last throttled event.
    pub fn settle_scroll(&self, bounds: &[SectionBounds]) -> Section {
        self.scroll
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .settle(bounds)
    }

    /// Runs `f` against the report catalog.
    pub fn with_reports<R>(&self, f: impl FnOnce(&mut ReportCatalog) -> R) -> R {
        f(&mut self
            .reports
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner))
    }

    /// Copies out the current state of every section.
    pub fn snapshot(&self) -> DashboardSnapshot {
        let zones = self.zones.get();
        let selected_id = *self
            .selected_zone
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let selected_zone = selected_id.and_then(|id| {
            zones
                .as_ref()
                .and_then(|loaded| loaded.data.find(id).cloned())
        });

        DashboardSnapshot {
            active_section: self
                .scroll
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .active(),
            sentiment_days: self.sentiment_days(),
            overview: self.overview.get(),
            analytics: self.analytics.get(),
            zones,
            selected_zone,
            sentiment: self.sentiment.get(),
            alerts: self.alerts.get(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use crate::fallback;
    use crate::testing::StubTransport;

    use super::*;

    fn page(stub: &StubTransport) -> DashboardPage {
        DashboardPage::new(
            ApiClient::new(Arc::new(stub.clone())),
            &DashboardConfig::default(),
        )
    }

    #[tokio::test]
    async fn offline_page_is_all_fallback() {
        let stub = StubTransport::new();
        let page = page(&stub);
        page.refresh_all().await;

        let snapshot = page.snapshot();
        assert!(snapshot.overview.unwrap().is_fallback());
        assert!(snapshot.analytics.unwrap().is_fallback());
        assert!(snapshot.zones.unwrap().is_fallback());
        assert!(snapshot.sentiment.unwrap().is_fallback());
        assert_eq!(snapshot.alerts.unwrap().data, fallback::alerts());
        assert_eq!(snapshot.sentiment_days, 30);
        assert_eq!(snapshot.active_section, Section::Dashboard);
    }

    #[tokio::test]
    async fn time_range_change_refetches() {
        let stub = StubTransport::new();
        let page = page(&stub);

        assert!(page.set_time_range(7).await);
        assert_eq!(page.sentiment_days(), 7);
        assert!(
            stub.requests()
                .contains(&"GET /api/sentiment/summary?days=7".to_string())
        );

        assert!(!page.set_time_range(14).await);
        assert_eq!(page.sentiment_days(), 7);
    }

    #[test]
    fn scroll_settles_after_fling() {
        let stub = StubTransport::new();
        let page = page(&stub);
        let bounds: Vec<SectionBounds> = Section::ALL
            .iter()
            .zip(0_u32..)
            .map(|(section, i)| SectionBounds {
                section: *section,
                top: f64::from(i) * 800.0,
                height: 800.0,
            })
            .collect();

        assert_eq!(page.on_scroll(&bounds, 0.0), Section::Dashboard);
        page.on_scroll(&bounds, 3300.0);
        assert_eq!(page.settle_scroll(&bounds), Section::Alerts);
        assert_eq!(page.snapshot().active_section, Section::Alerts);
    }

    #[tokio::test]
    async fn selects_loaded_zone() {
        let stub = StubTransport::new().with_json(
            "/zones",
            json!([{
                "id": 3,
                "name": "Eco Park Zone",
                "priority": "eco",
                "position": { "top": "25%", "left": "70%" },
                "aqi": 2,
                "complaints": 3,
                "waterUsage": 70,
                "recommendations": ["All systems operating within normal parameters."]
            }]),
        );
        let page = page(&stub);
        page.refresh_zones().await;

        assert_eq!(page.select_zone(3).map(|z| z.name), Some("Eco Park Zone".to_string()));
        assert_eq!(page.snapshot().selected_zone.map(|z| z.id), Some(3));
        assert!(page.select_zone(9).is_none());
        assert!(page.snapshot().selected_zone.is_none());
    }

    #[tokio::test]
    async fn resolve_updates_alert_list() {
        let stub = StubTransport::new();
        let page = page(&stub);
        page.refresh_alerts().await;

        stub.set_json(
            "/api/alerts/1/resolve",
            json!({
                "id": 1,
                "title": "High Traffic Congestion Detected",
                "description": "Traffic volume exceeding normal capacity by 45% in Downtown District",
                "severity": "resolved",
                "timestamp": "2025-01-01 09:00:00",
                "location": "Downtown District - Main St & 5th Ave",
                "status": "resolved",
                "assignedTo": "Traffic Control Team",
                "estimatedResolution": "Completed"
            }),
        );
        page.resolve_alert(1).await.unwrap();

        let alerts = page.snapshot().alerts.unwrap().data;
        assert_eq!(alerts.len(), 8);
        assert_eq!(
            alerts[0].status,
            citypulse_city_models::AlertStatus::Resolved
        );
    }
}
