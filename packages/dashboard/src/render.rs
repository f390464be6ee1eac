//! Chart geometry and plain-text rendering of each section.

use std::fmt::Write as _;

use citypulse_city_models::Sentiment;
use citypulse_server_models::{ApiAlert, SentimentSummaryResponse};

use crate::loaded::Loaded;
use crate::shaping::TrendPoint;
use crate::views::alerts::{SeverityFilter, count_by_severity, filter_alerts};
use crate::views::analytics::AnalyticsData;
use crate::views::overview::MetricSnapshot;
use crate::views::reports::Report;
use crate::views::sentiment::SentimentData;
use crate::views::zones::{ZoneMap, aqi_label, aqi_status, complaints_status, water_status};

/// Circumference of the confidence gauge ring.
pub const GAUGE_CIRCUMFERENCE: f64 = 314.0;

/// Circumference of the sentiment donut ring.
pub const DONUT_CIRCUMFERENCE: f64 = 251.2;

/// Sparkline viewbox width.
pub const SPARKLINE_WIDTH: f64 = 300.0;

/// Sparkline viewbox height.
pub const SPARKLINE_HEIGHT: f64 = 120.0;

const FALLBACK_MARKER: &str = "[demo data]";

/// Stroke length of the confidence gauge arc for a 0-100 confidence.
#[must_use]
pub fn gauge_dash(confidence: f64) -> f64 {
    confidence * 3.14
}

/// One coloured arc of the sentiment donut.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DonutSegment {
    /// Which share this arc shows.
    pub sentiment: Sentiment,
    /// Stroke length.
    pub dash: f64,
    /// Distance along the ring where the arc starts.
    pub offset: f64,
}

/// Positive, neutral and negative arcs, each starting where the previous
/// one ended.
#[must_use]
pub fn donut_segments(summary: &SentimentSummaryResponse) -> [DonutSegment; 3] {
    let positive = f64::from(summary.positive) * 2.51;
    let neutral = f64::from(summary.neutral) * 2.51;
    let negative = f64::from(summary.negative) * 2.51;
    [
        DonutSegment {
            sentiment: Sentiment::Positive,
            dash: positive,
            offset: 0.0,
        },
        DonutSegment {
            sentiment: Sentiment::Neutral,
            dash: neutral,
            offset: positive,
        },
        DonutSegment {
            sentiment: Sentiment::Negative,
            dash: negative,
            offset: positive + neutral,
        },
    ]
}

/// Maps percentages onto the sparkline viewbox. Returns `None` for fewer
/// than two values, which cannot form a line.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sparkline_points(percentages: &[f64]) -> Option<Vec<(f64, f64)>> {
    if percentages.len() < 2 {
        return None;
    }
    let last = (percentages.len() - 1) as f64;
    Some(
        percentages
            .iter()
            .enumerate()
            .map(|(i, pct)| {
                (
                    i as f64 / last * SPARKLINE_WIDTH,
                    SPARKLINE_HEIGHT - pct / 100.0 * SPARKLINE_HEIGHT,
                )
            })
            .collect(),
    )
}

/// Sparkline for one sentiment series of the trend.
#[must_use]
pub fn trend_sparkline(trend: &[TrendPoint], sentiment: Sentiment) -> Option<Vec<(f64, f64)>> {
    let series: Vec<f64> = trend
        .iter()
        .map(|p| match sentiment {
            Sentiment::Positive => p.positive,
            Sentiment::Neutral => p.neutral,
            Sentiment::Negative => p.negative,
        })
        .collect();
    sparkline_points(&series)
}

fn heading<T>(out: &mut String, title: &str, loaded: &Loaded<T>) {
    if loaded.is_fallback() {
        writeln!(out, "== {title} {FALLBACK_MARKER} ==").unwrap();
    } else {
        writeln!(out, "== {title} ==").unwrap();
    }
}

fn format_value(value: Option<f64>, unit: &str) -> String {
    value.map_or_else(
        || "N/A".to_string(),
        |v| {
            if unit.is_empty() {
                format!("{v}")
            } else {
                format!("{v} {unit}")
            }
        },
    )
}

/// Overview cards, one per line.
#[must_use]
pub fn render_overview(loaded: &Loaded<Vec<MetricSnapshot>>) -> String {
    let mut out = String::new();
    heading(&mut out, "City Overview", loaded);
    for card in &loaded.data {
        writeln!(
            out,
            "{:<20} {:>12}  {} [{}]",
            card.title,
            format_value(card.value, &card.unit),
            card.trend_label,
            card.status,
        )
        .unwrap();
    }
    out
}

/// Forecast table, features and model details.
#[must_use]
pub fn render_analytics(loaded: &Loaded<AnalyticsData>) -> String {
    let data = &loaded.data;
    let mut out = String::new();
    heading(&mut out, "Predictive Analytics", loaded);

    writeln!(
        out,
        "Confidence: {:.0}% ({}), gauge {:.1}/{GAUGE_CIRCUMFERENCE}",
        data.confidence,
        data.confidence_level(),
        gauge_dash(data.confidence),
    )
    .unwrap();

    writeln!(out, "Forecast:").unwrap();
    for point in &data.forecast {
        writeln!(out, "  {:<20} {:>8.1}", point.time, point.value).unwrap();
    }

    writeln!(out, "Feature importance:").unwrap();
    for feature in &data.feature_importance {
        writeln!(
            out,
            "  {:<22} {:>3.0}%",
            feature.feature,
            feature.importance * 100.0
        )
        .unwrap();
    }

    let stats = &data.stats;
    writeln!(
        out,
        "Model: {} | training {} | range {} | updated {}",
        stats.model_type, stats.training_data, stats.prediction_range, stats.last_updated,
    )
    .unwrap();
    writeln!(
        out,
        "RMSE {} | MAE {} | MAPE {}",
        stats.rmse, stats.mae, stats.mape
    )
    .unwrap();
    out
}

/// Zone list with per-metric status, or the inline error.
#[must_use]
pub fn render_zones(loaded: &Loaded<ZoneMap>) -> String {
    let mut out = String::new();
    heading(&mut out, "Zones", loaded);

    if let Some(error) = &loaded.data.error {
        writeln!(out, "{error}").unwrap();
        return out;
    }

    for zone in &loaded.data.zones {
        writeln!(out, "#{} {} ({})", zone.id, zone.name, zone.priority).unwrap();
        writeln!(
            out,
            "  AQI {} [{}] | complaints {} [{}] | water {}% [{}]",
            aqi_label(zone.aqi),
            aqi_status(zone.aqi),
            zone.complaints,
            complaints_status(zone.complaints),
            zone.water_usage,
            water_status(zone.water_usage),
        )
        .unwrap();
        for recommendation in &zone.recommendations {
            writeln!(out, "  - {recommendation}").unwrap();
        }
    }
    out
}

/// Summary, trend, words, topics and sample complaints.
#[must_use]
pub fn render_sentiment(loaded: &Loaded<SentimentData>, days: u32) -> String {
    let data = &loaded.data;
    let mut out = String::new();
    heading(&mut out, &format!("Sentiment (last {days} days)"), loaded);

    let s = &data.summary;
    writeln!(
        out,
        "Positive {}% | Neutral {}% | Negative {}% | {} items",
        s.positive, s.neutral, s.negative, s.total
    )
    .unwrap();

    if data.has_trend_line() {
        writeln!(out, "Trend:").unwrap();
        for point in &data.trend {
            writeln!(
                out,
                "  {:<12} +{:.0}% ={:.0}% -{:.0}%",
                point.day, point.positive, point.neutral, point.negative
            )
            .unwrap();
        }
    } else {
        writeln!(out, "Trend: not enough data").unwrap();
    }

    let words: Vec<String> = data
        .words
        .iter()
        .map(|w| format!("{}({:.0})", w.text, w.size))
        .collect();
    writeln!(out, "Words: {}", words.join(" ")).unwrap();

    writeln!(out, "Topics:").unwrap();
    for topic in &data.topics {
        writeln!(
            out,
            "  {:<20} {:>3}% {}",
            topic.name, topic.percentage, topic.sentiment
        )
        .unwrap();
    }

    writeln!(out, "Sample complaints:").unwrap();
    for complaint in &data.complaints {
        writeln!(
            out,
            "  [{} {}%] {} ({})",
            complaint.sentiment, complaint.confidence, complaint.raw, complaint.category
        )
        .unwrap();
    }
    out
}

/// Severity counts and the filtered alert list.
#[must_use]
pub fn render_alerts(loaded: &Loaded<Vec<ApiAlert>>, filter: SeverityFilter) -> String {
    let mut out = String::new();
    heading(&mut out, "Alerts", loaded);

    let counts = count_by_severity(&loaded.data);
    writeln!(
        out,
        "urgent {} | warning {} | resolved {}",
        counts.urgent, counts.warning, counts.resolved
    )
    .unwrap();

    for alert in filter_alerts(&loaded.data, filter) {
        writeln!(
            out,
            "#{} [{}] {} ({})",
            alert.id, alert.severity, alert.title, alert.status
        )
        .unwrap();
        writeln!(out, "  {}", alert.description).unwrap();
        writeln!(
            out,
            "  {} | {} | {} | ETA {}",
            alert.location, alert.timestamp, alert.assigned_to, alert.estimated_resolution
        )
        .unwrap();
    }
    out
}

/// Report catalog entries.
#[must_use]
pub fn render_reports(reports: &[&Report]) -> String {
    let mut out = String::new();
    writeln!(out, "== Reports ==").unwrap();
    if reports.is_empty() {
        writeln!(out, "No reports match the selected filters.").unwrap();
    }
    for report in reports {
        writeln!(
            out,
            "#{} {} [{}] {} {:.1} MB",
            report.id, report.title, report.status, report.format, report.size_mb
        )
        .unwrap();
        writeln!(out, "  {}", report.description).unwrap();
        writeln!(
            out,
            "  {} | {} | {} | generated {}",
            report.data_type, report.location, report.date_range, report.generated_at
        )
        .unwrap();
    }
    out
}

#[cfg(test)]
mod tests {
    use crate::fallback;
    use crate::views::reports::{ReportCatalog, ReportFilter};

    use super::*;

    #[test]
    fn gauge_is_proportional() {
        assert!((gauge_dash(92.0) - 288.88).abs() < 1e-9);
        assert!(gauge_dash(100.0) <= GAUGE_CIRCUMFERENCE);
    }

    #[test]
    fn donut_offsets_accumulate() {
        let segments = donut_segments(&SentimentSummaryResponse {
            positive: 60,
            neutral: 25,
            negative: 15,
            total: 100,
        });
        assert!((segments[0].dash - 150.6).abs() < 1e-9);
        assert!(segments[0].offset.abs() < f64::EPSILON);
        assert!((segments[1].offset - 150.6).abs() < 1e-9);
        assert!((segments[2].offset - 85.0 * 2.51).abs() < 1e-9);
        let total: f64 = segments.iter().map(|s| s.dash).sum();
        assert!(total <= DONUT_CIRCUMFERENCE);
    }

    #[test]
    fn sparkline_maps_to_viewbox() {
        let points = sparkline_points(&[0.0, 50.0, 100.0]).unwrap();
        assert_eq!(points, vec![(0.0, 120.0), (150.0, 60.0), (300.0, 0.0)]);
    }

    #[test]
    fn sparkline_needs_two_points() {
        assert!(sparkline_points(&[]).is_none());
        assert!(sparkline_points(&[40.0]).is_none());
    }

    #[test]
    fn trend_sparkline_picks_series() {
        let trend = fallback::sentiment().trend;
        let negative = trend_sparkline(&trend, Sentiment::Negative).unwrap();
        assert_eq!(negative.len(), 3);
        assert!((negative[0].1 - (120.0 - 0.15 * 120.0)).abs() < 1e-9);
    }

    #[test]
    fn fallback_sections_are_marked() {
        let text = render_overview(&Loaded::fallback(fallback::kpis()));
        assert!(text.starts_with("== City Overview [demo data] =="));
        assert!(text.contains("Traffic Congestion"));

        let live = render_overview(&Loaded::live(fallback::kpis()));
        assert!(!live.contains("[demo data]"));
    }

    #[test]
    fn zone_error_is_rendered() {
        let text = render_zones(&Loaded::fallback(fallback::zones()));
        assert!(text.contains("Could not load zone data"));
    }

    #[test]
    fn alerts_respect_filter() {
        let loaded = Loaded::live(fallback::alerts());
        let text = render_alerts(
            &loaded,
            SeverityFilter::Only(citypulse_city_models::AlertSeverity::Urgent),
        );
        assert!(text.contains("urgent 2 | warning 3 | resolved 3"));
        assert!(text.contains("Emergency Response Dispatch"));
        assert!(!text.contains("Power Grid Optimization"));
    }

    #[test]
    fn empty_report_filter_message() {
        let catalog = ReportCatalog::default();
        let filter = ReportFilter::from_selection("Eco Park Zone", "All Data Types");
        let text = render_reports(&catalog.filtered(&filter));
        assert!(text.contains("No reports match"));
    }

    #[test]
    fn single_day_trend_has_no_line() {
        let mut data = fallback::sentiment();
        data.trend.truncate(1);
        let text = render_sentiment(&Loaded::live(data), 7);
        assert!(text.contains("Trend: not enough data"));
    }
}
