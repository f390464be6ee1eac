//! Fixed demo datasets substituted when a view cannot reach the service.

use citypulse_city_models::{AlertSeverity, AlertStatus, MetricStatus, Sentiment};
use citypulse_server_models::{
    ApiAlert, ApiSampleComplaint, ApiTopic, FeatureImportance, SentimentSummaryResponse,
};

use crate::shaping::{TrendPoint, WordCloudWord};
use crate::views::analytics::{AnalyticsData, ForecastPoint, ModelStats};
use crate::views::overview::MetricSnapshot;
use crate::views::sentiment::SentimentData;
use crate::views::zones::{ZONE_LOAD_ERROR, ZoneMap};

/// Overview cards.
#[must_use]
pub fn kpis() -> Vec<MetricSnapshot> {
    vec![
        MetricSnapshot::new(
            "Traffic Congestion",
            Some(65.0),
            "%",
            "Live",
            MetricStatus::Warning,
        ),
        MetricSnapshot::new(
            "Air Quality Index",
            Some(42.0),
            "AQI",
            "Moderate",
            MetricStatus::Good,
        ),
        MetricSnapshot::new("Water Usage", Some(120.0), "ML", "Normal", MetricStatus::Good),
        MetricSnapshot::new(
            "Electricity Load",
            Some(320.0),
            "MW",
            "Zone 1",
            MetricStatus::Critical,
        ),
        MetricSnapshot::new(
            "Active Complaints",
            Some(8.0),
            "",
            "Live data",
            MetricStatus::Warning,
        ),
    ]
}

/// Forecast section.
#[must_use]
pub fn analytics() -> AnalyticsData {
    let point = |time: &str, value: f64| ForecastPoint {
        time: time.to_string(),
        value,
    };
    let feature = |feature: &str, importance: f64| FeatureImportance {
        feature: feature.to_string(),
        importance,
    };

    AnalyticsData {
        forecast: vec![
            point("08:00", 10.0),
            point("09:00", 20.0),
            point("10:00", 50.0),
            point("11:00", 80.0),
        ],
        feature_importance: vec![
            feature("Historical Patterns", 0.85),
            feature("Weather Conditions", 0.72),
        ],
        stats: ModelStats {
            training_data: "1,440 points".to_string(),
            last_updated: "5 min ago".to_string(),
            prediction_range: "48 hours".to_string(),
            model_type: "Neural Network".to_string(),
            rmse: 5.2,
            mae: 3.1,
            mape: "4.2%".to_string(),
        },
        confidence: 92.0,
    }
}

/// Zones have no demo set; the map shows an error instead.
#[must_use]
pub fn zones() -> ZoneMap {
    ZoneMap {
        zones: vec![],
        error: Some(ZONE_LOAD_ERROR.to_string()),
    }
}

/// Sentiment section.
#[must_use]
pub fn sentiment() -> SentimentData {
    let day = |day: &str, positive: f64, neutral: f64, negative: f64| TrendPoint {
        day: day.to_string(),
        positive,
        neutral,
        negative,
    };
    let word = |text: &str, size: f64| WordCloudWord {
        text: text.to_string(),
        size,
    };
    let topic = |name: &str, percentage: u32, sentiment: Sentiment| ApiTopic {
        name: name.to_string(),
        percentage,
        sentiment,
    };
    let complaint = |raw: &str, processed: &str, confidence: u8, category: &str| {
        ApiSampleComplaint {
            raw: raw.to_string(),
            processed: processed.to_string(),
            sentiment: Sentiment::Negative,
            confidence,
            category: category.to_string(),
        }
    };

    SentimentData {
        summary: SentimentSummaryResponse {
            positive: 60,
            neutral: 25,
            negative: 15,
            total: 100,
        },
        trend: vec![
            day("Day 1", 60.0, 25.0, 15.0),
            day("Day 2", 58.0, 27.0, 15.0),
            day("Day 3", 62.0, 22.0, 16.0),
        ],
        words: vec![
            word("water", 20.0),
            word("traffic", 15.0),
            word("electricity", 25.0),
        ],
        topics: vec![
            topic("Traffic delays", 40, Sentiment::Negative),
            topic("Cleanliness", 30, Sentiment::Positive),
        ],
        complaints: vec![
            complaint(
                "Street lights not working",
                "Street light issue",
                90,
                "Infrastructure",
            ),
            complaint("Water supply delayed", "Water delay", 85, "Utilities"),
        ],
    }
}

/// Alerts section.
#[must_use]
pub fn alerts() -> Vec<ApiAlert> {
    [
        (
            "High Traffic Congestion Detected",
            "Traffic volume exceeding normal capacity by 45% in Downtown District",
            AlertSeverity::Urgent,
            "2 minutes ago",
            "Downtown District - Main St & 5th Ave",
            AlertStatus::Active,
            "Traffic Control Team",
            "15 minutes",
        ),
        (
            "Air Quality Alert",
            "AQI levels above recommended threshold in Industrial Zone",
            AlertSeverity::Warning,
            "8 minutes ago",
            "Industrial Zone - Sector 7",
            AlertStatus::Investigating,
            "Environmental Team",
            "45 minutes",
        ),
        (
            "Water Main Pressure Drop",
            "Significant pressure reduction detected in residential water supply",
            AlertSeverity::Warning,
            "15 minutes ago",
            "Residential Area B - Block 12",
            AlertStatus::InProgress,
            "Water Management",
            "2 hours",
        ),
        (
            "Street Light Maintenance Complete",
            "LED street light installation completed successfully",
            AlertSeverity::Resolved,
            "1 hour ago",
            "Commercial Hub - Oak Street",
            AlertStatus::Resolved,
            "Maintenance Team",
            "Completed",
        ),
        (
            "Emergency Response Dispatch",
            "Fire department responding to commercial building alarm",
            AlertSeverity::Urgent,
            "1 hour ago",
            "Business District - Tower Plaza",
            AlertStatus::Active,
            "Emergency Services",
            "30 minutes",
        ),
        (
            "Public Transport Delay",
            "Bus route 42 experiencing delays due to road construction",
            AlertSeverity::Warning,
            "2 hours ago",
            "Transit Route 42 - Central Station",
            AlertStatus::Monitoring,
            "Transit Authority",
            "4 hours",
        ),
        (
            "Waste Collection Completed",
            "Scheduled waste collection completed ahead of schedule",
            AlertSeverity::Resolved,
            "3 hours ago",
            "Residential Area A - All Sectors",
            AlertStatus::Resolved,
            "Sanitation Team",
            "Completed",
        ),
        (
            "Power Grid Optimization",
            "Electrical load balancing completed successfully",
            AlertSeverity::Resolved,
            "4 hours ago",
            "City-wide Grid Network",
            AlertStatus::Resolved,
            "Power Grid Team",
            "Completed",
        ),
    ]
    .into_iter()
    .zip(1..)
    .map(
        |(
            (title, description, severity, timestamp, location, status, assigned_to, eta),
            id,
        )| ApiAlert {
            id,
            title: title.to_string(),
            description: description.to_string(),
            severity,
            timestamp: timestamp.to_string(),
            location: location.to_string(),
            status,
            assigned_to: assigned_to.to_string(),
            estimated_resolution: eta.to_string(),
        },
    )
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alerts_have_sequential_ids() {
        let ids: Vec<i64> = alerts().iter().map(|a| a.id).collect();
        assert_eq!(ids, (1..=8).collect::<Vec<_>>());
    }

    #[test]
    fn resolved_alerts_are_completed() {
        for alert in alerts() {
            assert_eq!(
                alert.status == AlertStatus::Resolved,
                alert.estimated_resolution == "Completed",
                "{}",
                alert.title
            );
        }
    }

    #[test]
    fn sentiment_days_sum_to_100() {
        for point in sentiment().trend {
            let sum = point.positive + point.neutral + point.negative;
            assert!((sum - 100.0).abs() < f64::EPSILON, "{}", point.day);
        }
    }
}
