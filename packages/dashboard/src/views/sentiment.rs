//! Sentiment analysis section.

use citypulse_server_models::{ApiSampleComplaint, ApiTopic, SentimentSummaryResponse};
use serde::Serialize;

use crate::client::ApiClient;
use crate::fallback;
use crate::loaded::{Loaded, load_or_fallback};
use crate::shaping::{TrendPoint, WordCloudWord, normalize_trend, size_words};

/// Time ranges offered by the range selector, in days.
pub const TIME_RANGES: [u32; 3] = [7, 30, 90];

/// Overall sentiment split.
pub type SentimentSummary = SentimentSummaryResponse;

/// Everything the sentiment section renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentData {
    /// Overall split.
    pub summary: SentimentSummary,
    /// Daily percentages.
    pub trend: Vec<TrendPoint>,
    /// Sized words.
    pub words: Vec<WordCloudWord>,
    /// Topic breakdown.
    pub topics: Vec<ApiTopic>,
    /// Example classified complaints.
    pub complaints: Vec<ApiSampleComplaint>,
}

impl SentimentData {
    /// A trend line needs at least two days.
    #[must_use]
    pub fn has_trend_line(&self) -> bool {
        self.trend.len() > 1
    }
}

/// Fetches all five sentiment endpoints for the last `days` days.
pub async fn load(client: &ApiClient, days: u32) -> Loaded<SentimentData> {
    load_or_fallback(
        "sentiment",
        async {
            let (summary, trend, words, topics, complaints) = tokio::try_join!(
                client.sentiment_summary(days),
                client.sentiment_trend(days),
                client.word_cloud(days),
                client.topics(days),
                client.sample_complaints(days),
            )?;
            Ok(SentimentData {
                summary,
                trend: normalize_trend(&trend),
                words: size_words(&words),
                topics,
                complaints,
            })
        },
        fallback::sentiment,
    )
    .await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use citypulse_city_models::Sentiment;
    use serde_json::json;

    use crate::testing::StubTransport;

    use super::*;

    fn live_stub() -> StubTransport {
        StubTransport::new()
            .with_json(
                "/api/sentiment/summary",
                json!({ "positive": 40, "neutral": 35, "negative": 25, "total": 200 }),
            )
            .with_json(
                "/api/sentiment/trend",
                json!({
                    "days": ["2025-01-01", "2025-01-02"],
                    "positive": [3, 0],
                    "negative": [0, 0],
                    "neutral": [1, 0]
                }),
            )
            .with_json(
                "/api/sentiment/wordcloud",
                json!({ "words": [{ "text": "traffic", "value": 12 }] }),
            )
            .with_json(
                "/api/sentiment/topics",
                json!([{ "name": "Traffic & Roads", "percentage": 41, "sentiment": "negative" }]),
            )
            .with_json(
                "/api/sentiment/complaints",
                json!([{
                    "raw": "Parking is a nightmare",
                    "processed": "parking is a nightmare",
                    "sentiment": "negative",
                    "confidence": 91,
                    "category": "Citizen Feedback"
                }]),
            )
    }

    #[tokio::test]
    async fn loads_and_normalizes() {
        let stub = live_stub();
        let client = ApiClient::new(Arc::new(stub.clone()));
        let loaded = load(&client, 7).await;
        assert!(!loaded.is_fallback());

        let data = loaded.data;
        assert_eq!(data.summary.total, 200);
        assert!((data.trend[0].positive - 75.0).abs() < 1e-9);
        assert!((data.trend[0].neutral - 25.0).abs() < 1e-9);
        assert!(data.trend[1].positive.abs() < 1e-9);
        assert!(data.has_trend_line());
        assert_eq!(data.topics[0].sentiment, Sentiment::Negative);
        assert!(stub.requests().iter().all(|r| r.ends_with("?days=7")));
        assert_eq!(stub.requests().len(), 5);
    }

    #[tokio::test]
    async fn malformed_endpoint_falls_back() {
        let stub = live_stub().with_json("/api/sentiment/wordcloud", json!({ "words": 3 }));
        let client = ApiClient::new(Arc::new(stub));
        let loaded = load(&client, 30).await;
        assert!(loaded.is_fallback());
        assert_eq!(loaded.data, fallback::sentiment());
    }
}
