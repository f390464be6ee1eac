//! Typed client for the analytics service endpoints.

use std::sync::Arc;

use citypulse_server_models::{
    AirReading, ApiAlert, ApiSampleComplaint, ApiTopic, ApiZone, ComplaintsReading,
    ElectricityReading, ForecastResponse, SentimentSummaryResponse, SentimentTrendResponse,
    TrafficReading, WaterReading, WordCloudResponse,
};
use serde::de::DeserializeOwned;

use crate::config::DashboardConfig;
use crate::error::FetchError;
use crate::transport::{ApiTransport, HttpTransport};

/// One method per endpoint; every response is decoded into its
/// `citypulse_server_models` schema, so shape mismatches surface as
/// [`FetchError::Malformed`].
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn ApiTransport>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Wraps an existing transport.
    #[must_use]
    pub fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self { transport }
    }

    /// Builds an HTTP-backed client for the configured API base.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the HTTP client cannot be built.
    pub fn from_config(config: &DashboardConfig) -> Result<Self, FetchError> {
        Ok(Self::new(Arc::new(HttpTransport::new(config)?)))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let value = self.transport.get_json(path, query).await?;
        decode(path, value)
    }

    async fn get_with_days<T: DeserializeOwned>(
        &self,
        path: &str,
        days: u32,
    ) -> Result<T, FetchError> {
        self.get(path, &[("days", days.to_string())]).await
    }

    /// `GET /traffic`
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the request fails or the body does not
    /// match [`TrafficReading`].
    pub async fn traffic(&self) -> Result<TrafficReading, FetchError> {
        self.get("/traffic", &[]).await
    }

    /// `GET /air`
    ///
    /// # Errors
    ///
    /// See [`ApiClient::traffic`].
    pub async fn air(&self) -> Result<AirReading, FetchError> {
        self.get("/air", &[]).await
    }

    /// `GET /water`
    ///
    /// # Errors
    ///
    /// See [`ApiClient::traffic`].
    pub async fn water(&self) -> Result<WaterReading, FetchError> {
        self.get("/water", &[]).await
    }

    /// `GET /electricity`
    ///
    /// # Errors
    ///
    /// See [`ApiClient::traffic`].
    pub async fn electricity(&self) -> Result<ElectricityReading, FetchError> {
        self.get("/electricity", &[]).await
    }

    /// `GET /complaints`
    ///
    /// # Errors
    ///
    /// See [`ApiClient::traffic`].
    pub async fn complaints(&self) -> Result<ComplaintsReading, FetchError> {
        self.get("/complaints", &[]).await
    }

    /// `GET /electricity/forecast`
    ///
    /// # Errors
    ///
    /// See [`ApiClient::traffic`].
    pub async fn forecast(&self) -> Result<ForecastResponse, FetchError> {
        self.get("/electricity/forecast", &[]).await
    }

    /// `GET /zones`
    ///
    /// # Errors
    ///
    /// See [`ApiClient::traffic`].
    pub async fn zones(&self) -> Result<Vec<ApiZone>, FetchError> {
        self.get("/zones", &[]).await
    }

    /// `GET /api/alerts`
    ///
    /// # Errors
    ///
    /// See [`ApiClient::traffic`].
    pub async fn alerts(&self) -> Result<Vec<ApiAlert>, FetchError> {
        self.get("/api/alerts", &[]).await
    }

    /// `POST /api/alerts/{id}/resolve`
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the request fails (including 404 for an
    /// unknown alert) or the body is not an alert.
    pub async fn resolve_alert(&self, id: i64) -> Result<ApiAlert, FetchError> {
        let path = format!("/api/alerts/{id}/resolve");
        let value = self.transport.post_json(&path).await?;
        decode(&path, value)
    }

    /// `GET /api/sentiment/summary?days=N`
    ///
    /// # Errors
    ///
    /// See [`ApiClient::traffic`].
    pub async fn sentiment_summary(
        &self,
        days: u32,
    ) -> Result<SentimentSummaryResponse, FetchError> {
        self.get_with_days("/api/sentiment/summary", days).await
    }

    /// `GET /api/sentiment/trend?days=N`
    ///
    /// # Errors
    ///
    /// See [`ApiClient::traffic`].
    pub async fn sentiment_trend(&self, days: u32) -> Result<SentimentTrendResponse, FetchError> {
        self.get_with_days("/api/sentiment/trend", days).await
    }

    /// `GET /api/sentiment/wordcloud?days=N`
    ///
    /// # Errors
    ///
    /// See [`ApiClient::traffic`].
    pub async fn word_cloud(&self, days: u32) -> Result<WordCloudResponse, FetchError> {
        self.get_with_days("/api/sentiment/wordcloud", days).await
    }

    /// `GET /api/sentiment/topics?days=N`
    ///
    /// # Errors
    ///
    /// See [`ApiClient::traffic`].
    pub async fn topics(&self, days: u32) -> Result<Vec<ApiTopic>, FetchError> {
        self.get_with_days("/api/sentiment/topics", days).await
    }

    /// `GET /api/sentiment/complaints?days=N`
    ///
    /// # Errors
    ///
    /// See [`ApiClient::traffic`].
    pub async fn sample_complaints(
        &self,
        days: u32,
    ) -> Result<Vec<ApiSampleComplaint>, FetchError> {
        self.get_with_days("/api/sentiment/complaints", days).await
    }
}

fn decode<T: DeserializeOwned>(path: &str, value: serde_json::Value) -> Result<T, FetchError> {
    serde_json::from_value(value).map_err(|source| FetchError::Malformed {
        url: path.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::testing::StubTransport;

    use super::*;

    #[tokio::test]
    async fn decodes_matching_body() {
        let stub = StubTransport::new().with_json(
            "/traffic",
            json!({ "congestion": "132.5%" }),
        );
        let client = ApiClient::new(Arc::new(stub));
        let reading = client.traffic().await.unwrap();
        assert_eq!(reading.congestion, "132.5%");
    }

    #[tokio::test]
    async fn shape_mismatch_is_malformed() {
        let stub = StubTransport::new().with_json("/water", json!({ "error": "nope" }));
        let client = ApiClient::new(Arc::new(stub));
        let err = client.water().await.unwrap_err();
        assert!(matches!(err, FetchError::Malformed { .. }));
        assert_eq!(err.url(), "/water");
    }

    #[tokio::test]
    async fn passes_days_query() {
        let stub = StubTransport::new().with_json(
            "/api/sentiment/summary",
            json!({ "positive": 50, "neutral": 30, "negative": 20, "total": 10 }),
        );
        let client = ApiClient::new(Arc::new(stub.clone()));
        client.sentiment_summary(7).await.unwrap();
        assert_eq!(
            stub.requests(),
            vec!["GET /api/sentiment/summary?days=7".to_string()]
        );
    }

    #[tokio::test]
    async fn resolve_posts_to_alert_path() {
        let stub = StubTransport::new().with_status("/api/alerts/99/resolve", 404);
        let client = ApiClient::new(Arc::new(stub.clone()));
        let err = client.resolve_alert(99).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
        assert_eq!(
            stub.requests(),
            vec!["POST /api/alerts/99/resolve".to_string()]
        );
    }
}
