//! HTTP transport for the analytics service.
//!
//! Views never talk to `reqwest` directly. They go through the
//! [`ApiTransport`] trait so the fetch layer can be exercised without a
//! running server. Requests are sent exactly once: a failed request is
//! reported to the caller, which switches the view to fallback data.

use async_trait::async_trait;

use crate::config::DashboardConfig;
use crate::error::FetchError;

/// Maximum length of the response body preview included in error logs.
const BODY_PREVIEW_LEN: usize = 500;

/// Minimal JSON-over-HTTP interface to the analytics service.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Issues `GET {base}{path}` with the given query parameters and
    /// returns the parsed JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on transport failure, non-2xx status, or a
    /// body that is not JSON.
    async fn get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value, FetchError>;

    /// Issues `POST {base}{path}` with an empty body and returns the parsed
    /// JSON response.
    ///
    /// # Errors
    ///
    /// Same as [`ApiTransport::get_json`].
    async fn post_json(&self, path: &str) -> Result<serde_json::Value, FetchError>;
}

/// [`ApiTransport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base: String,
}

impl HttpTransport {
    /// Builds a transport for the configured API base.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] if the HTTP client cannot be
    /// constructed (e.g. TLS backend initialisation fails).
    pub fn new(config: &DashboardConfig) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|source| FetchError::Transport {
            url: config.api_base.clone(),
            source,
        })?;

        Ok(Self {
            client,
            base: config.api_base.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value, FetchError> {
        let url = self.url(path);
        send_json(&url, self.client.get(&url).query(query)).await
    }

    async fn post_json(&self, path: &str) -> Result<serde_json::Value, FetchError> {
        let url = self.url(path);
        send_json(&url, self.client.post(&url)).await
    }
}

/// Sends a request once and parses the body as JSON.
async fn send_json(
    url: &str,
    request: reqwest::RequestBuilder,
) -> Result<serde_json::Value, FetchError> {
    log::debug!("Requesting {url}");

    let response = request
        .send()
        .await
        .map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let text = response
        .text()
        .await
        .map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;

    serde_json::from_str(&text).map_err(|source| {
        log::warn!(
            "JSON parse failed.\n  \
             url: {url}\n  \
             status: {status}\n  \
             received: {} bytes\n  \
             parse error: {source}\n  \
             body preview: {}",
            text.len(),
            preview(&text),
        );
        FetchError::Malformed {
            url: url.to_string(),
            source,
        }
    })
}

/// Truncates a body for logging without splitting a UTF-8 sequence.
fn preview(text: &str) -> String {
    if text.len() <= BODY_PREVIEW_LEN {
        return text.to_string();
    }
    let mut end = BODY_PREVIEW_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}
