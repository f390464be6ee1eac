//! Errors raised by the fetch layer.

/// Why a request to the analytics service did not produce usable data.
///
/// Every variant is handled the same way at the view boundary (the view
/// switches to its fallback dataset), but the distinction is kept for
/// logging.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request never completed (DNS, connection refused, timeout...).
    #[error("HTTP request to {url} failed: {source}")]
    Transport {
        /// Requested URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Requested URL.
        url: String,
        /// Response status code.
        status: u16,
    },

    /// The body was not valid JSON or did not match the expected schema.
    #[error("Malformed response from {url}: {source}")]
    Malformed {
        /// Requested URL.
        url: String,
        /// Parse or schema error.
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// The URL (or path, for injected transports) the failing request
    /// targeted.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. } | Self::Status { url, .. } | Self::Malformed { url, .. } => {
                url
            }
        }
    }
}
