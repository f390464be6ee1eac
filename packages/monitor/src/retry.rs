//! HTTP retry helper for upstream providers.
//!
//! Collectors call [`send_json`] instead of `RequestBuilder::send()` so
//! every request gets exponential backoff on transient failures
//! (timeouts, connection resets, HTTP 429 and 5xx).

use std::time::Duration;

use crate::MonitorError;

/// Maximum retry attempts after the first request.
///
/// Backoff is 2s, 4s, 8s, so a request gives up after 14 seconds of
/// waiting on top of its own timeouts.
const MAX_RETRIES: u32 = 3;

/// Maximum length of the response body preview included in error logs.
const BODY_PREVIEW_LEN: usize = 300;

/// Sends the request built by `build_request` and parses the body as JSON.
///
/// `build_request` is called once per attempt because builders are
/// consumed by `send()`. HTTP 4xx other than 429 is permanent and is not
/// retried.
///
/// # Errors
///
/// Returns [`MonitorError`] if the request fails after all retries, the
/// provider answers with a non-retryable status, or the body is not JSON.
pub async fn send_json<F>(build_request: F) -> Result<serde_json::Value, MonitorError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let response = send_inner(&build_request, MAX_RETRIES).await?;
    let url = response.url().clone();
    let text = response.text().await?;

    serde_json::from_str(&text).map_err(|e| {
        let preview: String = text.chars().take(BODY_PREVIEW_LEN).collect();
        log::warn!("JSON parse failed\n  url: {}\n  body: {preview}", redact(&url));
        MonitorError::Json(e)
    })
}

/// Core retry loop. Returns the first successful response.
async fn send_inner<F>(
    build_request: &F,
    max_retries: u32,
) -> Result<reqwest::Response, MonitorError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut last_error: Option<MonitorError> = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            let delay = Duration::from_secs(1u64 << attempt);
            log::warn!("  retry {attempt}/{max_retries} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        match build_request().send().await {
            Err(e) => {
                if is_transient(&e) && attempt < max_retries {
                    log::warn!("  transient error: {e}");
                    last_error = Some(MonitorError::Http(e));
                    continue;
                }
                return Err(MonitorError::Http(e));
            }
            Ok(response) => {
                let status = response.status();
                let retryable =
                    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error();

                if retryable && attempt < max_retries {
                    log::warn!("  HTTP {status} from {}", redact(response.url()));
                    last_error = Some(MonitorError::Status {
                        status: status.as_u16(),
                    });
                    continue;
                }
                if !status.is_success() {
                    return Err(MonitorError::Status {
                        status: status.as_u16(),
                    });
                }

                return Ok(response);
            }
        }
    }

    Err(last_error.unwrap_or(MonitorError::Status { status: 0 }))
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_request()
}

/// URL without its query string, which carries API keys for some
/// providers.
fn redact(url: &reqwest::Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_drops_query_keys() {
        let url = reqwest::Url::parse(
            "https://api.tomtom.com/traffic/services/4/flowSegmentData/relative0/10/json?key=secret&point=1,2",
        )
        .unwrap();
        let redacted = redact(&url);
        assert!(!redacted.contains("secret"));
        assert!(redacted.ends_with("/json"));
    }
}
