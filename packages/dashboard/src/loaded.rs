//! The fallback layer.
//!
//! A view's data is always present: either what the service returned, or
//! the view's fixed demo dataset. [`Loaded`] records which, so demo data is
//! never presented as live.

use std::future::Future;

use serde::Serialize;

use crate::error::FetchError;

/// Where a view's data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataOrigin {
    /// Returned by the analytics service.
    Live,
    /// Substituted after a failed fetch.
    Fallback,
}

/// A view model tagged with its [`DataOrigin`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Loaded<T> {
    /// The view model.
    pub data: T,
    /// Whether `data` is live or demo data.
    pub origin: DataOrigin,
}

impl<T> Loaded<T> {
    /// Wraps live data.
    pub const fn live(data: T) -> Self {
        Self {
            data,
            origin: DataOrigin::Live,
        }
    }

    /// Wraps fallback data.
    pub const fn fallback(data: T) -> Self {
        Self {
            data,
            origin: DataOrigin::Fallback,
        }
    }

    /// Returns `true` if the data is demo data.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.origin == DataOrigin::Fallback
    }
}

/// Awaits `fetch`; on any error logs it and returns `fallback()` instead.
///
/// Failure is all-or-nothing: `fetch` is expected to join every request
/// the view needs, so a single failing endpoint discards the others.
pub async fn load_or_fallback<T, Fut, F>(view: &str, fetch: Fut, fallback: F) -> Loaded<T>
where
    Fut: Future<Output = Result<T, FetchError>>,
    F: FnOnce() -> T,
{
    match fetch.await {
        Ok(data) => Loaded::live(data),
        Err(e) => {
            log::warn!("{view}: using fallback data ({e})");
            Loaded::fallback(fallback())
        }
    }
}
