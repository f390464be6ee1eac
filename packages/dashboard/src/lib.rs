#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Data layer for the `CityPulse` dashboard.
//!
//! Each dashboard section is a view that fetches its data from the
//! analytics service, shapes it for display, and falls back to a fixed
//! demo dataset if any request fails. Loads are sequenced per view so a
//! slow response cannot overwrite a newer one.
//!
//! The crate is front-end agnostic: [`page::DashboardPage`] holds the
//! state, [`render`] provides chart geometry and a plain-text rendering
//! used by the `citypulse_dashboard` binary.

pub mod client;
pub mod config;
pub mod error;
pub mod fallback;
pub mod loaded;
pub mod page;
pub mod render;
pub mod sections;
pub mod shaping;
pub mod state;
pub mod transport;
pub mod views;

#[cfg(test)]
mod testing;

pub use client::ApiClient;
pub use config::DashboardConfig;
pub use error::FetchError;
pub use loaded::{DataOrigin, Loaded};
pub use page::DashboardPage;
