//! One module per dashboard section: view model, shaping and loading.
//!
//! Each `load` function issues the section's requests together, shapes the
//! results, and falls back to the section's demo dataset if anything fails.

pub mod alerts;
pub mod analytics;
pub mod overview;
pub mod reports;
pub mod sentiment;
pub mod zones;
