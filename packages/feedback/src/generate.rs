//! Synthetic feedback for development and demos.

use chrono::{Duration, NaiveDateTime};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::{FeedbackRecord, TIMESTAMP_FORMAT};

/// Default number of generated rows.
pub const DEFAULT_RECORDS: usize = 500;

/// Default spread of generated timestamps, in days before now.
pub const DEFAULT_DAYS: u32 = 30;

/// Phrases the generator draws from: negative, positive, then neutral.
pub const SAMPLE_FEEDBACK: &[&str] = &[
    "Parking is a nightmare",
    "Waste collection needs improvement",
    "Traffic is terrible today",
    "Congestion makes commuting slow",
    "Delays everywhere",
    "Street lights are often broken",
    "Service was very responsive",
    "The city looks clean and green",
    "Roads are efficient and smooth",
    "Excellent waste management",
    "Public transport improved a lot",
    "The new metro line schedule was released",
    "Public notice regarding the downtown festival",
    "Roadwork is planned for the main street next week",
    "A new public library branch is opening soon",
];

/// Generates `count` rows with random phrases, stamped uniformly within
/// the `days` days (plus up to one extra day) before `now`.
pub fn generate<R: Rng + ?Sized>(
    rng: &mut R,
    now: NaiveDateTime,
    count: usize,
    days: u32,
) -> Vec<FeedbackRecord> {
    let max_secs = i64::from(days) * 86_400 + 86_400;
    (1..=count)
        .map(|id| {
            let text = SAMPLE_FEEDBACK.choose(rng).copied().unwrap_or_default();
            let ago = Duration::seconds(rng.gen_range(0..=max_secs));
            FeedbackRecord {
                id: id as u64,
                text: text.to_string(),
                timestamp: Some((now - ago).format(TIMESTAMP_FORMAT).to_string()),
            }
        })
        .collect()
}
