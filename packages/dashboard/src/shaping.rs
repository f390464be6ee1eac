//! Numeric transforms that turn raw responses into chart-ready values.

use citypulse_server_models::{SentimentTrendResponse, WordCloudResponse};
use serde::Serialize;

/// Multiplier applied to `ln(value + 1)` when sizing word-cloud words.
pub const WORD_SIZE_SCALE: f64 = 10.0;

/// Largest font size a word-cloud word may get.
pub const MAX_WORD_SIZE: f64 = 48.0;

/// One day of the sentiment trend, as percentages of that day's feedback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    /// Day label.
    pub day: String,
    /// Positive share, 0-100.
    pub positive: f64,
    /// Neutral share, 0-100.
    pub neutral: f64,
    /// Negative share, 0-100.
    pub negative: f64,
}

/// A word sized for the word cloud.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordCloudWord {
    /// The word.
    pub text: String,
    /// Font size.
    pub size: f64,
}

/// `part / total * 100`, or 0 when `total` is 0.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percent_of(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Converts one day's raw counts into percentages. A day with no feedback
/// yields 0/0/0.
#[must_use]
pub fn normalize_day(day: &str, positive: u64, neutral: u64, negative: u64) -> TrendPoint {
    let total = positive + neutral + negative;
    TrendPoint {
        day: day.to_string(),
        positive: percent_of(positive, total),
        neutral: percent_of(neutral, total),
        negative: percent_of(negative, total),
    }
}

/// Normalizes the server's parallel count arrays day by day. A count
/// missing from a shorter array is treated as 0.
#[must_use]
pub fn normalize_trend(trend: &SentimentTrendResponse) -> Vec<TrendPoint> {
    let at = |v: &[u64], i: usize| v.get(i).copied().unwrap_or(0);

    trend
        .days
        .iter()
        .enumerate()
        .map(|(i, day)| {
            normalize_day(
                day,
                at(&trend.positive, i),
                at(&trend.neutral, i),
                at(&trend.negative, i),
            )
        })
        .collect()
}

/// Log-scaled font size for a word seen `value` times, capped at
/// [`MAX_WORD_SIZE`].
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn word_size(value: u64) -> f64 {
    ((value as f64 + 1.0).ln() * WORD_SIZE_SCALE).min(MAX_WORD_SIZE)
}

/// Sizes every word in a word-cloud response, preserving order.
#[must_use]
pub fn size_words(words: &WordCloudResponse) -> Vec<WordCloudWord> {
    words
        .words
        .iter()
        .map(|w| WordCloudWord {
            text: w.text.clone(),
            size: word_size(w.value),
        })
        .collect()
}

/// Parses the leading number of a reading such as `"2.54 ML"`,
/// `"132.5%"` or `"24113 MW"`. Returns `None` for `"unknown"` and other
/// non-numeric text.
#[must_use]
pub fn leading_number(reading: &str) -> Option<f64> {
    let trimmed = reading.trim();
    let end = trimmed
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || *c == '.' || *c == '-'))
        .map_or(trimmed.len(), |(i, _)| i);
    trimmed[..end].parse().ok()
}
