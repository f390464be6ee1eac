//! Keyword-based sentiment and topic classification.
//!
//! Matching is by lowercase substring, so `"cleaning"` counts as
//! `"clean"`. Positive keywords are checked before negative ones: text
//! containing both is positive.

use std::sync::LazyLock;

use citypulse_city_models::Sentiment;
use regex::Regex;

/// Keywords that mark feedback as positive.
pub const POSITIVE_WORDS: &[&str] = &[
    "good",
    "great",
    "excellent",
    "improved",
    "efficient",
    "smooth",
    "clean",
    "green",
    "responsive",
    "resolved",
];

/// Keywords that mark feedback as negative.
pub const NEGATIVE_WORDS: &[&str] = &[
    "nightmare",
    "terrible",
    "needs improvement",
    "slow",
    "delays",
    "potholes",
    "leakage",
    "cuts",
    "congestion",
    "garbage",
    "broken",
];

/// Topic for feedback matching none of [`TOPIC_KEYWORDS`].
pub const GENERAL_TOPIC: &str = "General";

/// Topics and their keywords, in priority order.
pub const TOPIC_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Traffic & Roads",
        &[
            "traffic",
            "roads",
            "congestion",
            "commuting",
            "parking",
            "pothole",
        ],
    ),
    (
        "Public Services",
        &["waste", "garbage", "service", "lights"],
    ),
    ("Environment", &["clean", "green", "pollution", "air", "aqi"]),
    ("Public Transport", &["transport", "bus", "metro", "train"]),
    ("Water & Sanitation", &["water", "leakage", "sewer"]),
];

/// Words too common to be useful in a word cloud.
const STOP_WORDS: &[&str] = &[
    "a", "about", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "have", "in",
    "is", "it", "its", "lot", "new", "next", "of", "on", "or", "so", "soon", "the", "this", "to",
    "very", "was", "were", "will", "with",
];

static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").expect("valid regex"));

static NON_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid regex"));

/// Classifies free text.
#[must_use]
pub fn classify(text: &str) -> Sentiment {
    let lower = text.to_lowercase();
    if POSITIVE_WORDS.iter().any(|w| lower.contains(w)) {
        Sentiment::Positive
    } else if NEGATIVE_WORDS.iter().any(|w| lower.contains(w)) {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

/// Lowercases, drops URLs and punctuation, and collapses whitespace.
#[must_use]
pub fn clean_text(text: &str) -> String {
    let lower = text.to_lowercase();
    let no_urls = URL_RE.replace_all(&lower, " ");
    let no_punct = NON_WORD_RE.replace_all(&no_urls, "");
    no_punct.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Words of already-cleaned text worth counting, stop words removed.
pub fn keywords(clean: &str) -> impl Iterator<Item = &str> {
    clean
        .split_whitespace()
        .filter(|w| !STOP_WORDS.contains(w) && !w.chars().all(|c| c.is_ascii_digit()))
}

/// First topic with a keyword contained in `text`, else [`GENERAL_TOPIC`].
#[must_use]
pub fn assign_topic(text: &str) -> &'static str {
    let lower = text.to_lowercase();
    TOPIC_KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .map_or(GENERAL_TOPIC, |(topic, _)| topic)
}
