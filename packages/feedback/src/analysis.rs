//! Aggregations over classified feedback.

use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use citypulse_city_models::Sentiment;
use citypulse_server_models::{
    ApiSampleComplaint, ApiTopic, SentimentSummaryResponse, SentimentTrendResponse, WordCloudResponse,
    WordCount,
};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::FeedbackRecord;
use crate::classify::{assign_topic, classify, clean_text, keywords};

/// Words returned by [`FeedbackSet::word_cloud`].
pub const WORD_CLOUD_LIMIT: usize = 20;

/// Largest sample returned by [`FeedbackSet::sample_complaints`].
pub const SAMPLE_SIZE: usize = 5;

/// Category reported for sampled feedback.
pub const SAMPLE_CATEGORY: &str = "Citizen Feedback";

/// A classified feedback item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    /// Original text.
    pub text: String,
    /// Output of [`clean_text`].
    pub clean_text: String,
    /// Keyword classification.
    pub sentiment: Sentiment,
    /// When it was submitted.
    pub timestamp: NaiveDateTime,
}

impl Feedback {
    /// Classifies `text`.
    #[must_use]
    pub fn new(text: &str, timestamp: NaiveDateTime) -> Self {
        Self {
            text: text.to_string(),
            clean_text: clean_text(text),
            sentiment: classify(text),
            timestamp,
        }
    }
}

/// Negative share in the last day against the last week.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NegativeSpike {
    /// Negative percentage over the last 24 hours.
    pub recent_percent: f64,
    /// Negative percentage over the last 7 days.
    pub baseline_percent: f64,
}

/// A set of classified feedback, usually narrowed to a window with
/// [`FeedbackSet::since_days`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackSet {
    items: Vec<Feedback>,
}

impl FeedbackSet {
    /// Classifies file rows. Rows with unusable timestamps are stamped
    /// with `now`.
    #[must_use]
    pub fn from_records(records: Vec<FeedbackRecord>, now: NaiveDateTime) -> Self {
        records
            .into_iter()
            .map(|r| Feedback::new(&r.text, r.timestamp_or(now)))
            .collect()
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if there are no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The items.
    #[must_use]
    pub fn items(&self) -> &[Feedback] {
        &self.items
    }

    /// Items submitted at or after `now - days`.
    #[must_use]
    pub fn since_days(&self, now: NaiveDateTime, days: u32) -> Self {
        self.since(now - Duration::days(i64::from(days)))
    }

    /// Items submitted at or after `cutoff`.
    #[must_use]
    pub fn since(&self, cutoff: NaiveDateTime) -> Self {
        self.items
            .iter()
            .filter(|f| f.timestamp >= cutoff)
            .cloned()
            .collect()
    }

    fn count(&self, sentiment: Sentiment) -> usize {
        self.items.iter().filter(|f| f.sentiment == sentiment).count()
    }

    /// Rounded percentage of each sentiment, and the item count.
    #[must_use]
    pub fn summary(&self) -> SentimentSummaryResponse {
        let total = self.items.len();
        SentimentSummaryResponse {
            positive: rounded_percent(self.count(Sentiment::Positive), total),
            neutral: rounded_percent(self.count(Sentiment::Neutral), total),
            negative: rounded_percent(self.count(Sentiment::Negative), total),
            total: total as u64,
        }
    }

    /// Per-day sentiment counts, days ascending. Days with no feedback are
    /// omitted.
    #[must_use]
    pub fn trend(&self) -> SentimentTrendResponse {
        let mut by_day: BTreeMap<NaiveDate, [u64; 3]> = BTreeMap::new();
        for item in &self.items {
            let counts = by_day.entry(item.timestamp.date()).or_default();
            match item.sentiment {
                Sentiment::Positive => counts[0] += 1,
                Sentiment::Negative => counts[1] += 1,
                Sentiment::Neutral => counts[2] += 1,
            }
        }

        let mut trend = SentimentTrendResponse::default();
        for (day, [positive, negative, neutral]) in by_day {
            trend.days.push(day.format("%Y-%m-%d").to_string());
            trend.positive.push(positive);
            trend.negative.push(negative);
            trend.neutral.push(neutral);
        }
        trend
    }

    /// The [`WORD_CLOUD_LIMIT`] most frequent keywords. Ties keep the order
    /// in which words first appeared.
    #[must_use]
    pub fn word_cloud(&self) -> WordCloudResponse {
        let mut counts: HashMap<&str, (u64, usize)> = HashMap::new();
        let mut next = 0;
        for word in self.items.iter().flat_map(|f| keywords(&f.clean_text)) {
            let entry = counts.entry(word).or_insert_with(|| {
                next += 1;
                (0, next)
            });
            entry.0 += 1;
        }

        let mut ranked: Vec<(&str, u64, usize)> =
            counts.into_iter().map(|(w, (c, first))| (w, c, first)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

        WordCloudResponse {
            words: ranked
                .into_iter()
                .take(WORD_CLOUD_LIMIT)
                .map(|(text, value, _)| WordCount {
                    text: text.to_string(),
                    value,
                })
                .collect(),
        }
    }

    /// Topic shares, largest first, each with its most common sentiment.
    /// Sentiment ties go to the alphabetically first label.
    #[must_use]
    pub fn topics(&self) -> Vec<ApiTopic> {
        let mut by_topic: HashMap<&'static str, [usize; 3]> = HashMap::new();
        for item in &self.items {
            let counts = by_topic.entry(assign_topic(&item.text)).or_default();
            counts[sentiment_index(item.sentiment)] += 1;
        }

        let total = self.items.len();
        let mut topics: Vec<(usize, ApiTopic)> = by_topic
            .into_iter()
            .map(|(name, counts)| {
                let count = counts.iter().sum();
                (
                    count,
                    ApiTopic {
                        name: name.to_string(),
                        percentage: rounded_percent(count, total),
                        sentiment: dominant(counts),
                    },
                )
            })
            .collect();
        topics.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.name.cmp(&b.1.name)));
        topics.into_iter().map(|(_, topic)| topic).collect()
    }

    /// Up to [`SAMPLE_SIZE`] random items with a simulated classifier
    /// confidence of 85-98%.
    pub fn sample_complaints<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<ApiSampleComplaint> {
        self.items
            .choose_multiple(rng, SAMPLE_SIZE)
            .map(|f| ApiSampleComplaint {
                raw: f.text.clone(),
                processed: f.clean_text.clone(),
                sentiment: f.sentiment,
                confidence: rng.gen_range(85..=98),
                category: SAMPLE_CATEGORY.to_string(),
            })
            .collect()
    }

    /// Compares the negative share of the last day with the last week.
    /// Returns `None` when there is too little data (10 or fewer items in
    /// the day, or 50 or fewer in the week).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn negative_spike(&self, now: NaiveDateTime) -> Option<NegativeSpike> {
        let recent = self.since(now - Duration::days(1));
        let baseline = self.since(now - Duration::days(7));
        if recent.len() <= 10 || baseline.len() <= 50 {
            return None;
        }

        let percent = |set: &Self| set.count(Sentiment::Negative) as f64 / set.len() as f64 * 100.0;
        Some(NegativeSpike {
            recent_percent: percent(&recent),
            baseline_percent: percent(&baseline),
        })
    }
}

impl NegativeSpike {
    /// A spike is a recent share above 20% and more than 10 points above
    /// the baseline.
    #[must_use]
    pub fn is_spike(&self) -> bool {
        self.recent_percent > 20.0 && self.recent_percent > self.baseline_percent + 10.0
    }
}

impl FromIterator<Feedback> for FeedbackSet {
    fn from_iter<I: IntoIterator<Item = Feedback>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

const fn sentiment_index(sentiment: Sentiment) -> usize {
    match sentiment {
        Sentiment::Negative => 0,
        Sentiment::Neutral => 1,
        Sentiment::Positive => 2,
    }
}

/// Most frequent sentiment; indices follow alphabetical label order so
/// the first maximum wins ties.
fn dominant(counts: [usize; 3]) -> Sentiment {
    let order = [Sentiment::Negative, Sentiment::Neutral, Sentiment::Positive];
    let mut best = 0;
    for (i, &count) in counts.iter().enumerate().skip(1) {
        if count > counts[best] {
            best = i;
        }
    }
    order[best]
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn rounded_percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        0
    } else {
        (part as f64 / total as f64 * 100.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::TIMESTAMP_FORMAT;

    use super::*;

    fn at(ts: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT).unwrap()
    }

    fn now() -> NaiveDateTime {
        at("2025-03-10 12:00:00")
    }

    fn set(rows: &[(&str, &str)]) -> FeedbackSet {
        rows.iter().map(|(text, ts)| Feedback::new(text, at(ts))).collect()
    }

    #[test]
    fn summary_rounds_percentages() {
        let s = set(&[
            ("Parking is a nightmare", "2025-03-10 09:00:00"),
            ("Traffic is terrible today", "2025-03-10 09:00:00"),
            ("Service was very responsive", "2025-03-09 09:00:00"),
        ])
        .summary();
        assert_eq!(s.negative, 67);
        assert_eq!(s.positive, 33);
        assert_eq!(s.neutral, 0);
        assert_eq!(s.total, 3);
    }

    #[test]
    fn empty_summary_is_zero() {
        let s = FeedbackSet::default().summary();
        assert_eq!((s.positive, s.neutral, s.negative, s.total), (0, 0, 0, 0));
    }

    #[test]
    fn window_filters_by_timestamp() {
        let all = set(&[
            ("Delays everywhere", "2025-03-09 12:00:00"),
            ("Delays everywhere", "2025-02-01 12:00:00"),
        ]);
        assert_eq!(all.since_days(now(), 7).len(), 1);
        assert_eq!(all.since_days(now(), 90).len(), 2);
    }

    #[test]
    fn trend_counts_per_day() {
        let trend = set(&[
            ("Excellent waste management", "2025-03-09 08:00:00"),
            ("Excellent waste management", "2025-03-09 18:00:00"),
            ("Delays everywhere", "2025-03-09 19:00:00"),
            ("A new public library branch is opening soon", "2025-03-08 10:00:00"),
        ])
        .trend();
        assert_eq!(trend.days, ["2025-03-08", "2025-03-09"]);
        assert_eq!(trend.positive, [0, 2]);
        assert_eq!(trend.negative, [0, 1]);
        assert_eq!(trend.neutral, [1, 0]);
    }

    #[test]
    fn word_cloud_ranks_by_frequency() {
        let cloud = set(&[
            ("Traffic is terrible today", "2025-03-10 09:00:00"),
            ("Traffic is terrible", "2025-03-10 09:00:00"),
            ("Traffic jams", "2025-03-10 09:00:00"),
        ])
        .word_cloud();
        let words: Vec<(&str, u64)> = cloud.words.iter().map(|w| (w.text.as_str(), w.value)).collect();
        assert_eq!(
            words,
            [("traffic", 3), ("terrible", 2), ("today", 1), ("jams", 1)]
        );
    }

    #[test]
    fn topics_have_dominant_sentiment() {
        let topics = set(&[
            ("Parking is a nightmare", "2025-03-10 09:00:00"),
            ("Congestion makes commuting slow", "2025-03-10 09:00:00"),
            ("Roads are efficient and smooth", "2025-03-10 09:00:00"),
            ("Delays everywhere", "2025-03-10 09:00:00"),
        ])
        .topics();
        assert_eq!(topics[0].name, "Traffic & Roads");
        assert_eq!(topics[0].percentage, 75);
        assert_eq!(topics[0].sentiment, Sentiment::Negative);
        assert_eq!(topics[1].name, "General");
        assert_eq!(topics[1].percentage, 25);
    }

    #[test]
    fn dominant_ties_go_to_first_label() {
        assert_eq!(dominant([1, 1, 1]), Sentiment::Negative);
        assert_eq!(dominant([0, 2, 2]), Sentiment::Neutral);
        assert_eq!(dominant([0, 0, 0]), Sentiment::Negative);
        assert_eq!(dominant([0, 1, 3]), Sentiment::Positive);
    }

    #[test]
    fn sample_is_bounded() {
        let mut rng = StdRng::seed_from_u64(7);
        let few = set(&[("Delays everywhere", "2025-03-10 09:00:00")]);
        let sample = few.sample_complaints(&mut rng);
        assert_eq!(sample.len(), 1);
        assert_eq!(sample[0].processed, "delays everywhere");
        assert!((85..=98).contains(&sample[0].confidence));
        assert_eq!(sample[0].category, SAMPLE_CATEGORY);

        let many: FeedbackSet = (0..20)
            .map(|_| Feedback::new("Delays everywhere", now()))
            .collect();
        assert_eq!(many.sample_complaints(&mut rng).len(), SAMPLE_SIZE);
        assert!(FeedbackSet::default().sample_complaints(&mut rng).is_empty());
    }

    #[test]
    fn detects_negative_spike() {
        let mut items: Vec<Feedback> = (0..60)
            .map(|_| Feedback::new("Excellent waste management", at("2025-03-06 12:00:00")))
            .collect();
        items.extend((0..12).map(|_| Feedback::new("Parking is a nightmare", at("2025-03-10 10:00:00"))));
        let set: FeedbackSet = items.into_iter().collect();

        let spike = set.negative_spike(now()).unwrap();
        assert!((spike.recent_percent - 100.0).abs() < f64::EPSILON);
        assert!(spike.is_spike());
    }

    #[test]
    fn spike_needs_enough_data() {
        let set: FeedbackSet = (0..5)
            .map(|_| Feedback::new("Parking is a nightmare", at("2025-03-10 10:00:00")))
            .collect();
        assert!(set.negative_spike(now()).is_none());
    }
}
