//! Simulated hourly electricity demand.
//!
//! Demand is `((50 + daily) * weekly + temperature + holiday + trend +
//! noise) * anomaly`:
//!
//! * a daily sine cycle peaking in the evening
//! * weekends at 85%
//! * extra load when the seasonal temperature exceeds 25°C
//! * a fixed boost on holidays
//! * a slow upward trend
//! * Gaussian noise
//! * rare blackouts and surges

use std::f64::consts::PI;

use chrono::{Datelike, Duration, NaiveDateTime, Timelike, Weekday};
use rand::Rng;

use crate::DemandSample;

/// Fraction of hours hit by an anomaly.
pub const ANOMALY_RATE: f64 = 0.02;

/// Standard deviation of the hourly noise.
pub const NOISE_SD: f64 = 2.0;

/// `(month, day)` pairs that get [`HOLIDAY_BOOST`].
pub const HOLIDAYS: &[(u32, u32)] = &[(11, 12), (12, 25)];

/// Extra demand on holidays.
pub const HOLIDAY_BOOST: f64 = 15.0;

/// Total rise of the trend over the generated range.
pub const TREND_RISE: f64 = 5.0;

/// Generates `hours` hourly samples ending at `end` (truncated to the
/// hour), oldest first.
#[allow(clippy::cast_precision_loss)]
pub fn generate<R: Rng + ?Sized>(
    rng: &mut R,
    end: NaiveDateTime,
    hours: usize,
) -> Vec<DemandSample> {
    let end = truncate_to_hour(end);
    let span = hours.saturating_sub(1).max(1) as f64;

    (0..hours)
        .map(|i| {
            let back = i64::try_from(hours - 1 - i).unwrap_or(i64::MAX);
            let timestamp = end - Duration::hours(back);
            let trend = TREND_RISE * i as f64 / span;
            let noise = NOISE_SD * standard_normal(rng);
            let anomaly = if rng.gen_bool(ANOMALY_RATE) {
                if rng.gen_bool(0.5) { 0.3 } else { 1.5 }
            } else {
                1.0
            };

            DemandSample {
                timestamp,
                value: (base_demand(timestamp) + trend + noise) * anomaly,
            }
        })
        .collect()
}

/// Deterministic part of the demand for one hour: daily cycle, weekday
/// effect, temperature and holidays.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn base_demand(timestamp: NaiveDateTime) -> f64 {
    let hour = f64::from(timestamp.hour());
    let daily = 15.0f64.mul_add((2.0 * PI * hour / 24.0 - PI / 2.0).sin(), 20.0);

    let weekly = match timestamp.weekday() {
        Weekday::Sat | Weekday::Sun => 0.85,
        _ => 1.0,
    };

    let day_of_year = f64::from(timestamp.ordinal());
    let temperature = 10.0f64.mul_add((2.0 * PI * day_of_year / 365.0).sin(), 20.0);
    let temperature_effect = 0.6 * (temperature - 25.0).max(0.0);

    let holiday = if HOLIDAYS.contains(&(timestamp.month(), timestamp.day())) {
        HOLIDAY_BOOST
    } else {
        0.0
    };

    (50.0 + daily).mul_add(weekly, temperature_effect + holiday)
}

/// Standard normal draw via the Box-Muller transform.
fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // 1 - u keeps the argument of ln in (0, 1].
    let u1: f64 = 1.0 - rng.r#gen::<f64>();
    let u2: f64 = rng.r#gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

fn truncate_to_hour(t: NaiveDateTime) -> NaiveDateTime {
    t.date()
        .and_hms_opt(t.hour(), 0, 0)
        .unwrap_or(t)
}
