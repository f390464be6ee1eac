//! Holdout accuracy metrics.

/// Coefficient of determination. A constant `actual` scores 1 for a
/// perfect fit and 0 otherwise.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn r2(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_res: f64 = pairs(actual, predicted).map(|(a, p)| (a - p).powi(2)).sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

/// Mean absolute error.
#[must_use]
pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    mean(pairs(actual, predicted).map(|(a, p)| (a - p).abs()))
}

/// Root mean squared error.
#[must_use]
pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    mean(pairs(actual, predicted).map(|(a, p)| (a - p).powi(2))).sqrt()
}

/// Mean absolute percentage error, skipping zero actuals.
#[must_use]
pub fn mape(actual: &[f64], predicted: &[f64]) -> f64 {
    mean(
        pairs(actual, predicted)
            .filter(|(a, _)| *a != 0.0)
            .map(|(a, p)| ((a - p) / a).abs() * 100.0),
    )
}

fn pairs<'a>(actual: &'a [f64], predicted: &'a [f64]) -> impl Iterator<Item = (f64, f64)> + 'a {
    actual.iter().copied().zip(predicted.iter().copied())
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0_usize), |(s, n), v| (s + v, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACTUAL: [f64; 4] = [10.0, 20.0, 30.0, 40.0];
    const PREDICTED: [f64; 4] = [12.0, 18.0, 33.0, 40.0];

    #[test]
    fn perfect_prediction() {
        assert!((r2(&ACTUAL, &ACTUAL) - 1.0).abs() < 1e-12);
        assert!(mae(&ACTUAL, &ACTUAL).abs() < 1e-12);
        assert!(rmse(&ACTUAL, &ACTUAL).abs() < 1e-12);
        assert!(mape(&ACTUAL, &ACTUAL).abs() < 1e-12);
    }

    #[test]
    fn known_errors() {
        // Residuals -2, 2, -3, 0; ss_res = 17, ss_tot = 500.
        assert!((r2(&ACTUAL, &PREDICTED) - (1.0 - 17.0 / 500.0)).abs() < 1e-12);
        assert!((mae(&ACTUAL, &PREDICTED) - 1.75).abs() < 1e-12);
        assert!((rmse(&ACTUAL, &PREDICTED) - (17.0f64 / 4.0).sqrt()).abs() < 1e-12);
        // (20% + 10% + 10% + 0%) / 4
        assert!((mape(&ACTUAL, &PREDICTED) - 10.0).abs() < 1e-12);
    }

    #[test]
    fn mape_skips_zero_actuals() {
        assert!((mape(&[0.0, 50.0], &[5.0, 45.0]) - 10.0).abs() < 1e-12);
        assert!(mape(&[0.0], &[5.0]).abs() < 1e-12);
    }

    #[test]
    fn empty_inputs_score_zero() {
        assert!(r2(&[], &[]).abs() < 1e-12);
        assert!(mae(&[], &[]).abs() < 1e-12);
    }
}
