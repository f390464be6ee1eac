//! Additive Holt-Winters (triple exponential smoothing).

use crate::ForecastError;

/// Smoothing grid searched by [`HoltWinters::fit_best`].
const ALPHAS: [f64; 4] = [0.1, 0.3, 0.5, 0.7];
const BETAS: [f64; 3] = [0.01, 0.05, 0.1];
const GAMMAS: [f64; 3] = [0.1, 0.3, 0.5];

/// Smoothing parameters and season length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoltWinters {
    /// Level smoothing, in `(0, 1)`.
    pub alpha: f64,
    /// Trend smoothing, in `(0, 1)`.
    pub beta: f64,
    /// Seasonal smoothing, in `(0, 1)`.
    pub gamma: f64,
    /// Observations per season.
    pub season: usize,
}

/// State after fitting a series.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedModel {
    params: HoltWinters,
    level: f64,
    trend: f64,
    seasonals: Vec<f64>,
    len: usize,
    sse: f64,
    residual_sd: f64,
}

/// One forecast step with its prediction interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Point forecast.
    pub value: f64,
    /// Lower bound.
    pub lower: f64,
    /// Upper bound.
    pub upper: f64,
}

/// z-score of a two-sided 95% interval.
pub const Z_95: f64 = 1.96;

impl HoltWinters {
    /// Fits the series. Needs at least two full seasons to initialise
    /// level, trend and seasonal terms.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::InsufficientData`] for short series and
    /// [`ForecastError::NonFinite`] if the series contains NaN or infinity.
    #[allow(clippy::cast_precision_loss)]
    pub fn fit(self, series: &[f64]) -> Result<FittedModel, ForecastError> {
        let m = self.season;
        if m == 0 || series.len() < 2 * m {
            return Err(ForecastError::InsufficientData {
                needed: 2 * m.max(1),
                got: series.len(),
            });
        }
        if series.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::NonFinite);
        }

        let mean = |s: &[f64]| s.iter().sum::<f64>() / s.len() as f64;
        let first = mean(&series[..m]);
        let second = mean(&series[m..2 * m]);

        let mut level = first;
        let mut trend = (second - first) / m as f64;
        let mut seasonals: Vec<f64> = series[..m].iter().map(|y| y - first).collect();

        let mut sse = 0.0;
        let mut scored = 0_usize;
        for (t, &y) in series.iter().enumerate() {
            let s = seasonals[t % m];
            if t >= m {
                let error = y - (level + trend + s);
                sse += error * error;
                scored += 1;
            }
            let previous = level;
            level = self.alpha.mul_add(y - s, (1.0 - self.alpha) * (level + trend));
            trend = self.beta.mul_add(level - previous, (1.0 - self.beta) * trend);
            seasonals[t % m] = self.gamma.mul_add(y - level, (1.0 - self.gamma) * s);
        }

        let residual_sd = if scored > 0 {
            (sse / scored as f64).sqrt()
        } else {
            0.0
        };

        Ok(FittedModel {
            params: self,
            level,
            trend,
            seasonals,
            len: series.len(),
            sse,
            residual_sd,
        })
    }

    /// Fits every parameter combination on a small grid and keeps the one
    /// with the lowest one-step-ahead squared error.
    ///
    /// # Errors
    ///
    /// See [`HoltWinters::fit`].
    pub fn fit_best(series: &[f64], season: usize) -> Result<FittedModel, ForecastError> {
        let mut best: Option<FittedModel> = None;
        for alpha in ALPHAS {
            for beta in BETAS {
                for gamma in GAMMAS {
                    let fitted = Self {
                        alpha,
                        beta,
                        gamma,
                        season,
                    }
                    .fit(series)?;
                    if best.as_ref().is_none_or(|b| fitted.sse < b.sse) {
                        best = Some(fitted);
                    }
                }
            }
        }

        let best = best.ok_or(ForecastError::NonFinite)?;
        log::debug!(
            "Holt-Winters fit: alpha={} beta={} gamma={} rmse={:.3}",
            best.params.alpha,
            best.params.beta,
            best.params.gamma,
            best.residual_sd
        );
        Ok(best)
    }
}

impl FittedModel {
    /// Parameters the model was fitted with.
    #[must_use]
    pub const fn params(&self) -> HoltWinters {
        self.params
    }

    /// Standard deviation of the one-step-ahead residuals.
    #[must_use]
    pub const fn residual_sd(&self) -> f64 {
        self.residual_sd
    }

    /// Point forecasts for the next `steps` observations.
    #[must_use]
    pub fn predict(&self, steps: usize) -> Vec<f64> {
        self.forecast(steps).into_iter().map(|p| p.value).collect()
    }

    /// Forecasts with 95% intervals. The interval widens with the horizon
    /// following the additive model's error propagation.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn forecast(&self, steps: usize) -> Vec<Prediction> {
        let m = self.params.season;
        let HoltWinters {
            alpha, beta, gamma, ..
        } = self.params;

        let mut variance_factor = 1.0;
        (1..=steps)
            .map(|h| {
                if h > 1 {
                    let j = h - 1;
                    let seasonal = if j % m == 0 { gamma } else { 0.0 };
                    let c = alpha.mul_add(beta.mul_add(j as f64, 1.0), seasonal);
                    variance_factor += c * c;
                }
                let value = (h as f64).mul_add(self.trend, self.level)
                    + self.seasonals[(self.len + h - 1) % m];
                let half_width = Z_95 * self.residual_sd * variance_factor.sqrt();
                Prediction {
                    value,
                    lower: value - half_width,
                    upper: value + half_width,
                }
            })
            .collect()
    }
}
