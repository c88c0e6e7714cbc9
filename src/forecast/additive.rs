//! Additive regression forecaster.
//!
//! ```text
//! y(t) = trend(t) + seasonality(t) + Σ_k β_k x_k(t) + ε
//! ```
//!
//! - `trend` is piecewise linear with rate changes at fixed changepoints
//! - `seasonality` is a sum of truncated Fourier series (yearly / weekly)
//! - `x_k` are the event indicator columns
//!
//! Every component is linear in its coefficients, so one fit is a single
//! ridge-penalized least squares solve. The penalties play the role of
//! zero-mean priors: small prior scale, strong shrinkage. The intercept and
//! base slope are left unpenalized so that a constant indicator column is
//! absorbed into the level instead of vanishing on the zeroed future rows.

use nalgebra::{DMatrix, DVector};

use crate::domain::{ModelSettings, ModelSummary};
use crate::forecast::features::{
    DesignLayout, Seasonality, TimeScale, auto_seasonalities, changepoints, fill_design_row,
};
use crate::forecast::uncertainty::{UncertaintyParams, interval_bounds};
use crate::forecast::{ForecastError, Forecaster, History, MIN_TRAINING_ROWS, Prediction, PredictionFrame};
use crate::math::solve_ridge;

/// Reference noise level (in scaled price units) that converts prior scales
/// into ridge penalties: `λ = (NOISE_REF / prior_scale)²`.
const NOISE_REF: f64 = 0.05;

#[derive(Debug, Clone)]
pub struct AdditiveForecaster {
    settings: ModelSettings,
}

impl AdditiveForecaster {
    /// Validate the settings; an invalid configuration disables forecasting.
    pub fn new(settings: ModelSettings) -> Result<Self, ForecastError> {
        let bad = |msg: &str| Err(ForecastError::Unavailable(msg.to_string()));
        if !(settings.interval_width > 0.0 && settings.interval_width < 1.0) {
            return bad("interval width must be strictly between 0 and 1");
        }
        if !(0.0..=1.0).contains(&settings.changepoint_range) {
            return bad("changepoint range must be within [0, 1]");
        }
        for (name, scale) in [
            ("changepoint", settings.changepoint_prior_scale),
            ("seasonality", settings.seasonality_prior_scale),
            ("regressor", settings.regressor_prior_scale),
        ] {
            if !(scale.is_finite() && scale > 0.0) {
                return Err(ForecastError::Unavailable(format!(
                    "{name} prior scale must be positive, got {scale}"
                )));
            }
        }
        Ok(Self { settings })
    }
}

/// A fitted additive model.
#[derive(Debug, Clone)]
pub struct AdditiveFit {
    scale: TimeScale,
    y_scale: f64,
    changepoints: Vec<f64>,
    seasonalities: Vec<Seasonality>,
    layout: DesignLayout,
    beta: DVector<f64>,
    regressor_names: Vec<String>,
    /// Residual standard deviation (scaled units).
    sigma: f64,
    /// Mean absolute trend rate change, the scale of simulated future changes.
    delta_scale: f64,
}

impl AdditiveFit {
    /// Fitted coefficient of each event indicator, in price units.
    pub fn regressor_effects(&self) -> Vec<(String, f64)> {
        self.layout
            .regressor_cols()
            .zip(&self.regressor_names)
            .map(|(col, name)| (name.clone(), self.beta[col] * self.y_scale))
            .collect()
    }

    pub fn seasonalities(&self) -> &[Seasonality] {
        &self.seasonalities
    }

    pub fn n_changepoints(&self) -> usize {
        self.changepoints.len()
    }

    /// Residual standard deviation in price units.
    pub fn residual_sd(&self) -> f64 {
        self.sigma * self.y_scale
    }
}

impl Forecaster for AdditiveForecaster {
    type Model = AdditiveFit;

    fn name(&self) -> &'static str {
        "additive"
    }

    fn fit(&self, history: &History<'_>) -> Result<AdditiveFit, ForecastError> {
        let n = history.dates.len();
        if history.y.len() != n || history.regressors.nrows() != n {
            return Err(ForecastError::Solve(format!(
                "history shape mismatch: {n} dates, {} prices, {} regressor rows",
                history.y.len(),
                history.regressors.nrows()
            )));
        }
        let scale = TimeScale::from_history(history.dates).ok_or(ForecastError::TooFewRows {
            got: n.min(1),
            min: MIN_TRAINING_ROWS,
        })?;

        let y_scale = history.y.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        let y_scale = if y_scale > 0.0 { y_scale } else { 1.0 };

        let t: Vec<f64> = history.dates.iter().map(|&d| scale.scale(d)).collect();
        let cps = changepoints(&t, self.settings.n_changepoints, self.settings.changepoint_range);
        let seasonalities = auto_seasonalities(history.dates);
        let layout = DesignLayout {
            n_changepoints: cps.len(),
            seasonal_width: seasonalities.iter().map(Seasonality::width).sum(),
            n_regressors: history.regressors.ncols(),
        };

        let width = layout.width();
        let mut x = DMatrix::zeros(n, width);
        let mut row = Vec::with_capacity(width);
        let mut reg = Vec::with_capacity(layout.n_regressors);
        for i in 0..n {
            reg.clear();
            reg.extend(history.regressors.row(i).iter().copied());
            fill_design_row(&mut row, t[i], history.dates[i], &cps, &seasonalities, &reg);
            for (j, v) in row.iter().enumerate() {
                x[(i, j)] = *v;
            }
        }
        let y = DVector::from_iterator(n, history.y.iter().map(|v| v / y_scale));

        let penalty = |prior_scale: f64| (NOISE_REF / prior_scale).powi(2);
        let mut penalties = vec![0.0; width];
        for col in layout.changepoint_cols() {
            penalties[col] = penalty(self.settings.changepoint_prior_scale);
        }
        for col in layout.seasonal_cols() {
            penalties[col] = penalty(self.settings.seasonality_prior_scale);
        }
        for col in layout.regressor_cols() {
            penalties[col] = penalty(self.settings.regressor_prior_scale);
        }

        let beta = solve_ridge(&x, &y, &penalties)
            .ok_or_else(|| ForecastError::Solve("least squares solve did not converge".to_string()))?;

        let residuals = &y - &x * &beta;
        let sigma = (residuals.norm_squared() / n as f64).sqrt();

        let deltas: Vec<f64> = layout.changepoint_cols().map(|c| beta[c].abs()).collect();
        let delta_scale = if deltas.is_empty() {
            0.0
        } else {
            deltas.iter().sum::<f64>() / deltas.len() as f64
        };

        tracing::debug!(
            rows = n,
            changepoints = cps.len(),
            seasonal_cols = layout.seasonal_width,
            regressors = layout.n_regressors,
            residual_sd = sigma * y_scale,
            "additive model fitted"
        );

        Ok(AdditiveFit {
            scale,
            y_scale,
            changepoints: cps,
            seasonalities,
            layout,
            beta,
            regressor_names: history.regressor_names.to_vec(),
            sigma,
            delta_scale,
        })
    }

    fn predict(&self, model: &AdditiveFit, frame: &PredictionFrame) -> Result<Vec<Prediction>, ForecastError> {
        if frame.regressors.ncols() != model.layout.n_regressors || frame.regressors.nrows() != frame.dates.len() {
            return Err(ForecastError::Solve(format!(
                "prediction frame has {}x{} regressors for {} dates; model expects {} columns",
                frame.regressors.nrows(),
                frame.regressors.ncols(),
                frame.dates.len(),
                model.layout.n_regressors
            )));
        }

        let t: Vec<f64> = frame.dates.iter().map(|&d| model.scale.scale(d)).collect();
        let mut row = Vec::with_capacity(model.layout.width());
        let mut reg = Vec::with_capacity(model.layout.n_regressors);
        let yhat: Vec<f64> = frame
            .dates
            .iter()
            .enumerate()
            .map(|(i, &date)| {
                reg.clear();
                reg.extend(frame.regressors.row(i).iter().copied());
                fill_design_row(&mut row, t[i], date, &model.changepoints, &model.seasonalities, &reg);
                row.iter().zip(model.beta.iter()).map(|(a, b)| a * b).sum::<f64>()
            })
            .collect();

        let params = UncertaintyParams {
            sigma: model.sigma,
            // Changepoints were spread over a history of unit length.
            changepoint_rate: model.changepoints.len() as f64,
            delta_scale: model.delta_scale,
            samples: self.settings.uncertainty_samples,
            interval_width: self.settings.interval_width,
            seed: self.settings.seed,
        };
        let bounds = interval_bounds(&yhat, &t, &params);

        Ok(yhat
            .iter()
            .zip(bounds)
            .map(|(&y, (lo, hi))| Prediction {
                yhat: y * model.y_scale,
                lower: lo * model.y_scale,
                upper: hi * model.y_scale,
            })
            .collect())
    }

    fn summarize(&self, model: &AdditiveFit) -> ModelSummary {
        ModelSummary {
            seasonalities: model.seasonalities().iter().map(|s| s.name).collect(),
            n_changepoints: model.n_changepoints(),
            residual_sd: model.residual_sd(),
            regressor_effects: model.regressor_effects(),
        }
    }
}
