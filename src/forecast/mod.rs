//! Forecast adapter.
//!
//! The dashboard treats the forecasting model as a collaborator behind the
//! `Forecaster` trait: it is fit on a history (prices + one regressor per event
//! indicator column) and asked to predict over an extended date index. This
//! module owns everything around that call:
//!
//! - the minimum-history guard (checked before the model is touched)
//! - building the future index with every indicator forced to zero
//! - tagging rows as fitted history vs. future
//! - the explicit capability check that decides whether forecasting is on

use chrono::{Days, NaiveDate};
use nalgebra::DMatrix;

use crate::domain::{Forecast, ForecastRow, ForecasterKind, ModelSettings, ModelSummary};
use crate::filter::FilteredSet;

pub mod additive;
pub mod features;
pub mod uncertainty;

pub use additive::{AdditiveFit, AdditiveForecaster};

/// Fewer distinct dates than this makes the trend fit ill-posed.
pub const MIN_TRAINING_ROWS: usize = 2;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ForecastError {
    #[error("the current selection contains no data; forecast skipped")]
    EmptySelection,

    #[error("need at least {min} distinct dates to fit a forecast, got {got}")]
    TooFewRows { got: usize, min: usize },

    #[error("forecasting unavailable: {0}")]
    Unavailable(String),

    #[error("model fit failed: {0}")]
    Solve(String),
}

/// Training data handed to a forecaster.
#[derive(Debug, Clone, Copy)]
pub struct History<'a> {
    pub dates: &'a [NaiveDate],
    pub y: &'a [f64],
    /// One column per event indicator, one row per date.
    pub regressors: &'a DMatrix<f64>,
    pub regressor_names: &'a [String],
}

/// Dates to predict, with the regressor values to use on each.
#[derive(Debug, Clone)]
pub struct PredictionFrame {
    pub dates: Vec<NaiveDate>,
    pub regressors: DMatrix<f64>,
}

/// A point estimate with its interval bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub yhat: f64,
    pub lower: f64,
    pub upper: f64,
}

pub trait Forecaster {
    type Model;

    fn name(&self) -> &'static str;

    fn fit(&self, history: &History<'_>) -> Result<Self::Model, ForecastError>;

    fn predict(&self, model: &Self::Model, frame: &PredictionFrame) -> Result<Vec<Prediction>, ForecastError>;

    /// Components and fitted effects of `model`, in price units.
    fn summarize(&self, model: &Self::Model) -> ModelSummary;
}

/// Whether this session can forecast, decided once up front.
#[derive(Debug, Clone)]
pub enum Capability {
    Available(AdditiveForecaster),
    Disabled(String),
}

impl Capability {
    pub fn resolve(kind: ForecasterKind, settings: &ModelSettings) -> Self {
        match kind {
            ForecasterKind::None => {
                Capability::Disabled("disabled by configuration (--forecaster none)".to_string())
            }
            ForecasterKind::Additive => match AdditiveForecaster::new(settings.clone()) {
                Ok(forecaster) => Capability::Available(forecaster),
                Err(err) => Capability::Disabled(err.to_string()),
            },
        }
    }

    pub fn forecaster(&self) -> Result<&AdditiveForecaster, ForecastError> {
        match self {
            Capability::Available(f) => Ok(f),
            Capability::Disabled(reason) => Err(ForecastError::Unavailable(reason.clone())),
        }
    }
}

/// Reject histories too short to fit, before any model code runs.
pub fn ensure_min_rows(dates: &[NaiveDate]) -> Result<(), ForecastError> {
    if dates.is_empty() {
        return Err(ForecastError::EmptySelection);
    }
    let mut distinct = dates.to_vec();
    distinct.dedup();
    if distinct.len() < MIN_TRAINING_ROWS {
        return Err(ForecastError::TooFewRows {
            got: distinct.len(),
            min: MIN_TRAINING_ROWS,
        });
    }
    Ok(())
}

/// Fit on the filtered history and predict `horizon` days past its last date.
///
/// The returned rows cover every historical date followed by exactly
/// `horizon` daily future rows. Future rows see all indicators at zero.
pub fn run_forecast<F: Forecaster>(
    forecaster: &F,
    set: &FilteredSet,
    horizon: usize,
) -> Result<Forecast, ForecastError> {
    let dates: Vec<NaiveDate> = set.observations.iter().map(|o| o.date).collect();
    ensure_min_rows(&dates)?;

    let y: Vec<f64> = set.observations.iter().map(|o| o.price).collect();
    let history = History {
        dates: &dates,
        y: &y,
        regressors: set.indicators.values(),
        regressor_names: set.indicators.names(),
    };

    let model = forecaster.fit(&history)?;
    let frame = future_frame(&dates, set.indicators.values(), horizon)?;
    let predictions = forecaster.predict(&model, &frame)?;
    if predictions.len() != frame.dates.len() {
        return Err(ForecastError::Solve(format!(
            "{} returned {} predictions for {} dates",
            forecaster.name(),
            predictions.len(),
            frame.dates.len()
        )));
    }

    let n_history = dates.len();
    let rows = frame
        .dates
        .iter()
        .zip(predictions)
        .enumerate()
        .map(|(i, (&date, p))| ForecastRow {
            date,
            predicted_price: p.yhat,
            lower_bound: p.lower,
            upper_bound: p.upper,
            is_future: i >= n_history,
        })
        .collect();

    tracing::debug!(
        backend = forecaster.name(),
        history = n_history,
        horizon,
        regressors = set.indicators.n_cols(),
        "forecast complete"
    );

    Ok(Forecast {
        rows,
        horizon,
        backend: forecaster.name(),
        model: forecaster.summarize(&model),
    })
}

/// History dates plus `horizon` consecutive days, regressors zero-padded.
pub fn future_frame(
    dates: &[NaiveDate],
    regressors: &DMatrix<f64>,
    horizon: usize,
) -> Result<PredictionFrame, ForecastError> {
    let last = *dates.last().ok_or(ForecastError::EmptySelection)?;

    let mut all_dates = dates.to_vec();
    for step in 1..=horizon as u64 {
        let date = last
            .checked_add_days(Days::new(step))
            .ok_or_else(|| ForecastError::Solve(format!("date overflow {step} days after {last}")))?;
        all_dates.push(date);
    }

    let mut padded = DMatrix::zeros(all_dates.len(), regressors.ncols());
    padded
        .view_mut((0, 0), (regressors.nrows(), regressors.ncols()))
        .copy_from(regressors);

    Ok(PredictionFrame {
        dates: all_dates,
        regressors: padded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EventId, EventVocabulary, PriceObservation};
    use crate::filter::IndicatorMatrix;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn filtered(rows: &[(NaiveDate, f64, usize)], labels: &[&str]) -> FilteredSet {
        let mut vocabulary = EventVocabulary::default();
        for l in labels {
            vocabulary.intern(l);
        }
        let observations: Vec<PriceObservation> = rows
            .iter()
            .map(|&(date, price, event)| PriceObservation {
                date,
                price,
                event: EventId(event),
            })
            .collect();
        let indicators = IndicatorMatrix::encode(&observations, &vocabulary);
        FilteredSet {
            observations,
            indicators,
        }
    }

    fn additive() -> AdditiveForecaster {
        AdditiveForecaster::new(ModelSettings::default()).unwrap()
    }

    #[test]
    fn guard_rejects_single_row_and_accepts_two() {
        assert_eq!(ensure_min_rows(&[]), Err(ForecastError::EmptySelection));
        assert_eq!(
            ensure_min_rows(&[ymd(2024, 1, 1)]),
            Err(ForecastError::TooFewRows { got: 1, min: 2 })
        );
        assert_eq!(ensure_min_rows(&[ymd(2024, 1, 1), ymd(2024, 1, 2)]), Ok(()));
    }

    #[test]
    fn horizon_adds_exactly_h_future_rows_with_zero_indicators() {
        let set = filtered(
            &[
                (ymd(2024, 1, 1), 80.0, 0),
                (ymd(2024, 1, 2), 82.0, 0),
                (ymd(2024, 1, 3), 81.0, 1),
            ],
            &["A", "B"],
        );
        let frame = future_frame(
            &set.observations.iter().map(|o| o.date).collect::<Vec<_>>(),
            set.indicators.values(),
            5,
        )
        .unwrap();
        assert_eq!(frame.dates.len(), 8);
        assert_eq!(frame.dates[3], ymd(2024, 1, 4));
        assert_eq!(frame.dates[7], ymd(2024, 1, 8));
        for i in 3..8 {
            assert!(frame.regressors.row(i).iter().all(|&v| v == 0.0));
        }

        let forecast = run_forecast(&additive(), &set, 5).unwrap();
        assert_eq!(forecast.future().count(), 5);
        assert_eq!(forecast.history().count(), 3);
        assert!(forecast.future().all(|r| r.date > ymd(2024, 1, 3)));
    }

    #[test]
    fn zero_horizon_returns_only_the_fitted_history() {
        let set = filtered(&[(ymd(2024, 1, 1), 80.0, 0), (ymd(2024, 1, 2), 82.0, 0)], &["A"]);
        let forecast = run_forecast(&additive(), &set, 0).unwrap();
        assert_eq!(forecast.rows.len(), 2);
        assert_eq!(forecast.future().count(), 0);
    }

    #[test]
    fn label_a_scenario_fits_on_exactly_two_rows() {
        // 3-row file filtered to label A keeps two rows, which is just enough.
        let set = filtered(&[(ymd(2024, 1, 1), 80.0, 0), (ymd(2024, 1, 2), 82.0, 0)], &["A", "B"]);
        assert_eq!(set.indicators.names(), ["A"]);

        let forecast = run_forecast(&additive(), &set, 1).unwrap();
        assert_eq!(forecast.rows.len(), 3);
        let effects = &forecast.model.regressor_effects;
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].0, "A");
        // Two points pin a straight line.
        assert!((forecast.rows[0].predicted_price - 80.0).abs() < 1e-3);
        assert!((forecast.rows[1].predicted_price - 82.0).abs() < 1e-3);

        let single = filtered(&[(ymd(2024, 1, 3), 81.0, 1)], &["A", "B"]);
        assert_eq!(
            run_forecast(&additive(), &single, 1).unwrap_err(),
            ForecastError::TooFewRows { got: 1, min: 2 }
        );
    }

    #[test]
    fn empty_selection_is_reported_not_fitted() {
        let empty = filtered(&[], &["A"]);
        assert_eq!(
            run_forecast(&additive(), &empty, 30).unwrap_err(),
            ForecastError::EmptySelection
        );
    }

    #[test]
    fn disabled_capability_explains_itself() {
        let cap = Capability::resolve(ForecasterKind::None, &ModelSettings::default());
        assert!(cap.forecaster().is_err());
        let err = cap.forecaster().unwrap_err();
        assert!(matches!(err, ForecastError::Unavailable(ref r) if r.contains("--forecaster none")));

        let bad = ModelSettings {
            interval_width: 1.5,
            ..ModelSettings::default()
        };
        assert!(Capability::resolve(ForecasterKind::Additive, &bad).forecaster().is_err());
    }
}
