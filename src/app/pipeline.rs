//! Shared view pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! selection -> filter/encode -> guard -> fit/predict -> metrics
//!
//! Each view is a pure function of (dataset, capability, parameters). The CLI
//! and the TUI can then focus on presentation (printing vs widgets).

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::domain::{
    EventId, Forecast, HORIZON_MAX_DAYS, HORIZON_MIN_DAYS, HORIZON_STEP_DAYS,
};
use crate::filter::{FilteredSet, Selection, filter_and_encode};
use crate::forecast::{Capability, ForecastError, run_forecast};
use crate::io::ingest::Dataset;
use crate::report::MetricSummary;

/// Horizon used by the exploration view.
pub const EXPLORATION_HORIZON_DAYS: usize = 90;

/// Result of asking for a forecast on a selection.
#[derive(Debug, Clone)]
pub enum ForecastOutcome {
    Ready {
        forecast: Forecast,
        metrics: Option<MetricSummary>,
    },
    /// Forecasting did not run; the reason is shown instead of a chart.
    Skipped(ForecastError),
}

/// All computed outputs of one view for one set of parameters.
#[derive(Debug, Clone)]
pub struct ViewOutput {
    pub selection: Selection,
    pub filtered: FilteredSet,
    pub outcome: ForecastOutcome,
}

impl ViewOutput {
    pub fn forecast(&self) -> Option<&Forecast> {
        match &self.outcome {
            ForecastOutcome::Ready { forecast, .. } => Some(forecast),
            ForecastOutcome::Skipped(_) => None,
        }
    }

    pub fn metrics(&self) -> Option<&MetricSummary> {
        match &self.outcome {
            ForecastOutcome::Ready { metrics, .. } => metrics.as_ref(),
            ForecastOutcome::Skipped(_) => None,
        }
    }

    pub fn skip_reason(&self) -> Option<&ForecastError> {
        match &self.outcome {
            ForecastOutcome::Ready { .. } => None,
            ForecastOutcome::Skipped(err) => Some(err),
        }
    }
}

/// Exploration view: rows whose event is in `labels`, forecast `horizon` days ahead.
pub fn run_exploration(
    dataset: &Dataset,
    capability: &Capability,
    labels: &BTreeSet<EventId>,
    horizon: usize,
) -> ViewOutput {
    run_view(dataset, capability, Selection::Labels(labels.clone()), horizon)
}

/// Forecasting view: rows dated within `[start, end]`, forecast `horizon` days ahead.
pub fn run_forecasting(
    dataset: &Dataset,
    capability: &Capability,
    start: NaiveDate,
    end: NaiveDate,
    horizon: usize,
) -> ViewOutput {
    run_view(dataset, capability, Selection::DateRange { start, end }, horizon)
}

fn run_view(dataset: &Dataset, capability: &Capability, selection: Selection, horizon: usize) -> ViewOutput {
    let filtered = filter_and_encode(dataset, &selection);
    let outcome = forecast_filtered(capability, &filtered, horizon);
    if let ForecastOutcome::Skipped(reason) = &outcome {
        tracing::info!(%reason, rows = filtered.len(), "forecast skipped");
    }
    ViewOutput {
        selection,
        filtered,
        outcome,
    }
}

fn forecast_filtered(capability: &Capability, filtered: &FilteredSet, horizon: usize) -> ForecastOutcome {
    // An empty selection never reaches the model.
    let Some(last_price) = filtered.last_price() else {
        return ForecastOutcome::Skipped(ForecastError::EmptySelection);
    };
    let forecaster = match capability.forecaster() {
        Ok(f) => f,
        Err(err) => return ForecastOutcome::Skipped(err),
    };
    match run_forecast(forecaster, filtered, horizon) {
        Ok(forecast) => {
            let metrics = MetricSummary::compute(last_price, &forecast);
            ForecastOutcome::Ready { forecast, metrics }
        }
        Err(err) => ForecastOutcome::Skipped(err),
    }
}

/// Clamp a requested interval to the data period, keeping `end >= start`.
pub fn clamp_range(dataset: &Dataset, start: NaiveDate, end: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = dataset.stats.first_date;
    let last = dataset.stats.last_date;
    let start = start.clamp(first, last);
    let end = end.clamp(start, last);
    (start, end)
}

/// Snap a horizon onto the slider: multiples of the step within the slider bounds.
pub fn snap_horizon(days: usize) -> usize {
    let steps = (days + HORIZON_STEP_DAYS / 2) / HORIZON_STEP_DAYS;
    (steps * HORIZON_STEP_DAYS).clamp(HORIZON_MIN_DAYS, HORIZON_MAX_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ForecasterKind, ModelSettings, RawRow};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn three_rows() -> Dataset {
        let rows = [(1, 80.0, "A"), (2, 82.0, "A"), (3, 81.0, "B")]
            .iter()
            .enumerate()
            .map(|(i, &(day, price, label))| RawRow {
                line: i + 2,
                date: ymd(2024, 1, day),
                price,
                label: label.to_string(),
            })
            .collect();
        Dataset::from_rows(rows).unwrap()
    }

    fn available() -> Capability {
        Capability::resolve(ForecasterKind::Additive, &ModelSettings::default())
    }

    #[test]
    fn exploring_label_a_forecasts_with_one_regressor() {
        let data = three_rows();
        let a = data.vocabulary.id("A").unwrap();
        let out = run_exploration(&data, &available(), &BTreeSet::from([a]), 10);

        assert_eq!(out.filtered.len(), 2);
        assert_eq!(out.filtered.indicators.names(), ["A"]);
        let forecast = out.forecast().unwrap();
        assert_eq!(forecast.future().count(), 10);
        let metrics = out.metrics().unwrap();
        assert_eq!(metrics.last_price, 82.0);
        assert!(metrics.percent_change.is_some());
    }

    #[test]
    fn empty_label_selection_skips_without_error() {
        let data = three_rows();
        let out = run_exploration(&data, &available(), &BTreeSet::new(), 90);
        assert!(out.filtered.is_empty());
        assert!(out.forecast().is_none());
        assert!(out.metrics().is_none());
        assert_eq!(out.skip_reason(), Some(&ForecastError::EmptySelection));
    }

    #[test]
    fn single_day_range_is_too_short_to_forecast() {
        let data = three_rows();
        let out = run_forecasting(&data, &available(), ymd(2024, 1, 3), ymd(2024, 1, 3), 30);
        assert_eq!(out.filtered.len(), 1);
        assert_eq!(
            out.skip_reason(),
            Some(&ForecastError::TooFewRows { got: 1, min: 2 })
        );
    }

    #[test]
    fn disabled_capability_still_filters() {
        let data = three_rows();
        let none = Capability::resolve(ForecasterKind::None, &ModelSettings::default());
        let out = run_forecasting(&data, &none, ymd(2024, 1, 1), ymd(2024, 1, 3), 30);
        assert_eq!(out.filtered.len(), 3);
        assert!(matches!(out.skip_reason(), Some(ForecastError::Unavailable(_))));
    }

    #[test]
    fn range_is_clamped_to_the_data_period() {
        let data = three_rows();
        assert_eq!(
            clamp_range(&data, ymd(2023, 1, 1), ymd(2025, 1, 1)),
            (ymd(2024, 1, 1), ymd(2024, 1, 3))
        );
        // end before start collapses onto start
        assert_eq!(
            clamp_range(&data, ymd(2024, 1, 3), ymd(2024, 1, 1)),
            (ymd(2024, 1, 3), ymd(2024, 1, 3))
        );
    }

    #[test]
    fn horizon_snaps_to_slider_steps() {
        assert_eq!(snap_horizon(0), 30);
        assert_eq!(snap_horizon(90), 90);
        assert_eq!(snap_horizon(100), 90);
        assert_eq!(snap_horizon(106), 120);
        assert_eq!(snap_horizon(1000), 365);
    }
}
