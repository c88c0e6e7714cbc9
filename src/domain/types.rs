//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - held once per session in an immutable `Dataset`
//! - passed through the filter → encode → forecast pipeline
//! - exported to CSV/JSON

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Label used for rows that do not belong to any historical event window.
pub const BASELINE_LABEL: &str = "No event";

/// Forecast horizon slider bounds (days), mirrored by the TUI and CLI defaults.
pub const HORIZON_MIN_DAYS: usize = 30;
pub const HORIZON_MAX_DAYS: usize = 365;
pub const HORIZON_STEP_DAYS: usize = 30;
pub const HORIZON_DEFAULT_DAYS: usize = 90;

/// Index of an event label inside the session's `EventVocabulary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(pub usize);

/// One row of the input table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceObservation {
    pub date: NaiveDate,
    /// Brent price in USD per barrel.
    pub price: f64,
    pub event: EventId,
}

/// A row as read from the file, before the vocabulary is resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub line: usize,
    pub date: NaiveDate,
    pub price: f64,
    pub label: String,
}

/// The distinct event labels of a dataset, in first-appearance (chronological) order.
///
/// Resolved once when the dataset is built; filters and encoders only look labels up.
#[derive(Debug, Clone, Default)]
pub struct EventVocabulary {
    labels: Vec<String>,
    index: HashMap<String, EventId>,
}

impl EventVocabulary {
    /// Return the id for `label`, assigning the next id on first sight.
    pub fn intern(&mut self, label: &str) -> EventId {
        if let Some(&id) = self.index.get(label) {
            return id;
        }
        let id = EventId(self.labels.len());
        self.labels.push(label.to_string());
        self.index.insert(label.to_string(), id);
        id
    }

    pub fn id(&self, label: &str) -> Option<EventId> {
        self.index.get(label).copied()
    }

    /// Label for an id handed out by this vocabulary.
    ///
    /// Unknown ids render as `"?"` rather than panicking inside draw code.
    pub fn label(&self, id: EventId) -> &str {
        self.labels.get(id.0).map(String::as_str).unwrap_or("?")
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = EventId> + '_ {
        (0..self.labels.len()).map(EventId)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

/// Summary stats about the loaded table.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStats {
    pub n_rows: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub price_min: f64,
    pub price_max: f64,
}

/// One point of a forecast: the fitted history or the future extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub date: NaiveDate,
    pub predicted_price: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    /// `true` for dates after the last observed date.
    pub is_future: bool,
}

/// Shape of a fitted model, reported next to its forecast.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelSummary {
    /// Seasonal components the history could support (e.g. `"yearly"`).
    pub seasonalities: Vec<&'static str>,
    pub n_changepoints: usize,
    /// Residual standard deviation, USD.
    pub residual_sd: f64,
    /// Fitted coefficient of each event regressor, USD.
    pub regressor_effects: Vec<(String, f64)>,
}

/// Output of the forecast adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    /// Fitted history followed by `horizon` future rows.
    pub rows: Vec<ForecastRow>,
    pub horizon: usize,
    /// Name of the backend that produced the rows.
    pub backend: &'static str,
    pub model: ModelSummary,
}

impl Forecast {
    pub fn history(&self) -> impl Iterator<Item = &ForecastRow> {
        self.rows.iter().filter(|r| !r.is_future)
    }

    pub fn future(&self) -> impl Iterator<Item = &ForecastRow> {
        self.rows.iter().filter(|r| r.is_future)
    }

    pub fn last(&self) -> Option<&ForecastRow> {
        self.rows.last()
    }
}

/// Which forecasting backend the session should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ForecasterKind {
    /// Bundled additive regression (trend + seasonality + event regressors).
    Additive,
    /// Forecasting disabled; history views still work.
    None,
}

/// The dashboard views, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Introduction,
    Exploration,
    Forecasting,
}

impl View {
    pub const ALL: [View; 3] = [View::Introduction, View::Exploration, View::Forecasting];

    pub fn title(self) -> &'static str {
        match self {
            View::Introduction => "Introduction",
            View::Exploration => "Exploration & Insights",
            View::Forecasting => "Forecasting",
        }
    }

    pub fn index(self) -> usize {
        match self {
            View::Introduction => 0,
            View::Exploration => 1,
            View::Forecasting => 2,
        }
    }

    pub fn next(self) -> Self {
        match self {
            View::Introduction => View::Exploration,
            View::Exploration => View::Forecasting,
            View::Forecasting => View::Introduction,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            View::Introduction => View::Forecasting,
            View::Exploration => View::Introduction,
            View::Forecasting => View::Exploration,
        }
    }
}

/// Knobs of the additive forecaster.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    /// Seed for the uncertainty simulation (same seed, same bands).
    pub seed: u64,
    /// Number of Monte-Carlo draws used for the interval.
    pub uncertainty_samples: usize,
    /// Central probability mass of the interval (e.g. 0.8).
    pub interval_width: f64,
    /// Maximum number of trend changepoints.
    pub n_changepoints: usize,
    /// Fraction of the history in which changepoints may be placed.
    pub changepoint_range: f64,
    /// Prior scale of the trend rate changes (smaller = stiffer trend).
    pub changepoint_prior_scale: f64,
    /// Prior scale of the Fourier seasonality coefficients.
    pub seasonality_prior_scale: f64,
    /// Prior scale of the event regressor coefficients.
    pub regressor_prior_scale: f64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            seed: 42,
            uncertainty_samples: 300,
            interval_width: 0.8,
            n_changepoints: 25,
            changepoint_range: 0.8,
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
            regressor_prior_scale: 10.0,
        }
    }
}

/// A full session's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus `.env` / environment defaults).
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub forecaster: ForecasterKind,
    pub horizon: usize,
    pub model: ModelSettings,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("brent_com_eventos.csv"),
            forecaster: ForecasterKind::Additive,
            horizon: HORIZON_DEFAULT_DAYS,
            model: ModelSettings::default(),
            plot: false,
            plot_width: 100,
            plot_height: 25,
            export: None,
        }
    }
}
