//! Command-line parsing for the Brent price dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the filtering/forecasting code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{ForecasterKind, HORIZON_DEFAULT_DAYS};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "brent",
    version,
    about = "Brent oil prices, geopolitical events, and event-aware forecasts"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive dashboard (the default when no subcommand is given).
    Tui(CommonArgs),
    /// Filter by event labels, forecast, and print the summary.
    Explore(ExploreArgs),
    /// Filter by a date interval, forecast, and print the summary.
    Forecast(ForecastArgs),
    /// Write a synthetic price/event file for demos and tests.
    Sample(SampleArgs),
}

/// Options shared by every command that reads the data file.
#[derive(Debug, Args, Clone)]
pub struct CommonArgs {
    /// Price/event CSV file (columns: date, price, event).
    #[arg(
        short = 'd',
        long,
        env = "BRENT_DATA",
        default_value = "brent_com_eventos.csv",
        value_name = "CSV"
    )]
    pub data: PathBuf,

    /// Forecasting backend (`none` disables forecasting).
    #[arg(long, value_enum, env = "BRENT_FORECASTER", default_value_t = ForecasterKind::Additive)]
    pub forecaster: ForecasterKind,

    /// Random seed for the uncertainty simulation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of Monte-Carlo draws behind the uncertainty band.
    #[arg(long, default_value_t = 300)]
    pub samples: usize,

    /// Probability mass inside the uncertainty band.
    #[arg(long, default_value_t = 0.8)]
    pub interval_width: f64,

    /// Maximum number of trend changepoints.
    #[arg(long, default_value_t = 25)]
    pub changepoints: usize,

    /// Flexibility of the trend (larger follows the history more closely).
    #[arg(long, default_value_t = 0.05)]
    pub changepoint_prior_scale: f64,
}

/// Terminal plot and export options.
#[derive(Debug, Args, Clone)]
pub struct OutputArgs {
    /// Render ASCII plots of the history and the forecast.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export forecast rows to CSV (or JSON with a `.json` extension).
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ExploreArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Comma-separated event labels to keep (default: all).
    #[arg(long, value_delimiter = ',')]
    pub events: Vec<String>,

    /// Days to forecast past the last selected date.
    #[arg(long, default_value_t = HORIZON_DEFAULT_DAYS)]
    pub horizon: usize,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args, Clone)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// First date of the training window (default: first date in the file).
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub start: Option<NaiveDate>,

    /// Last date of the training window (default: last date in the file).
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub end: Option<NaiveDate>,

    /// Days to forecast past the last selected date.
    #[arg(long, default_value_t = HORIZON_DEFAULT_DAYS)]
    pub horizon: usize,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(short = 'o', long, value_name = "CSV")]
    pub out: PathBuf,

    /// Random seed for the synthetic prices.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// First date of the synthetic series.
    #[arg(long, default_value = "1987-05-20", value_name = "YYYY-MM-DD")]
    pub start: NaiveDate,

    /// Last date of the synthetic series.
    #[arg(long, default_value = "2024-06-28", value_name = "YYYY-MM-DD")]
    pub end: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn explore_parses_comma_separated_events() {
        let cli = Cli::try_parse_from([
            "brent", "explore", "-d", "x.csv", "--events", "Gulf War,COVID-19", "--horizon", "30",
        ])
        .unwrap();
        let Command::Explore(args) = cli.command else {
            panic!("expected explore");
        };
        assert_eq!(args.events, ["Gulf War", "COVID-19"]);
        assert_eq!(args.horizon, 30);
        assert_eq!(args.common.data, PathBuf::from("x.csv"));
        assert!(!args.output.plot);
    }

    #[test]
    fn forecast_parses_dates() {
        let cli = Cli::try_parse_from([
            "brent", "forecast", "--start", "2020-01-01", "--end", "2021-12-31", "--forecaster", "none",
        ])
        .unwrap();
        let Command::Forecast(args) = cli.command else {
            panic!("expected forecast");
        };
        assert_eq!(args.start, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(args.common.forecaster, ForecasterKind::None);
        assert_eq!(args.horizon, HORIZON_DEFAULT_DAYS);
    }
}
