//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments (after loading `.env`)
//! - sets up logging
//! - runs the exploration/forecasting views and prints reports/plots
//! - writes optional exports and synthetic samples

use std::collections::BTreeSet;

use clap::Parser;

use crate::cli::{Command, CommonArgs, ExploreArgs, ForecastArgs, OutputArgs, SampleArgs};
use crate::domain::{DashboardConfig, EventId, ModelSettings};
use crate::error::AppError;
use crate::session::Session;

pub mod pipeline;

use pipeline::ViewOutput;

/// Rows between two lines of the printed forecast table.
const TABLE_STEP: usize = 30;

/// Entry point for the `brent` binary.
pub fn run() -> Result<(), AppError> {
    // Missing `.env` is the normal case.
    let _ = dotenvy::dotenv();

    // We want `brent` and `brent -d prices.csv` to behave like `brent tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Tui(args) => handle_tui(args),
        Command::Explore(args) => {
            crate::logging::init_stderr();
            handle_explore(args)
        }
        Command::Forecast(args) => {
            crate::logging::init_stderr();
            handle_forecast(args)
        }
        Command::Sample(args) => {
            crate::logging::init_stderr();
            handle_sample(args)
        }
    }
}

fn handle_tui(args: CommonArgs) -> Result<(), AppError> {
    crate::logging::init_file(std::path::Path::new(crate::logging::TUI_LOG_FILE))?;
    crate::tui::run(config_from_args(&args, None))
}

fn handle_explore(args: ExploreArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.common, Some((&args.output, args.horizon)));
    let session = Session::open(&config)?;
    let dataset = session.dataset();

    let labels = resolve_labels(&dataset.vocabulary, &args.events)?;
    let output = pipeline::run_exploration(dataset, session.capability(), &labels, config.horizon);

    println!(
        "{}",
        crate::report::format_dataset_summary(dataset, session.source())
    );
    let summaries = crate::report::summarize_events(&output.filtered.observations, &dataset.vocabulary);
    println!("{}", crate::report::format_event_table(&summaries));

    if config.plot {
        let plot = crate::plot::render_history_plot(
            &output.filtered.observations,
            &dataset.vocabulary,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    finish_view(&config, output)
}

fn handle_forecast(args: ForecastArgs) -> Result<(), AppError> {
    let config = config_from_args(&args.common, Some((&args.output, args.horizon)));
    let session = Session::open(&config)?;
    let dataset = session.dataset();

    let start = args.start.unwrap_or(dataset.stats.first_date);
    let end = args.end.unwrap_or(dataset.stats.last_date);
    let (start, end) = pipeline::clamp_range(dataset, start, end);
    if args.start.is_some_and(|s| s != start) || args.end.is_some_and(|e| e != end) {
        tracing::warn!(%start, %end, "interval clamped to the data period");
    }

    let output = pipeline::run_forecasting(dataset, session.capability(), start, end, config.horizon);

    println!(
        "{}",
        crate::report::format_dataset_summary(dataset, session.source())
    );
    println!("Interval: [{start}, {end}] | selected rows: {}\n", output.filtered.len());

    finish_view(&config, output)
}

/// Print the forecast part of a view and write the optional export.
///
/// A skipped forecast is a warning, unless an export was requested: then there
/// is nothing to write and the skip reason becomes the exit status.
fn finish_view(config: &DashboardConfig, output: ViewOutput) -> Result<(), AppError> {
    if let Some(reason) = output.skip_reason() {
        eprintln!("warning: forecast skipped: {reason}");
        if config.export.is_some() {
            return Err(reason.clone().into());
        }
        return Ok(());
    }

    if let Some(forecast) = output.forecast() {
        println!("{}", crate::report::format_forecast_summary(forecast));
        if let Some(metrics) = output.metrics() {
            println!("{}", crate::report::format_metrics(metrics, config.horizon));
        }
        println!("{}", crate::report::format_forecast_table(forecast, TABLE_STEP));

        if config.plot {
            let plot = crate::plot::render_forecast_plot(
                &output.filtered.observations,
                forecast,
                config.plot_width,
                config.plot_height,
            );
            println!("{plot}");
        }

        if let Some(path) = &config.export {
            let format = crate::io::export::write_forecast(path, forecast)?;
            println!("Exported {} rows ({format:?}) to {}", forecast.rows.len(), path.display());
        }
    }

    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = crate::data::SampleConfig {
        start: args.start,
        end: args.end,
        seed: args.seed,
    };
    let rows = crate::data::generate_sample(&config)?;
    crate::data::write_sample_csv(&args.out, &rows)?;
    println!("Wrote {} rows to {}", rows.len(), args.out.display());
    Ok(())
}

/// Map `--events` names onto vocabulary ids; no names means every label.
fn resolve_labels(
    vocabulary: &crate::domain::EventVocabulary,
    names: &[String],
) -> Result<BTreeSet<EventId>, AppError> {
    if names.is_empty() {
        return Ok(vocabulary.ids().collect());
    }

    names
        .iter()
        .map(|name| {
            let name = name.trim();
            vocabulary.id(name).ok_or_else(|| {
                AppError::new(
                    2,
                    format!(
                        "Unknown event label '{name}'. Available labels: {}",
                        vocabulary.labels().join(", ")
                    ),
                )
            })
        })
        .collect()
}

/// Build the session configuration from CLI flags.
///
/// The TUI has no plot/export flags of its own, so `output` is optional.
pub fn config_from_args(common: &CommonArgs, output: Option<(&OutputArgs, usize)>) -> DashboardConfig {
    let mut config = DashboardConfig {
        data_path: common.data.clone(),
        forecaster: common.forecaster,
        model: ModelSettings {
            seed: common.seed,
            uncertainty_samples: common.samples,
            interval_width: common.interval_width,
            n_changepoints: common.changepoints,
            changepoint_prior_scale: common.changepoint_prior_scale,
            ..ModelSettings::default()
        },
        ..DashboardConfig::default()
    };

    if let Some((out, horizon)) = output {
        config.horizon = horizon;
        config.plot = out.plot;
        config.plot_width = out.width;
        config.plot_height = out.height;
        config.export = out.export.clone();
    }
    config
}

/// Rewrite argv so `brent` defaults to `brent tui`.
///
/// Rules:
/// - `brent`                      -> `brent tui`
/// - `brent -d prices.csv ...`    -> `brent tui -d prices.csv ...`
/// - `brent --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "explore" | "forecast" | "sample");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
