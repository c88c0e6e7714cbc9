//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the filter/forecast code stays clean and testable
//! - output changes are localized (the CLI and the TUI share these strings)

use std::path::Path;

use crate::domain::Forecast;
use crate::io::ingest::Dataset;
use crate::report::{EventSummary, MetricSummary};

/// `$80.00`
pub fn fmt_price(v: f64) -> String {
    if v < 0.0 {
        format!("-${:.2}", v.abs())
    } else {
        format!("${v:.2}")
    }
}

/// `1.54%`, or `n/a` when the change is undefined.
pub fn fmt_pct(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v:.2}%"),
        None => "n/a".to_string(),
    }
}

/// Metric captions paired with their formatted values, in display order.
pub fn metric_cells(metrics: &MetricSummary, horizon: usize) -> [(String, String); 3] {
    [
        ("Current price".to_string(), fmt_price(metrics.last_price)),
        (
            format!("Forecast in {horizon} days"),
            fmt_price(metrics.predicted_price),
        ),
        ("Estimated change".to_string(), fmt_pct(metrics.percent_change)),
    ]
}

/// Format the dataset header (source, period, price range, event labels).
pub fn format_dataset_summary(dataset: &Dataset, source: &Path) -> String {
    let mut out = String::new();
    let stats = &dataset.stats;

    out.push_str("=== brent - Brent Oil Prices & Geopolitical Events ===\n");
    out.push_str(&format!("Data: {}\n", source.display()));
    out.push_str(&format!(
        "Rows: n={} | period=[{}, {}] | price=[{}, {}]\n",
        stats.n_rows,
        stats.first_date,
        stats.last_date,
        fmt_price(stats.price_min),
        fmt_price(stats.price_max),
    ));
    out.push_str(&format!("Events: {}\n", dataset.vocabulary.labels().join(", ")));

    out
}

/// Format the metric block under a forecast.
pub fn format_metrics(metrics: &MetricSummary, horizon: usize) -> String {
    let mut out = String::new();
    for (label, value) in metric_cells(metrics, horizon) {
        out.push_str(&format!("{:<20} {value}\n", format!("{label}:")));
    }
    out
}

/// Format a short description of how a forecast was produced.
pub fn format_forecast_summary(forecast: &Forecast) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Forecast: backend={} | history={} rows | horizon={} days\n",
        forecast.backend,
        forecast.history().count(),
        forecast.horizon,
    ));

    let model = &forecast.model;
    let seasonality = if model.seasonalities.is_empty() {
        "none".to_string()
    } else {
        model.seasonalities.join(", ")
    };
    out.push_str(&format!(
        "Model: seasonality={seasonality} | changepoints={} | residual sd={}\n",
        model.n_changepoints,
        fmt_price(model.residual_sd),
    ));

    if model.regressor_effects.is_empty() {
        out.push_str("Event effects: (none)\n");
    } else {
        let effects: Vec<String> = model
            .regressor_effects
            .iter()
            .map(|(name, effect)| {
                let sign = if *effect < 0.0 { "" } else { "+" };
                format!("{name} {sign}{}", fmt_price(*effect))
            })
            .collect();
        out.push_str(&format!("Event effects: {}\n", effects.join(", ")));
    }
    out
}

/// Format the per-event table.
pub fn format_event_table(rows: &[EventSummary]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<28} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10}\n",
            "event", "rows", "from", "to", "mean", "min", "max"
        )
        .trim_end(),
    );
    out.push('\n');

    out.push_str(
        format!(
            "{:-<28} {:-<6} {:-<10} {:-<10} {:-<10} {:-<10} {:-<10}\n",
            "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for r in rows {
        out.push_str(
            format!(
                "{:<28} {:>6} {:>10} {:>10} {:>10} {:>10} {:>10}\n",
                truncate(&r.label, 28),
                r.n_rows,
                r.first_date,
                r.last_date,
                fmt_price(r.mean_price),
                fmt_price(r.min_price),
                fmt_price(r.max_price),
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format future forecast rows, one every `step` days plus the final one.
pub fn format_forecast_table(forecast: &Forecast, step: usize) -> String {
    let step = step.max(1);
    let future: Vec<_> = forecast.future().collect();

    let mut out = String::new();
    out.push_str(&format!(
        "{:<10} {:>10} {:>10} {:>10}\n",
        "date", "predicted", "lower", "upper"
    ));
    out.push_str(&format!("{:-<10} {:-<10} {:-<10} {:-<10}\n", "", "", "", ""));

    for (i, r) in future.iter().enumerate() {
        let is_last = i + 1 == future.len();
        if (i + 1) % step != 0 && !is_last {
            continue;
        }
        out.push_str(&format!(
            "{:<10} {:>10} {:>10} {:>10}\n",
            r.date,
            fmt_price(r.predicted_price),
            fmt_price(r.lower_bound),
            fmt_price(r.upper_bound),
        ));
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ForecastRow, ModelSummary};
    use chrono::{Days, NaiveDate};

    #[test]
    fn metric_values_use_two_decimals() {
        assert_eq!(fmt_price(80.0), "$80.00");
        assert_eq!(fmt_price(81.234), "$81.23");
        assert_eq!(fmt_price(-3.5), "-$3.50");
        assert_eq!(fmt_pct(Some(1.5375)), "1.54%");
        assert_eq!(fmt_pct(Some(0.0)), "0.00%");
        assert_eq!(fmt_pct(None), "n/a");
    }

    #[test]
    fn metric_block_names_the_horizon() {
        let metrics = MetricSummary {
            last_price: 80.0,
            predicted_price: 81.23,
            percent_change: Some(1.5375),
        };
        let expected = concat!(
            "Current price:       $80.00\n",
            "Forecast in 90 days: $81.23\n",
            "Estimated change:    1.54%\n",
        );
        assert_eq!(format_metrics(&metrics, 90), expected);
    }

    #[test]
    fn forecast_table_samples_every_step_and_keeps_the_last_row() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let rows = (0..5u64)
            .map(|i| ForecastRow {
                date: start + Days::new(i),
                predicted_price: 80.0 + i as f64,
                lower_bound: 79.0,
                upper_bound: 90.0,
                is_future: i > 0,
            })
            .collect();
        let forecast = Forecast {
            rows,
            horizon: 4,
            backend: "additive",
            model: ModelSummary::default(),
        };

        let table = format_forecast_table(&forecast, 3);
        let body: Vec<&str> = table.lines().skip(2).collect();
        assert_eq!(body.len(), 2);
        assert!(body[0].starts_with("2024-01-04"));
        assert!(body[1].starts_with("2024-01-05"));
    }

    #[test]
    fn forecast_summary_lists_components_and_event_effects() {
        let forecast = Forecast {
            rows: Vec::new(),
            horizon: 90,
            backend: "additive",
            model: ModelSummary {
                seasonalities: vec!["weekly"],
                n_changepoints: 25,
                residual_sd: 1.234,
                regressor_effects: vec![("Gulf War".to_string(), 4.5), ("No event".to_string(), -4.5)],
            },
        };
        let expected = concat!(
            "Forecast: backend=additive | history=0 rows | horizon=90 days\n",
            "Model: seasonality=weekly | changepoints=25 | residual sd=$1.23\n",
            "Event effects: Gulf War +$4.50, No event -$4.50\n",
        );
        assert_eq!(format_forecast_summary(&forecast), expected);

        let bare = Forecast {
            model: ModelSummary::default(),
            ..forecast
        };
        let txt = format_forecast_summary(&bare);
        assert!(txt.contains("seasonality=none"));
        assert!(txt.ends_with("Event effects: (none)\n"));
    }

    #[test]
    fn truncate_marks_cut_labels() {
        assert_eq!(truncate("Arab Spring", 20), "Arab Spring");
        assert_eq!(truncate("Arab Spring", 5), "Arab.");
    }
}
