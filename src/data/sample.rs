//! Synthetic Brent price/event table generation.
//!
//! The generated series follows a hand-drawn path through well-known Brent
//! price levels (interpolated in log space) with mean-reverting daily noise on
//! top. Every weekday is labeled with the historical event window it falls in,
//! or the baseline label outside all windows. The output has the same shape as
//! the real data file, so it can stand in for it in demos and tests.

use std::fs::File;
use std::path::Path;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use serde::Serialize;

use crate::domain::{BASELINE_LABEL, RawRow};
use crate::error::AppError;

/// Daily log-volatility of the noise around the anchor path.
const DAILY_VOL: f64 = 0.018;
/// AR(1) persistence of the log deviation from the anchor path.
const PERSISTENCE: f64 = 0.985;

/// A labeled historical window, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventWindow {
    pub label: &'static str,
    pub start: (i32, u32, u32),
    pub end: (i32, u32, u32),
}

/// Event windows, in chronological order and non-overlapping.
pub const EVENT_WINDOWS: &[EventWindow] = &[
    EventWindow {
        label: "Gulf War",
        start: (1990, 8, 2),
        end: (1991, 2, 28),
    },
    EventWindow {
        label: "September 11 attacks",
        start: (2001, 9, 11),
        end: (2001, 12, 31),
    },
    EventWindow {
        label: "Iraq invasion",
        start: (2003, 3, 20),
        end: (2003, 5, 1),
    },
    EventWindow {
        label: "2008 financial crisis",
        start: (2008, 9, 15),
        end: (2009, 6, 30),
    },
    EventWindow {
        label: "Arab Spring",
        start: (2010, 12, 17),
        end: (2013, 12, 31),
    },
    EventWindow {
        label: "Shale oil boom",
        start: (2014, 6, 1),
        end: (2015, 11, 30),
    },
    EventWindow {
        label: "Paris Agreement",
        start: (2015, 12, 12),
        end: (2016, 11, 4),
    },
    EventWindow {
        label: "Iran sanctions",
        start: (2018, 5, 8),
        end: (2019, 5, 2),
    },
    EventWindow {
        label: "COVID-19 pandemic",
        start: (2020, 3, 11),
        end: (2021, 6, 30),
    },
    EventWindow {
        label: "OPEC+ production cut",
        start: (2022, 10, 5),
        end: (2023, 12, 17),
    },
    EventWindow {
        label: "Red Sea attacks",
        start: (2023, 12, 18),
        end: (2024, 3, 31),
    },
];

/// Approximate Brent levels (USD/bbl) the synthetic path passes through.
const ANCHORS: &[((i32, u32, u32), f64)] = &[
    ((1987, 5, 20), 18.6),
    ((1990, 6, 1), 16.0),
    ((1990, 10, 10), 41.0),
    ((1991, 3, 1), 19.0),
    ((1998, 12, 10), 9.8),
    ((2000, 9, 1), 34.0),
    ((2001, 11, 15), 18.0),
    ((2003, 3, 10), 33.0),
    ((2003, 4, 28), 24.0),
    ((2008, 7, 3), 143.0),
    ((2008, 12, 24), 36.0),
    ((2011, 4, 8), 126.0),
    ((2014, 6, 19), 115.0),
    ((2016, 1, 20), 26.0),
    ((2018, 10, 3), 86.0),
    ((2020, 4, 21), 19.0),
    ((2022, 6, 8), 124.0),
    ((2023, 6, 12), 72.0),
    ((2023, 9, 27), 96.0),
    ((2024, 6, 28), 86.0),
];

/// Options for `generate_sample`.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub seed: u64,
}

#[derive(Debug, Serialize)]
struct SampleRecord<'a> {
    date: NaiveDate,
    price: f64,
    event: &'a str,
}

/// Label of the event window containing `date`, or the baseline label.
pub fn event_label(date: NaiveDate) -> &'static str {
    EVENT_WINDOWS
        .iter()
        .find(|w| ymd(w.start) <= date && date <= ymd(w.end))
        .map(|w| w.label)
        .unwrap_or(BASELINE_LABEL)
}

/// Generate one row per weekday in `[start, end]`.
pub fn generate_sample(config: &SampleConfig) -> Result<Vec<RawRow>, AppError> {
    if config.start > config.end {
        return Err(AppError::new(
            2,
            format!("Sample start {} is after end {}.", config.start, config.end),
        ));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, DAILY_VOL)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut rows = Vec::new();
    let mut deviation = 0.0;
    let mut date = config.start;
    while date <= config.end {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            deviation = PERSISTENCE * deviation + normal.sample(&mut rng);
            let price = (anchor_log_level(date) + deviation).exp();
            rows.push(RawRow {
                line: rows.len() + 2,
                date,
                price: (price * 100.0).round() / 100.0,
                label: event_label(date).to_string(),
            });
        }
        let Some(next) = date.checked_add_days(Days::new(1)) else {
            break;
        };
        date = next;
    }

    if rows.is_empty() {
        return Err(AppError::new(
            2,
            "Sample interval contains no weekdays; widen --start/--end.",
        ));
    }
    Ok(rows)
}

/// Write rows as `date,price,event` CSV.
pub fn write_sample_csv(path: &Path, rows: &[RawRow]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create sample CSV '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);
    for r in rows {
        writer
            .serialize(SampleRecord {
                date: r.date,
                price: r.price,
                event: &r.label,
            })
            .map_err(|e| AppError::new(2, format!("Failed to write sample CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush sample CSV: {e}")))?;

    tracing::info!(path = %path.display(), rows = rows.len(), "sample written");
    Ok(())
}

/// Log-price of the anchor path, flat outside the anchored span.
fn anchor_log_level(date: NaiveDate) -> f64 {
    let first = ANCHORS[0];
    let last = ANCHORS[ANCHORS.len() - 1];
    if date <= ymd(first.0) {
        return first.1.ln();
    }
    if date >= ymd(last.0) {
        return last.1.ln();
    }
    for w in ANCHORS.windows(2) {
        let (d0, p0) = (ymd(w[0].0), w[0].1);
        let (d1, p1) = (ymd(w[1].0), w[1].1);
        if d0 <= date && date <= d1 {
            let span = (d1 - d0).num_days().max(1) as f64;
            let u = (date - d0).num_days() as f64 / span;
            return p0.ln() + u * (p1.ln() - p0.ln());
        }
    }
    last.1.ln()
}

fn ymd((y, m, d): (i32, u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}
