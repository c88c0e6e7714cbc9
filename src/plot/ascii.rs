//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - history points: one letter per event label (`a`, `b`, ...) or `o`
//! - forecast: `-` line
//! - uncertainty band: `:`

use chrono::NaiveDate;

use crate::domain::{EventVocabulary, Forecast, PriceObservation};
use crate::report::fmt_price;

const BAND: char = ':';
const LINE: char = '-';
const POINT: char = 'o';

/// Glyph for the event with vocabulary index `idx`.
pub fn event_glyph(idx: usize) -> char {
    const GLYPHS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
    GLYPHS.get(idx).map(|&b| b as char).unwrap_or('*')
}

/// Render the price history with each point marked by its event, plus a legend.
pub fn render_history_plot(
    observations: &[PriceObservation],
    vocabulary: &EventVocabulary,
    width: usize,
    height: usize,
) -> String {
    let Some(start) = observations.first().map(|o| o.date) else {
        return "Plot: (no data)\n".to_string();
    };
    let markers: Vec<(f64, f64, char)> = observations
        .iter()
        .map(|o| (day_offset(start, o.date), o.price, event_glyph(o.event.0)))
        .collect();

    let mut out = render_plot(
        &Layers {
            start,
            markers: &markers,
            line: &[],
            band: &[],
        },
        width,
        height,
    );

    let mut seen: Vec<_> = observations.iter().map(|o| o.event).collect();
    seen.sort();
    seen.dedup();
    for id in seen {
        out.push_str(&format!("{} = {}\n", event_glyph(id.0), vocabulary.label(id)));
    }
    out
}

/// Render observed prices (`o`), the forecast line and its band.
pub fn render_forecast_plot(
    observations: &[PriceObservation],
    forecast: &Forecast,
    width: usize,
    height: usize,
) -> String {
    let start = observations
        .first()
        .map(|o| o.date)
        .into_iter()
        .chain(forecast.rows.first().map(|r| r.date))
        .min();
    let Some(start) = start else {
        return "Plot: (no data)\n".to_string();
    };

    let markers: Vec<(f64, f64, char)> = observations
        .iter()
        .map(|o| (day_offset(start, o.date), o.price, POINT))
        .collect();
    let line: Vec<(f64, f64)> = forecast
        .rows
        .iter()
        .map(|r| (day_offset(start, r.date), r.predicted_price))
        .collect();
    let band: Vec<(f64, f64, f64)> = forecast
        .rows
        .iter()
        .map(|r| (day_offset(start, r.date), r.lower_bound, r.upper_bound))
        .collect();

    render_plot(
        &Layers {
            start,
            markers: &markers,
            line: &line,
            band: &band,
        },
        width,
        height,
    )
}

struct Layers<'a> {
    start: NaiveDate,
    markers: &'a [(f64, f64, char)],
    line: &'a [(f64, f64)],
    band: &'a [(f64, f64, f64)],
}

fn render_plot(layers: &Layers<'_>, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = x_range(layers).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = y_range(layers).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Band first, then the line, then points on top.
    for &(x, lo, hi) in layers.band {
        let col = map_x(x, x_min, x_max, width);
        let top = map_y(hi, y_min, y_max, height);
        let bottom = map_y(lo, y_min, y_max, height);
        for row in grid.iter_mut().take(bottom + 1).skip(top) {
            row[col] = BAND;
        }
    }

    draw_curve(&mut grid, layers.line, x_min, x_max, y_min, y_max);

    for &(x, y, ch) in layers.markers {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = ch;
    }

    // Build final string. We include a small header with ranges.
    let end = layers
        .start
        .checked_add_days(chrono::Days::new(x_max.max(0.0) as u64))
        .unwrap_or(layers.start);
    let mut out = String::new();
    out.push_str(&format!(
        "Plot: date=[{}, {end}] | price=[{}, {}]\n",
        layers.start,
        fmt_price(y_min),
        fmt_price(y_max),
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn day_offset(start: NaiveDate, date: NaiveDate) -> f64 {
    (date - start).num_days() as f64
}

fn x_range(layers: &Layers<'_>) -> Option<(f64, f64)> {
    let xs = layers
        .markers
        .iter()
        .map(|m| m.0)
        .chain(layers.line.iter().map(|l| l.0))
        .chain(layers.band.iter().map(|b| b.0));
    finite_range(xs)
}

fn y_range(layers: &Layers<'_>) -> Option<(f64, f64)> {
    let ys = layers
        .markers
        .iter()
        .map(|m| m.1)
        .chain(layers.line.iter().map(|l| l.1))
        .chain(layers.band.iter().flat_map(|b| [b.1, b.2]));
    finite_range(ys)
}

fn finite_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values.filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max.is_finite() && max > min {
        Some((min, max))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    if curve.is_empty() {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, LINE);
        } else {
            grid[row][col] = LINE;
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish). Overwrites blanks and band cells only.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0 && (y0 as usize) < grid.len() && x0 >= 0 && (x0 as usize) < grid[0].len() {
            let cell = &mut grid[y0 as usize][x0 as usize];
            if *cell == ' ' || *cell == BAND {
                *cell = ch;
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ForecastRow, ModelSummary};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn three_rows() -> (Vec<PriceObservation>, EventVocabulary) {
        let mut vocab = EventVocabulary::default();
        let a = vocab.intern("A");
        let b = vocab.intern("B");
        let obs = vec![
            PriceObservation {
                date: ymd(2024, 1, 1),
                price: 80.0,
                event: a,
            },
            PriceObservation {
                date: ymd(2024, 1, 2),
                price: 82.0,
                event: a,
            },
            PriceObservation {
                date: ymd(2024, 1, 3),
                price: 81.0,
                event: b,
            },
        ];
        (obs, vocab)
    }

    #[test]
    fn history_plot_golden_snapshot_small() {
        let (obs, vocab) = three_rows();
        let txt = render_history_plot(&obs, &vocab, 10, 5);
        let expected = concat!(
            "Plot: date=[2024-01-01, 2024-01-03] | price=[$79.90, $82.10]\n",
            "     a    \n",
            "          \n",
            "         b\n",
            "          \n",
            "a         \n",
            "a = A\n",
            "b = B\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn forecast_plot_shows_points_line_and_band() {
        let (obs, _) = three_rows();
        let rows = (0..10u64)
            .map(|i| ForecastRow {
                date: ymd(2024, 1, 1) + chrono::Days::new(i),
                predicted_price: 81.0,
                lower_bound: 81.0 - 0.2 * i as f64,
                upper_bound: 81.0 + 0.2 * i as f64,
                is_future: i >= 3,
            })
            .collect();
        let forecast = Forecast {
            rows,
            horizon: 7,
            backend: "additive",
            model: ModelSummary::default(),
        };

        let txt = render_forecast_plot(&obs, &forecast, 40, 12);
        assert!(txt.starts_with("Plot: date=[2024-01-01, 2024-01-10]"));
        assert!(txt.contains(POINT));
        assert!(txt.contains(LINE));
        assert!(txt.contains(BAND));
        // header + grid rows
        assert_eq!(txt.lines().count(), 13);
    }

    #[test]
    fn empty_history_renders_placeholder() {
        let vocab = EventVocabulary::default();
        assert_eq!(render_history_plot(&[], &vocab, 10, 5), "Plot: (no data)\n");
    }

    #[test]
    fn glyphs_run_out_gracefully() {
        assert_eq!(event_glyph(0), 'a');
        assert_eq!(event_glyph(25), 'z');
        assert_eq!(event_glyph(26), '*');
    }
}
