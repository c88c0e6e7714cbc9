//! Plotters-powered price chart widget for Ratatui.
//!
//! One widget draws the event-colored history and the forecast line with its
//! band. Plotters output goes into the Ratatui buffer through
//! `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Scatter points drawn in one color (one event label, or all observations).
#[derive(Debug, Clone)]
pub struct PointSeries {
    pub points: Vec<(f64, f64)>,
    pub color: (u8, u8, u8),
}

/// A render-only chart description; series and bounds are computed by the caller.
///
/// X values are days since the Unix epoch.
pub struct PricePlottersChart<'a> {
    /// Observed prices, one series per color.
    pub points: &'a [PointSeries],
    /// Forecast point predictions.
    pub line: &'a [(f64, f64)],
    /// Forecast interval as `(x, lower, upper)`.
    pub band: &'a [(f64, f64, f64)],
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    /// Axis labels (kept simple for terminal rendering).
    pub x_label: &'a str,
    pub y_label: &'a str,
    /// Formatting of tick labels.
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl Widget for PricePlottersChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let x0 = self.x_bounds[0];
        let x1 = self.x_bounds[1];
        let y0 = self.y_bounds[0];
        let y1 = self.y_bounds[1];

        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 7)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let band_color = RGBColor(90, 90, 160);
            let line_color = RGBColor(0, 255, 255); // cyan

            // 1) Interval bounds, dim, under everything else.
            if !self.band.is_empty() {
                chart.draw_series(LineSeries::new(
                    self.band.iter().map(|&(x, lo, _)| (x, lo)),
                    &band_color,
                ))?;
                chart.draw_series(LineSeries::new(
                    self.band.iter().map(|&(x, _, hi)| (x, hi)),
                    &band_color,
                ))?;
            }

            // 2) Observations. `Pixel` rather than `Circle`: the backend maps
            // circle radii to canvas units incorrectly and draws huge circles.
            for series in self.points {
                let (r, g, b) = series.color;
                let color = RGBColor(r, g, b);
                chart.draw_series(series.points.iter().map(|&(x, y)| Pixel::new((x, y), color)))?;
            }

            // 3) Point forecast on top.
            if !self.line.is_empty() {
                chart.draw_series(LineSeries::new(self.line.iter().copied(), &line_color))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
