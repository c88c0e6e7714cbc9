//! Design-row construction for the additive model.
//!
//! Column layout of a design row:
//!
//! ```text
//! [ 1, t, (t - s_1)+, …, (t - s_C)+, sin/cos Fourier terms…, regressors… ]
//! ```
//!
//! - `t` is time rescaled so the history spans `[0, 1]`
//! - `s_j` are the trend changepoints (same scale as `t`)
//! - Fourier terms use days since the Unix epoch, so seasonal phase does not
//!   depend on where the selected history starts

use std::f64::consts::PI;

use chrono::{Datelike, NaiveDate};

/// Length of a year in days for the yearly Fourier basis.
pub const YEAR_DAYS: f64 = 365.25;
/// Length of a week in days for the weekly Fourier basis.
pub const WEEK_DAYS: f64 = 7.0;

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// A periodic component modeled by a truncated Fourier series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seasonality {
    pub name: &'static str,
    pub period_days: f64,
    pub order: usize,
}

impl Seasonality {
    pub const YEARLY: Seasonality = Seasonality {
        name: "yearly",
        period_days: YEAR_DAYS,
        order: 10,
    };
    pub const WEEKLY: Seasonality = Seasonality {
        name: "weekly",
        period_days: WEEK_DAYS,
        order: 3,
    };

    /// Number of design columns (one sin and one cos per harmonic).
    pub fn width(&self) -> usize {
        2 * self.order
    }
}

/// Longest hole in the history that still counts as covering the year.
pub const MAX_SEASONAL_GAP_DAYS: i64 = 31;

/// Pick the seasonal components a history can support.
///
/// A year of seasonality needs two years of data with no gap longer than
/// `MAX_SEASONAL_GAP_DAYS`, so label selections spread over decades fit no
/// yearly terms. Weekly seasonality needs two weeks and sub-weekly spacing.
pub fn auto_seasonalities(dates: &[NaiveDate]) -> Vec<Seasonality> {
    let (Some(first), Some(last)) = (dates.first(), dates.last()) else {
        return Vec::new();
    };
    let span_days = (*last - *first).num_days();
    let spacings = || dates.windows(2).map(|w| (w[1] - w[0]).num_days());
    let min_spacing = spacings().min().unwrap_or(i64::MAX);
    let max_gap = spacings().max().unwrap_or(0);

    let mut out = Vec::new();
    if span_days >= 730 && max_gap <= MAX_SEASONAL_GAP_DAYS {
        out.push(Seasonality::YEARLY);
    }
    if span_days >= 14 && min_spacing < 7 {
        out.push(Seasonality::WEEKLY);
    }
    out
}

/// Maps calendar dates to the model's time axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    pub start: NaiveDate,
    pub span_days: f64,
}

impl TimeScale {
    /// `None` when the history covers a single day (nothing to scale against).
    pub fn from_history(dates: &[NaiveDate]) -> Option<Self> {
        let first = *dates.first()?;
        let last = *dates.last()?;
        let span_days = (last - first).num_days() as f64;
        (span_days > 0.0).then_some(Self {
            start: first,
            span_days,
        })
    }

    pub fn scale(&self, date: NaiveDate) -> f64 {
        (date - self.start).num_days() as f64 / self.span_days
    }
}

/// Place up to `n` changepoints uniformly over the first `range` share of the history.
///
/// Changepoints sit on observed dates (excluding the first one), so a short
/// history gets fewer of them and a two-row history gets none.
pub fn changepoints(t: &[f64], n: usize, range: f64) -> Vec<f64> {
    let hist_size = (t.len() as f64 * range.clamp(0.0, 1.0)).floor() as usize;
    let n = if n >= hist_size {
        hist_size.saturating_sub(1)
    } else {
        n
    };
    if n == 0 {
        return Vec::new();
    }

    let last_idx = (hist_size - 1) as f64;
    (1..=n)
        .map(|i| {
            let idx = (i as f64 * last_idx / n as f64).round() as usize;
            t[idx]
        })
        .collect()
}

/// Days since the Unix epoch, the phase reference for the Fourier basis.
pub fn epoch_days(date: NaiveDate) -> f64 {
    (date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE) as f64
}

/// Inverse of `epoch_days` for whole days; `None` outside chrono's range.
pub fn date_from_epoch_days(days: i64) -> Option<NaiveDate> {
    let from_ce = i32::try_from(days).ok()?.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?;
    NaiveDate::from_num_days_from_ce_opt(from_ce)
}

/// Append the Fourier terms of one seasonality for `days` (since epoch).
pub fn push_fourier(out: &mut Vec<f64>, days: f64, season: &Seasonality) {
    for k in 1..=season.order {
        let x = 2.0 * PI * k as f64 * days / season.period_days;
        out.push(x.sin());
        out.push(x.cos());
    }
}

/// Column bookkeeping for a design matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignLayout {
    pub n_changepoints: usize,
    pub seasonal_width: usize,
    pub n_regressors: usize,
}

impl DesignLayout {
    pub const TREND_BASE: usize = 2;

    pub fn width(&self) -> usize {
        Self::TREND_BASE + self.n_changepoints + self.seasonal_width + self.n_regressors
    }

    pub fn changepoint_cols(&self) -> std::ops::Range<usize> {
        Self::TREND_BASE..Self::TREND_BASE + self.n_changepoints
    }

    pub fn seasonal_cols(&self) -> std::ops::Range<usize> {
        let start = self.changepoint_cols().end;
        start..start + self.seasonal_width
    }

    pub fn regressor_cols(&self) -> std::ops::Range<usize> {
        let start = self.seasonal_cols().end;
        start..start + self.n_regressors
    }
}

/// Fill a full design row.
///
/// `regressors` must have exactly `layout.n_regressors` entries.
pub fn fill_design_row(
    out: &mut Vec<f64>,
    t: f64,
    date: NaiveDate,
    changepoints: &[f64],
    seasonalities: &[Seasonality],
    regressors: &[f64],
) {
    out.clear();
    out.push(1.0);
    out.push(t);
    for &s in changepoints {
        out.push((t - s).max(0.0));
    }
    let days = epoch_days(date);
    for season in seasonalities {
        push_fourier(out, days, season);
    }
    out.extend_from_slice(regressors);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn daily(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
        (0..n as u64)
            .map(|i| start + chrono::Days::new(i))
            .collect()
    }

    #[test]
    fn two_rows_get_no_changepoints() {
        assert!(changepoints(&[0.0, 1.0], 25, 0.8).is_empty());
    }

    #[test]
    fn changepoints_stay_in_the_leading_range() {
        let t: Vec<f64> = (0..101).map(|i| i as f64 / 100.0).collect();
        let cps = changepoints(&t, 25, 0.8);
        assert_eq!(cps.len(), 25);
        assert!(cps.iter().all(|&s| s > 0.0 && s < 0.81));
        assert!(cps.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn seasonalities_follow_history_length() {
        assert!(auto_seasonalities(&daily(ymd(2024, 1, 1), 3)).is_empty());
        assert_eq!(
            auto_seasonalities(&daily(ymd(2024, 1, 1), 30)),
            vec![Seasonality::WEEKLY]
        );
        assert_eq!(
            auto_seasonalities(&daily(ymd(2020, 1, 1), 800)),
            vec![Seasonality::YEARLY, Seasonality::WEEKLY]
        );
    }

    #[test]
    fn gappy_history_gets_no_yearly_terms() {
        let mut dates = daily(ymd(1990, 8, 2), 200);
        dates.extend(daily(ymd(2020, 3, 11), 300));
        assert_eq!(auto_seasonalities(&dates), vec![Seasonality::WEEKLY]);

        // Weekday-only data still covers the year.
        let weekdays: Vec<NaiveDate> = daily(ymd(2018, 1, 1), 900)
            .into_iter()
            .filter(|d| d.weekday().number_from_monday() <= 5)
            .collect();
        assert_eq!(
            auto_seasonalities(&weekdays),
            vec![Seasonality::YEARLY, Seasonality::WEEKLY]
        );
    }

    #[test]
    fn huge_changepoint_count_is_capped_by_the_history() {
        let t: Vec<f64> = (0..11).map(|i| i as f64 / 10.0).collect();
        assert_eq!(changepoints(&t, usize::MAX, 0.8).len(), 7);
    }

    #[test]
    fn design_row_matches_layout() {
        let layout = DesignLayout {
            n_changepoints: 2,
            seasonal_width: Seasonality::WEEKLY.width(),
            n_regressors: 3,
        };
        let mut row = Vec::new();
        fill_design_row(
            &mut row,
            0.5,
            ymd(2024, 1, 1),
            &[0.25, 0.75],
            &[Seasonality::WEEKLY],
            &[0.0, 1.0, 0.0],
        );
        assert_eq!(row.len(), layout.width());
        assert_eq!(row[0], 1.0);
        assert_eq!(row[1], 0.5);
        assert_eq!(&row[layout.changepoint_cols()], &[0.25, 0.0]);
        assert_eq!(&row[layout.regressor_cols()], &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn epoch_days_counts_from_1970() {
        assert_eq!(epoch_days(ymd(1970, 1, 1)), 0.0);
        assert_eq!(epoch_days(ymd(1970, 1, 8)), 7.0);
        assert_eq!(date_from_epoch_days(epoch_days(ymd(2024, 2, 29)) as i64), Some(ymd(2024, 2, 29)));
        assert_eq!(date_from_epoch_days(i64::MAX), None);
    }

    #[test]
    fn time_scale_maps_history_to_unit_interval() {
        let dates = daily(ymd(2024, 1, 1), 11);
        let scale = TimeScale::from_history(&dates).unwrap();
        assert_eq!(scale.scale(dates[0]), 0.0);
        assert_eq!(scale.scale(dates[10]), 1.0);
        assert_eq!(scale.scale(ymd(2024, 1, 21)), 2.0);
        assert!(TimeScale::from_history(&dates[..1]).is_none());
    }
}
