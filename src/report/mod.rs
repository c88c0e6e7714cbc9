//! Reporting utilities: forecast metrics, per-event summaries, and formatted terminal output.

pub mod format;
pub mod narrative;

pub use format::*;

use chrono::NaiveDate;

use crate::domain::{EventId, EventVocabulary, Forecast, PriceObservation};

/// The three numbers shown under every forecast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSummary {
    /// Last observed price of the selected rows.
    pub last_price: f64,
    /// Point prediction of the final forecast row.
    pub predicted_price: f64,
    /// `(predicted - last) / last * 100`, or `None` when `last_price` is 0.
    pub percent_change: Option<f64>,
}

impl MetricSummary {
    /// `None` when the forecast has no rows.
    pub fn compute(last_price: f64, forecast: &Forecast) -> Option<Self> {
        let predicted_price = forecast.last()?.predicted_price;
        let percent_change = (last_price != 0.0)
            .then(|| (predicted_price - last_price) / last_price * 100.0);
        Some(Self {
            last_price,
            predicted_price,
            percent_change,
        })
    }
}

/// Price statistics of one event label within a selection.
#[derive(Debug, Clone, PartialEq)]
pub struct EventSummary {
    pub event: EventId,
    pub label: String,
    pub n_rows: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub mean_price: f64,
    pub min_price: f64,
    pub max_price: f64,
}

/// Per-event statistics, in vocabulary order. Labels with no rows are omitted.
pub fn summarize_events(observations: &[PriceObservation], vocabulary: &EventVocabulary) -> Vec<EventSummary> {
    let mut out: Vec<EventSummary> = Vec::new();
    for id in vocabulary.ids() {
        let mut rows = observations.iter().filter(|o| o.event == id);
        let Some(first) = rows.next() else {
            continue;
        };
        let mut summary = EventSummary {
            event: id,
            label: vocabulary.label(id).to_string(),
            n_rows: 1,
            first_date: first.date,
            last_date: first.date,
            mean_price: first.price,
            min_price: first.price,
            max_price: first.price,
        };
        for o in rows {
            summary.n_rows += 1;
            summary.first_date = summary.first_date.min(o.date);
            summary.last_date = summary.last_date.max(o.date);
            summary.mean_price += o.price;
            summary.min_price = summary.min_price.min(o.price);
            summary.max_price = summary.max_price.max(o.price);
        }
        summary.mean_price /= summary.n_rows as f64;
        out.push(summary);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ForecastRow, ModelSummary};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn forecast_ending_at(price: f64) -> Forecast {
        Forecast {
            rows: vec![ForecastRow {
                date: ymd(2024, 1, 2),
                predicted_price: price,
                lower_bound: price - 1.0,
                upper_bound: price + 1.0,
                is_future: true,
            }],
            horizon: 1,
            backend: "additive",
            model: ModelSummary::default(),
        }
    }

    #[test]
    fn flat_forecast_has_zero_percent_change() {
        let m = MetricSummary::compute(80.0, &forecast_ending_at(80.0)).unwrap();
        assert_eq!(m.percent_change, Some(0.0));
    }

    #[test]
    fn percent_change_is_relative_to_last_price() {
        let m = MetricSummary::compute(80.0, &forecast_ending_at(81.23)).unwrap();
        assert_eq!(m.last_price, 80.0);
        assert_eq!(m.predicted_price, 81.23);
        assert!((m.percent_change.unwrap() - 1.5375).abs() < 1e-9);
    }

    #[test]
    fn zero_last_price_has_no_percent_change() {
        let m = MetricSummary::compute(0.0, &forecast_ending_at(5.0)).unwrap();
        assert_eq!(m.percent_change, None);
    }

    #[test]
    fn empty_forecast_has_no_metrics() {
        let empty = Forecast {
            rows: Vec::new(),
            ..forecast_ending_at(1.0)
        };
        assert!(MetricSummary::compute(80.0, &empty).is_none());
    }

    #[test]
    fn event_summaries_follow_vocabulary_order() {
        let mut vocab = EventVocabulary::default();
        let a = vocab.intern("A");
        let b = vocab.intern("B");
        let unused = vocab.intern("C");
        let obs = [
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

        let summaries = summarize_events(&obs, &vocab);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].label, "A");
        assert_eq!(summaries[0].n_rows, 2);
        assert_eq!(summaries[0].mean_price, 81.0);
        assert_eq!(summaries[0].last_date, ymd(2024, 1, 2));
        assert_eq!(summaries[1].event, b);
        assert!(summaries.iter().all(|s| s.event != unused));
    }
}
