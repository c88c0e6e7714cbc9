//! Row selection by event label or by date interval.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::domain::{EventId, PriceObservation};

/// Which rows of the dataset a view works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Exploration: rows whose event is in the set.
    Labels(BTreeSet<EventId>),
    /// Forecasting: rows dated within `[start, end]`, both inclusive.
    DateRange { start: NaiveDate, end: NaiveDate },
}

impl Selection {
    pub fn matches(&self, obs: &PriceObservation) -> bool {
        match self {
            Selection::Labels(ids) => ids.contains(&obs.event),
            Selection::DateRange { start, end } => *start <= obs.date && obs.date <= *end,
        }
    }

    /// `true` when no row can possibly match (empty label set or inverted range).
    pub fn is_trivially_empty(&self) -> bool {
        match self {
            Selection::Labels(ids) => ids.is_empty(),
            Selection::DateRange { start, end } => start > end,
        }
    }
}

/// Keep the rows matched by `selection`, preserving date order.
pub fn select(observations: &[PriceObservation], selection: &Selection) -> Vec<PriceObservation> {
    if selection.is_trivially_empty() {
        return Vec::new();
    }
    match selection {
        // Rows are date-sorted, so a range is a contiguous slice.
        Selection::DateRange { start, end } => {
            let lo = observations.partition_point(|o| o.date < *start);
            let hi = observations.partition_point(|o| o.date <= *end);
            observations[lo..hi.max(lo)].to_vec()
        }
        Selection::Labels(_) => observations
            .iter()
            .filter(|o| selection.matches(o))
            .copied()
            .collect(),
    }
}
