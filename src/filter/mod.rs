//! Filter/encoder: restrict the dataset to a selection and one-hot encode the events.

pub mod indicators;
pub mod selection;

pub use indicators::IndicatorMatrix;
pub use selection::{Selection, select};

use crate::domain::PriceObservation;
use crate::io::ingest::Dataset;

/// A selected subsequence and its indicator columns.
#[derive(Debug, Clone)]
pub struct FilteredSet {
    pub observations: Vec<PriceObservation>,
    pub indicators: IndicatorMatrix,
}

impl FilteredSet {
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn last_price(&self) -> Option<f64> {
        self.observations.last().map(|o| o.price)
    }
}

/// Apply `selection` to the dataset and encode the surviving rows.
pub fn filter_and_encode(dataset: &Dataset, selection: &Selection) -> FilteredSet {
    let observations = select(&dataset.observations, selection);
    let indicators = IndicatorMatrix::encode(&observations, &dataset.vocabulary);
    FilteredSet {
        observations,
        indicators,
    }
}
