//! One-hot encoding of the event label.
//!
//! Each label maps to a fixed slot of the session vocabulary. The matrix keeps
//! only the slots that occur in the encoded rows, in vocabulary order, so a
//! selection of a single label yields a single column.

use nalgebra::DMatrix;

use crate::domain::{EventVocabulary, PriceObservation};

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorMatrix {
    names: Vec<String>,
    values: DMatrix<f64>,
}

impl IndicatorMatrix {
    pub fn encode(observations: &[PriceObservation], vocabulary: &EventVocabulary) -> Self {
        let mut present = vec![false; vocabulary.len()];
        for o in observations {
            if let Some(slot) = present.get_mut(o.event.0) {
                *slot = true;
            }
        }

        // Vocabulary slot -> matrix column.
        let mut slot_to_col = vec![None; vocabulary.len()];
        let mut columns = Vec::new();
        for id in vocabulary.ids() {
            if present[id.0] {
                slot_to_col[id.0] = Some(columns.len());
                columns.push(id);
            }
        }

        let mut values = DMatrix::zeros(observations.len(), columns.len());
        for (row, o) in observations.iter().enumerate() {
            if let Some(Some(col)) = slot_to_col.get(o.event.0) {
                values[(row, *col)] = 1.0;
            }
        }

        let names = columns.iter().map(|&id| vocabulary.label(id).to_string()).collect();

        Self { names, values }
    }

    /// Column names, used as regressor names by the forecaster.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn n_cols(&self) -> usize {
        self.values.ncols()
    }

    pub fn values(&self) -> &DMatrix<f64> {
        &self.values
    }
}
