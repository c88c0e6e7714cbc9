//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input rows and the session vocabulary (`PriceObservation`, `EventVocabulary`)
//! - forecast outputs (`ForecastRow`, `Forecast`)
//! - configuration (`DashboardConfig`, `ModelSettings`) and the view set (`View`)

pub mod types;

pub use types::*;
