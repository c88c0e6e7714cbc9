//! Synthetic data for demos and tests.

pub mod sample;

pub use sample::{EVENT_WINDOWS, EventWindow, SampleConfig, event_label, generate_sample, write_sample_csv};
