//! Terminal plots for the CLI (`--plot`).

pub mod ascii;

pub use ascii::*;
