//! `brent-events` library crate.
//!
//! The binary (`brent`) is a thin wrapper around this library so that:
//!
//! - the filter → encode → forecast pipeline is testable without a terminal
//! - the CLI and the TUI share one implementation of each view
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod filter;
pub mod forecast;
pub mod io;
pub mod logging;
pub mod math;
pub mod plot;
pub mod report;
pub mod session;
pub mod tui;
