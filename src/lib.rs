//! `dissolution-kinetics` library crate.
//!
//! Fits zero-order and first-order kinetics to dissolution test data.
//! The binary (`dissolve`) is a thin wrapper around this library so that:
//!
//! - the fitter is a pure function testable without a terminal
//! - the CLI and the TUI share one pipeline
//! - presentation (labels, plots, exports) stays out of the math

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod tui;
