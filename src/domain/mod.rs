//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - observations (`Observation`, `ObservationSet`)
//! - fit outputs (`ZeroOrderFit`, `FirstOrderFit`, `KineticsReport`)
//! - run configuration (`FitConfig`, `DemoConfig`) and the saved `CurveFile`

pub mod types;

pub use types::*;
