//! Curve fitting orchestration.
//!
//! Responsibilities:
//!
//! - build the least-squares problem for each kinetic model
//! - run Levenberg–Marquardt from the fixed initial guesses
//! - assemble fitted curves and R² into a `KineticsReport`

pub mod fitter;

pub use fitter::*;
