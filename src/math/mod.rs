//! Numerical building blocks: SVD least squares, Levenberg–Marquardt, R².

pub mod lm;
pub mod ols;
pub mod stats;

pub use lm::*;
pub use ols::*;
pub use stats::*;
