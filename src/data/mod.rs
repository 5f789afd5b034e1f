//! Demo data sources.

pub mod sample;

pub use sample::*;
