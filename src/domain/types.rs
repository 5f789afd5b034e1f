//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::KineticsError;

/// Total amount on the quantity axis (percent dissolved).
pub const DEFAULT_SCALE: f64 = 100.0;

/// Number of time/quantity rows on the entry form.
pub const ENTRY_ROWS: usize = 12;

/// A single dissolution measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Minutes since the start of the test.
    pub time: f64,
    /// Amount dissolved, on the same scale as `FitOptions::scale`.
    pub quantity: f64,
}

/// Parallel time/quantity columns in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationSet {
    times: Vec<f64>,
    quantities: Vec<f64>,
}

impl ObservationSet {
    /// Build from parallel columns. Empty columns are allowed here; the fitter
    /// rejects them.
    pub fn new(times: Vec<f64>, quantities: Vec<f64>) -> Result<Self, KineticsError> {
        if times.len() != quantities.len() {
            return Err(KineticsError::LengthMismatch {
                times: times.len(),
                quantities: quantities.len(),
            });
        }
        Ok(Self { times, quantities })
    }

    pub fn from_observations(points: &[Observation]) -> Self {
        Self {
            times: points.iter().map(|p| p.time).collect(),
            quantities: points.iter().map(|p| p.quantity).collect(),
        }
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn quantities(&self) -> &[f64] {
        &self.quantities
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Observation> + '_ {
        self.times
            .iter()
            .zip(&self.quantities)
            .map(|(&time, &quantity)| Observation { time, quantity })
    }

    /// `(min, max)` of the time column, if any finite values exist.
    pub fn time_range(&self) -> Option<(f64, f64)> {
        finite_range(&self.times)
    }

    /// `(min, max)` of the quantity column, if any finite values exist.
    pub fn quantity_range(&self) -> Option<(f64, f64)> {
        finite_range(&self.quantities)
    }
}

fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values.iter().filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    (min <= max).then_some((min, max))
}

/// Which kinetic model a fit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    ZeroOrder,
    FirstOrder,
}

impl ModelKind {
    /// Human-readable label for legends and terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::ZeroOrder => "Zero-Order Kinetics",
            ModelKind::FirstOrder => "First-Order Kinetics",
        }
    }

    /// Number of free parameters.
    pub fn param_count(self) -> usize {
        match self {
            ModelKind::ZeroOrder => 1,
            ModelKind::FirstOrder => 2,
        }
    }
}

/// Zero-order fit: `quantity = k · time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZeroOrderFit {
    pub k: f64,
    /// `k · t` at each input time, in input order.
    pub predicted: Vec<f64>,
    pub r2: f64,
    pub sse: f64,
    pub iterations: usize,
}

/// First-order fit: `ln(scale - quantity) = ln(A0) - k · time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirstOrderFit {
    pub k: f64,
    pub a0: f64,
    /// `ln(scale - quantity)` for each observation.
    pub log_observed: Vec<f64>,
    /// `ln(A0) - k · t` at each input time.
    pub log_predicted: Vec<f64>,
    /// `scale - exp(ln(A0) - k · t)`: the curve in quantity units.
    pub predicted: Vec<f64>,
    /// R² of the log-space fit (not of `predicted` against the quantities).
    pub r2: f64,
    /// SSE in log space.
    pub sse: f64,
    pub iterations: usize,
}

/// Both fits for one observation set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KineticsReport {
    pub observations: ObservationSet,
    pub scale: f64,
    pub zero_order: ZeroOrderFit,
    pub first_order: FirstOrderFit,
}

/// A full run’s configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub csv_path: Option<PathBuf>,
    pub points: Vec<Observation>,

    pub scale: f64,
    pub max_iterations: usize,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_results: Option<PathBuf>,
    pub export_curve: Option<PathBuf>,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            csv_path: None,
            points: Vec::new(),
            scale: DEFAULT_SCALE,
            max_iterations: crate::math::SolverOptions::default().max_iterations,
            plot: true,
            plot_width: 100,
            plot_height: 25,
            export_results: None,
            export_curve: None,
        }
    }
}

/// Settings for the synthetic demo profile.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub count: usize,
    /// Minutes between samples.
    pub interval: f64,
    /// True first-order rate constant (1/min).
    pub rate: f64,
    /// Standard deviation of the additive Gaussian noise.
    pub noise: f64,
    pub seed: u64,
    pub scale: f64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            count: ENTRY_ROWS,
            interval: 5.0,
            rate: 0.05,
            noise: 1.0,
            seed: 42,
            scale: DEFAULT_SCALE,
        }
    }
}

/// A saved curve file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub scale: f64,
    pub observations: Vec<Observation>,
    pub zero_order: ZeroOrderParams,
    pub first_order: FirstOrderParams,
    pub grid: CurveGrid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZeroOrderParams {
    pub k: f64,
    pub r2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirstOrderParams {
    pub k: f64,
    pub a0: f64,
    pub r2: f64,
}

/// Both curves evaluated on a dense time grid (quantity units).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveGrid {
    pub time_min: Vec<f64>,
    pub zero_order: Vec<f64>,
    pub first_order: Vec<f64>,
}
