//! Shared "fit pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! observations (CSV / --point / entry form) -> both fits -> report
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use log::warn;

use crate::domain::{FitConfig, KineticsReport, ObservationSet};
use crate::error::{AppError, KineticsError};
use crate::fit::{FitOptions, fit_kinetics};
use crate::io::ingest::{IngestedData, load_observations_csv};
use crate::math::SolverOptions;

/// All computed outputs of a single `dissolve fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// CSV bookkeeping, when observations came from a file.
    pub ingest: Option<IngestedData>,
    pub report: KineticsReport,
}

/// Solver/model options for a run.
pub fn fit_options(config: &FitConfig) -> FitOptions {
    FitOptions {
        scale: config.scale,
        solver: SolverOptions {
            max_iterations: config.max_iterations,
            ..SolverOptions::default()
        },
    }
}

/// Gather observations from the CSV file (if any) followed by `--point` flags.
pub fn collect_observations(config: &FitConfig) -> Result<(ObservationSet, Option<IngestedData>), AppError> {
    let ingest = config.csv_path.as_deref().map(load_observations_csv).transpose()?;

    let mut points: Vec<_> = ingest
        .as_ref()
        .map(|i| i.observations.iter().collect())
        .unwrap_or_default();
    points.extend(config.points.iter().copied());

    Ok((ObservationSet::from_observations(&points), ingest))
}

/// Execute the full fitting pipeline and return the computed outputs.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, AppError> {
    let (observations, ingest) = collect_observations(config)?;
    let report = run_fit_with_observations(&observations, &fit_options(config))?;
    Ok(RunOutput { ingest, report })
}

/// Fit already-parsed observations.
///
/// This is what the TUI calls on every fit action.
pub fn run_fit_with_observations(
    observations: &ObservationSet,
    opts: &FitOptions,
) -> Result<KineticsReport, KineticsError> {
    if observations.is_empty() {
        warn!("no complete time/quantity pairs; fit skipped");
        return Err(KineticsError::EmptyInput);
    }
    fit_kinetics(observations, opts)
}
