//! Read/write curve JSON files.
//!
//! Curve JSON is the "portable" representation of a fit:
//! - both parameter sets and R² values
//! - the observations that were fitted
//! - a precomputed grid of both curves (quantity units) for quick plotting
//!
//! The schema is defined by `domain::CurveFile`.

use std::fs::File;
use std::path::Path;

use chrono::Utc;

use crate::domain::{CurveFile, CurveGrid, FirstOrderParams, KineticsReport, ModelKind, ZeroOrderParams};
use crate::error::{AppError, EXIT_USAGE};
use crate::models::predict_quantity;

/// Number of grid points written to curve files.
pub const GRID_POINTS: usize = 101;

/// Build the curve file for a fitted report.
pub fn curve_file(report: &KineticsReport) -> CurveFile {
    let t_max = report
        .observations
        .time_range()
        .map(|(_, max)| max)
        .filter(|max| *max > 0.0)
        .unwrap_or(1.0);

    CurveFile {
        tool: "dissolve".to_string(),
        generated_at: Utc::now(),
        scale: report.scale,
        observations: report.observations.iter().collect(),
        zero_order: ZeroOrderParams {
            k: report.zero_order.k,
            r2: report.zero_order.r2,
        },
        first_order: FirstOrderParams {
            k: report.first_order.k,
            a0: report.first_order.a0,
            r2: report.first_order.r2,
        },
        grid: build_grid(report, 0.0, t_max, GRID_POINTS),
    }
}

/// Write a curve JSON file.
pub fn write_curve_json(path: &Path, report: &KineticsReport) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(EXIT_USAGE, format!("Failed to create curve JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &curve_file(report))
        .map_err(|e| AppError::new(EXIT_USAGE, format!("Failed to write curve JSON: {e}")))?;

    Ok(())
}

/// Read a curve JSON file.
pub fn read_curve_json(path: &Path) -> Result<CurveFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(EXIT_USAGE, format!("Failed to open curve JSON '{}': {e}", path.display())))?;
    let curve: CurveFile = serde_json::from_reader(file)
        .map_err(|e| AppError::new(EXIT_USAGE, format!("Invalid curve JSON: {e}")))?;
    Ok(curve)
}

fn build_grid(report: &KineticsReport, t0: f64, t1: f64, n: usize) -> CurveGrid {
    let n = n.max(2);
    let zero = [report.zero_order.k];
    let first = [report.first_order.k, report.first_order.a0];

    let mut time_min = Vec::with_capacity(n);
    let mut zero_order = Vec::with_capacity(n);
    let mut first_order = Vec::with_capacity(n);

    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let t = t0 + u * (t1 - t0);
        time_min.push(t);
        zero_order.push(predict_quantity(ModelKind::ZeroOrder, t, &zero, report.scale));
        first_order.push(predict_quantity(ModelKind::FirstOrder, t, &first, report.scale));
    }

    CurveGrid {
        time_min,
        zero_order,
        first_order,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ObservationSet;
    use crate::fit::{FitOptions, fit_kinetics};

    #[test]
    fn curve_json_round_trips_parameters() {
        let set = ObservationSet::new(vec![0.0, 10.0, 20.0, 40.0], vec![0.0, 28.0, 47.0, 72.0]).unwrap();
        let report = fit_kinetics(&set, &FitOptions::default()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curve.json");
        write_curve_json(&path, &report).unwrap();
        let curve = read_curve_json(&path).unwrap();

        assert_eq!(curve.zero_order.k, report.zero_order.k);
        assert_eq!(curve.first_order.a0, report.first_order.a0);
        assert_eq!(curve.observations.len(), 4);
        assert_eq!(curve.grid.time_min.len(), GRID_POINTS);
        assert_eq!(curve.grid.time_min[0], 0.0);
        assert!((curve.grid.time_min[GRID_POINTS - 1] - 40.0).abs() < 1e-12);
    }
}
