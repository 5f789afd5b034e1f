//! Export per-observation results to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{KineticsReport, ObservationSet};
use crate::error::{AppError, EXIT_USAGE};

/// Write per-observation results to a CSV file.
pub fn write_results_csv(path: &Path, report: &KineticsReport) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(EXIT_USAGE, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_results(file, report)
        .map_err(|e| AppError::new(EXIT_USAGE, format!("Failed to write export CSV '{}': {e}", path.display())))
}

/// Write per-observation results to any writer.
pub fn write_results<W: Write>(writer: W, report: &KineticsReport) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record([
        "time_min",
        "quantity",
        "zero_order_fit",
        "ln_remaining_obs",
        "ln_remaining_fit",
        "first_order_fit",
    ])?;

    let zero = &report.zero_order;
    let first = &report.first_order;
    for (i, obs) in report.observations.iter().enumerate() {
        out.write_record([
            format!("{:.6}", obs.time),
            format!("{:.6}", obs.quantity),
            format!("{:.6}", zero.predicted[i]),
            format!("{:.10}", first.log_observed[i]),
            format!("{:.10}", first.log_predicted[i]),
            format!("{:.6}", first.predicted[i]),
        ])?;
    }
    out.flush()?;
    Ok(())
}

/// Write observations as a `time,quantity` CSV (the ingest format).
pub fn write_observations<W: Write>(writer: W, observations: &ObservationSet) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(["time", "quantity"])?;
    for obs in observations.iter() {
        out.write_record([format!("{}", obs.time), format!("{:.4}", obs.quantity)])?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ObservationSet;
    use crate::fit::{FitOptions, fit_kinetics};

    #[test]
    fn results_csv_has_one_row_per_observation() {
        let set = ObservationSet::new(vec![0.0, 10.0, 20.0, 30.0], vec![0.0, 30.0, 50.0, 65.0]).unwrap();
        let report = fit_kinetics(&set, &FitOptions::default()).unwrap();

        let mut buf = Vec::new();
        write_results(&mut buf, &report).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("time_min,quantity,zero_order_fit"));
        assert!(lines[2].starts_with("10.000000,30.000000,"));
    }

    #[test]
    fn observations_csv_reads_back() {
        let set = ObservationSet::new(vec![0.0, 5.0, 10.0], vec![0.0, 21.25, 38.5]).unwrap();
        let mut buf = Vec::new();
        write_observations(&mut buf, &set).unwrap();

        let ingest = crate::io::ingest::read_observations_csv(buf.as_slice()).unwrap();
        assert_eq!(ingest.observations, set);
    }
}
