//! Observation ingest and normalization.
//!
//! Three sources feed the same `ObservationSet`:
//! - the entry form (pairs of raw text, blank pairs skipped)
//! - a CSV file with `time` / `quantity` columns
//! - repeated `--point T,Q` flags on the command line
//!
//! Design goals:
//! - **Numeric parsing only**: no range checks here, the fitter owns those
//! - **Row-addressed errors**: every parse failure names its row and field
//! - **Separation of concerns**: no fitting logic here

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;
use log::{debug, warn};

use crate::domain::{Observation, ObservationSet};
use crate::error::{AppError, EXIT_USAGE, Field, KineticsError};

const TIME_HEADERS: &[&str] = &["time", "t", "time_min"];
const QUANTITY_HEADERS: &[&str] = &["quantity", "q", "amount", "dissolved"];

/// CSV ingest output: observations + bookkeeping for the summary.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub observations: ObservationSet,
    pub rows_read: usize,
    pub rows_skipped: usize,
}

/// Parse one text cell. Blank text is `Ok(None)`.
pub fn parse_number(text: &str, row: usize, field: Field) -> Result<Option<f64>, KineticsError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(KineticsError::InvalidNumber {
            row,
            field,
            text: trimmed.to_string(),
        }),
    }
}

/// Parse entry-form rows `(time_text, quantity_text)`.
///
/// A row is used only when both cells are non-blank; half-filled rows are
/// skipped like empty ones. Rows are numbered from 1.
pub fn parse_entry_pairs<S: AsRef<str>>(rows: &[(S, S)]) -> Result<ObservationSet, KineticsError> {
    let mut points = Vec::with_capacity(rows.len());
    for (idx, (time_text, quantity_text)) in rows.iter().enumerate() {
        let (time_text, quantity_text) = (time_text.as_ref(), quantity_text.as_ref());
        if time_text.trim().is_empty() || quantity_text.trim().is_empty() {
            if !(time_text.trim().is_empty() && quantity_text.trim().is_empty()) {
                debug!("entry row {} is half-filled; skipped", idx + 1);
            }
            continue;
        }

        let row = idx + 1;
        let time = parse_number(time_text, row, Field::Time)?;
        let quantity = parse_number(quantity_text, row, Field::Quantity)?;
        if let (Some(time), Some(quantity)) = (time, quantity) {
            points.push(Observation { time, quantity });
        }
    }
    Ok(ObservationSet::from_observations(&points))
}

/// Parse a `T,Q` command-line point.
pub fn parse_point_arg(s: &str) -> Result<Observation, String> {
    let Some((t, q)) = s.split_once(',') else {
        return Err(format!("expected TIME,QUANTITY, got '{s}'"));
    };
    let time = parse_number(t, 1, Field::Time)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("missing time in '{s}'"))?;
    let quantity = parse_number(q, 1, Field::Quantity)
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("missing quantity in '{s}'"))?;
    Ok(Observation { time, quantity })
}

/// Load observations from a CSV file with `time` and `quantity` columns.
pub fn load_observations_csv(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(EXIT_USAGE, format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_observations_csv(file)
        .map_err(|e| AppError::new(e.exit_code(), format!("{}: {e}", path.display())))
}

/// Read observations from any CSV source. Line numbers in errors are 1-based
/// file lines (the header is line 1).
pub fn read_observations_csv<R: std::io::Read>(reader: R) -> Result<IngestedData, CsvIngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers().map_err(CsvIngestError::Csv)?.clone();
    let header_map = build_header_map(&headers);
    let time_idx = find_column(&header_map, TIME_HEADERS).ok_or(CsvIngestError::MissingColumn("time"))?;
    let quantity_idx =
        find_column(&header_map, QUANTITY_HEADERS).ok_or(CsvIngestError::MissingColumn("quantity"))?;

    let mut points = Vec::new();
    let mut rows_read = 0usize;
    let mut rows_skipped = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = result.map_err(CsvIngestError::Csv)?;
        let time_text = record.get(time_idx).unwrap_or("");
        let quantity_text = record.get(quantity_idx).unwrap_or("");

        if time_text.is_empty() && quantity_text.is_empty() {
            rows_skipped += 1;
            continue;
        }

        let time = parse_number(time_text, line, Field::Time)?.ok_or(KineticsError::InvalidNumber {
            row: line,
            field: Field::Time,
            text: String::new(),
        })?;
        let quantity = parse_number(quantity_text, line, Field::Quantity)?.ok_or(KineticsError::InvalidNumber {
            row: line,
            field: Field::Quantity,
            text: String::new(),
        })?;
        points.push(Observation { time, quantity });
    }

    if rows_skipped > 0 {
        warn!("skipped {rows_skipped} blank CSV row(s)");
    }

    Ok(IngestedData {
        observations: ObservationSet::from_observations(&points),
        rows_read,
        rows_skipped,
    })
}

/// Failures while reading an observation CSV.
#[derive(Debug, thiserror::Error)]
pub enum CsvIngestError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column: `{0}`")]
    MissingColumn(&'static str),
    #[error(transparent)]
    Value(#[from] KineticsError),
}

impl CsvIngestError {
    pub fn exit_code(&self) -> u8 {
        match self {
            CsvIngestError::Value(e) => e.exit_code(),
            _ => EXIT_USAGE,
        }
    }
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "﻿time"). If we don't strip it, schema validation will
    // incorrectly report missing columns.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn find_column(header_map: &HashMap<String, usize>, aliases: &[&str]) -> Option<usize> {
    aliases.iter().find_map(|a| header_map.get(*a).copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_pairs_skip_blank_and_half_filled_rows() {
        let rows = [
            ("0", "0"),
            ("", ""),
            ("5", ""),
            (" 10 ", "22.5"),
            ("", "40"),
            ("15", "31"),
        ];
        let set = parse_entry_pairs(&rows).unwrap();
        assert_eq!(set.times(), &[0.0, 10.0, 15.0]);
        assert_eq!(set.quantities(), &[0.0, 22.5, 31.0]);
    }

    #[test]
    fn entry_pairs_report_row_of_bad_text() {
        let rows = [("0", "0"), ("5", "12"), ("ten", "20")];
        let err = parse_entry_pairs(&rows).unwrap_err();
        assert_eq!(
            err,
            KineticsError::InvalidNumber {
                row: 3,
                field: Field::Time,
                text: "ten".to_string()
            }
        );
    }

    #[test]
    fn entry_pairs_reject_non_finite_numbers() {
        let rows = [("1", "inf")];
        assert!(matches!(
            parse_entry_pairs(&rows).unwrap_err(),
            KineticsError::InvalidNumber { field: Field::Quantity, .. }
        ));
    }

    #[test]
    fn all_blank_entry_form_is_empty() {
        let rows = vec![(String::new(), String::new()); 12];
        assert!(parse_entry_pairs(&rows).unwrap().is_empty());
    }

    #[test]
    fn point_arg_parses_pair() {
        assert_eq!(
            parse_point_arg("5, 12.5").unwrap(),
            Observation { time: 5.0, quantity: 12.5 }
        );
        assert!(parse_point_arg("5").is_err());
        assert!(parse_point_arg("5,x").is_err());
    }

    #[test]
    fn csv_accepts_aliases_and_bom() {
        let data = "\u{feff}Time_Min,Dissolved\n0,0\n5,18.2\n,\n10,33.0\n";
        let ingest = read_observations_csv(data.as_bytes()).unwrap();
        assert_eq!(ingest.observations.times(), &[0.0, 5.0, 10.0]);
        assert_eq!(ingest.rows_read, 4);
        assert_eq!(ingest.rows_skipped, 1);
    }

    #[test]
    fn csv_bad_cell_names_line() {
        let data = "time,quantity\n0,0\n5,abc\n";
        let err = read_observations_csv(data.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            CsvIngestError::Value(KineticsError::InvalidNumber { row: 3, field: Field::Quantity, .. })
        ));
    }

    #[test]
    fn csv_missing_column_is_reported() {
        let data = "minutes,quantity\n0,0\n";
        let err = read_observations_csv(data.as_bytes()).unwrap_err();
        assert!(matches!(err, CsvIngestError::MissingColumn("time")));
        assert_eq!(err.exit_code(), EXIT_USAGE);
    }
}
