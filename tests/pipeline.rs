use dissolution_kinetics::app::pipeline::{run_fit, run_fit_with_observations};
use dissolution_kinetics::domain::{FitConfig, Observation, ObservationSet};
use dissolution_kinetics::error::{EXIT_EMPTY, EXIT_FIT, KineticsError};
use dissolution_kinetics::fit::FitOptions;
use dissolution_kinetics::io::{parse_entry_pairs, read_curve_json, write_curve_json};
use dissolution_kinetics::plot::render_ascii_plot_from_curve_file;
use dissolution_kinetics::report::format_summary;

#[test]
fn entry_form_to_summary() {
    let rows = [
        ("0", "0"),
        ("5", "22.1"),
        ("10", "39.3"),
        ("", ""),
        ("20", "63.2"),
        ("30", "77.7"),
    ];
    let set = parse_entry_pairs(&rows).unwrap();
    let report = run_fit_with_observations(&set, &FitOptions::default()).unwrap();

    // Data generated from k = 0.05, A0 = 100.
    assert!((report.first_order.k - 0.05).abs() < 2e-3, "k = {}", report.first_order.k);
    assert!((report.first_order.a0 - 100.0).abs() < 1.0, "A0 = {}", report.first_order.a0);
    assert!(report.first_order.r2 > report.zero_order.r2);

    let summary = format_summary(&report);
    assert!(summary.contains("Zero-Order Kinetics"));
    assert!(summary.contains("First-Order Kinetics"));
}

#[test]
fn cli_points_fit_and_curve_replot() {
    let config = FitConfig {
        points: vec![
            Observation { time: 0.0, quantity: 0.0 },
            Observation { time: 10.0, quantity: 30.0 },
            Observation { time: 20.0, quantity: 52.0 },
            Observation { time: 40.0, quantity: 78.0 },
        ],
        ..FitConfig::default()
    };
    let run = run_fit(&config).unwrap();
    assert!(run.ingest.is_none());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("curve.json");
    write_curve_json(&path, &run.report).unwrap();
    let curve = read_curve_json(&path).unwrap();
    assert_eq!(curve.observations.len(), 4);
    assert!((curve.first_order.k - run.report.first_order.k).abs() < 1e-12);

    let plot = render_ascii_plot_from_curve_file(&curve, 40, 12);
    assert!(plot.contains("Dissolution Test Results and Kinetics Fit"));
}

#[test]
fn empty_input_is_a_warning() {
    let err = run_fit(&FitConfig::default()).unwrap_err();
    assert_eq!(err.exit_code(), EXIT_EMPTY);

    let set = ObservationSet::from_observations(&[]);
    let err = run_fit_with_observations(&set, &FitOptions::default()).unwrap_err();
    assert_eq!(err, KineticsError::EmptyInput);
    assert!(err.is_warning());
}

#[test]
fn fully_dissolved_point_fails_first_order() {
    let config = FitConfig {
        points: vec![
            Observation { time: 0.0, quantity: 0.0 },
            Observation { time: 10.0, quantity: 50.0 },
            Observation { time: 20.0, quantity: 100.0 },
        ],
        ..FitConfig::default()
    };
    let err = run_fit(&config).unwrap_err();
    assert_eq!(err.exit_code(), EXIT_FIT);
    assert!(err.to_string().contains("row 3"), "{err}");
}
