//! Labels, equations and the terminal summary.

use crate::domain::{FirstOrderFit, KineticsReport, ModelKind, ZeroOrderFit};

pub const PLOT_TITLE: &str = "Dissolution Test Results and Kinetics Fit";
pub const X_LABEL: &str = "Time (min)";
pub const Y_LABEL: &str = "Quantity";
pub const DATA_LABEL: &str = "Data";

/// `y = {k}x` with 4 decimals.
pub fn zero_order_equation(fit: &ZeroOrderFit) -> String {
    format!("y = {:.4}x", fit.k)
}

/// `y = ln({A0}) - {k}x` with 4 decimals.
pub fn first_order_equation(fit: &FirstOrderFit) -> String {
    format!("y = ln({:.4}) - {:.4}x", fit.a0, fit.k)
}

/// Legend entry, e.g. `Zero-Order Kinetics (R2 = 0.9876)`.
pub fn legend_label(model: ModelKind, r2: f64) -> String {
    format!("{} (R2 = {r2:.4})", model.display_name())
}

/// Legend entries for both fits, zero-order first.
pub fn legend_labels(report: &KineticsReport) -> [String; 2] {
    [
        legend_label(ModelKind::ZeroOrder, report.zero_order.r2),
        legend_label(ModelKind::FirstOrder, report.first_order.r2),
    ]
}

/// Format the full run summary (dataset + both fits).
pub fn format_summary(report: &KineticsReport) -> String {
    let mut out = String::new();
    let obs = &report.observations;

    out.push_str("=== dissolve - Dissolution Kinetics Fit ===\n");
    out.push_str(&format!("Observations: n={}", obs.len()));
    if let (Some((t_min, t_max)), Some((q_min, q_max))) = (obs.time_range(), obs.quantity_range()) {
        out.push_str(&format!(
            " | time=[{t_min:.2}, {t_max:.2}] min | quantity=[{q_min:.2}, {q_max:.2}]"
        ));
    }
    out.push('\n');
    out.push_str(&format!("Scale: {}\n", report.scale));

    out.push_str("\nModels:\n");
    out.push_str(&format!(
        "  {:<22} {:<28} iters={}\n",
        legend_label(ModelKind::ZeroOrder, report.zero_order.r2),
        zero_order_equation(&report.zero_order),
        report.zero_order.iterations,
    ));
    out.push_str(&format!(
        "  {:<22} {:<28} iters={}\n",
        legend_label(ModelKind::FirstOrder, report.first_order.r2),
        first_order_equation(&report.first_order),
        report.first_order.iterations,
    ));
    out.push_str("  (first-order R2 is computed on ln(scale - quantity))\n");
    out.push('\n');

    out.push_str(&format_table(report));
    out
}

/// Per-observation table in input order.
pub fn format_table(report: &KineticsReport) -> String {
    let mut out = String::new();
    out.push_str(format!("{:>10} {:>10} {:>12} {:>12}\n", "time", "quantity", "zero_order", "first_order").trim_end());
    out.push('\n');
    out.push_str(format!("{:->10} {:->10} {:->12} {:->12}\n", "", "", "", "").trim_end());
    out.push('\n');

    for (i, o) in report.observations.iter().enumerate() {
        out.push_str(
            format!(
                "{:>10.2} {:>10.2} {:>12.4} {:>12.4}\n",
                o.time, o.quantity, report.zero_order.predicted[i], report.first_order.predicted[i],
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ObservationSet;
    use crate::fit::{FitOptions, fit_kinetics};

    fn zero(k: f64, r2: f64) -> ZeroOrderFit {
        ZeroOrderFit {
            k,
            predicted: vec![],
            r2,
            sse: 0.0,
            iterations: 1,
        }
    }

    #[test]
    fn equations_use_four_decimals() {
        assert_eq!(zero_order_equation(&zero(10.0, 1.0)), "y = 10.0000x");

        let first = FirstOrderFit {
            k: 0.023456789,
            a0: 98.765432,
            log_observed: vec![],
            log_predicted: vec![],
            predicted: vec![],
            r2: 0.5,
            sse: 0.0,
            iterations: 1,
        };
        assert_eq!(first_order_equation(&first), "y = ln(98.7654) - 0.0235x");
    }

    #[test]
    fn legend_labels_match_display_contract() {
        assert_eq!(
            legend_label(ModelKind::ZeroOrder, 0.98767),
            "Zero-Order Kinetics (R2 = 0.9877)"
        );
        assert_eq!(
            legend_label(ModelKind::FirstOrder, -0.25),
            "First-Order Kinetics (R2 = -0.2500)"
        );
    }

    #[test]
    fn summary_lists_both_models_and_rows() {
        let set = ObservationSet::new(vec![0.0, 1.0, 2.0, 3.0, 4.0], vec![0.0, 10.0, 20.0, 30.0, 40.0]).unwrap();
        let report = fit_kinetics(&set, &FitOptions::default()).unwrap();
        let txt = format_summary(&report);

        assert!(txt.contains("Zero-Order Kinetics (R2 = 1.0000)"));
        assert!(txt.contains("y = 10.0000x"));
        assert!(txt.contains("First-Order Kinetics (R2 = "));
        assert!(txt.contains("Observations: n=5"));
        // header + rule + 5 rows
        assert_eq!(format_table(&report).lines().count(), 7);
    }
}
