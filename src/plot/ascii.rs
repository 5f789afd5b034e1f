//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed points: `o`
//! - zero-order curve: `-` line
//! - first-order curve (back-transformed): `*` line

use crate::domain::{CurveFile, KineticsReport, ModelKind};
use crate::report::{DATA_LABEL, PLOT_TITLE, X_LABEL, Y_LABEL, legend_label};

const POINT: char = 'o';
const ZERO_ORDER: char = '-';
const FIRST_ORDER: char = '*';

/// Everything the renderer needs, already in quantity units.
struct PlotData {
    points: Vec<(f64, f64)>,
    zero_order: Vec<(f64, f64)>,
    first_order: Vec<(f64, f64)>,
    legend: [String; 2],
    equations: [String; 2],
}

/// Render a plot for an in-memory fit. Curves connect the fitted values in
/// input order.
pub fn render_ascii_plot(report: &KineticsReport, width: usize, height: usize) -> String {
    let times = report.observations.times();
    let data = PlotData {
        points: report.observations.iter().map(|o| (o.time, o.quantity)).collect(),
        zero_order: times.iter().copied().zip(report.zero_order.predicted.iter().copied()).collect(),
        first_order: times.iter().copied().zip(report.first_order.predicted.iter().copied()).collect(),
        legend: crate::report::legend_labels(report),
        equations: [
            crate::report::zero_order_equation(&report.zero_order),
            crate::report::first_order_equation(&report.first_order),
        ],
    };
    render_plot(&data, width, height)
}

/// Render a plot from a saved curve JSON file.
pub fn render_ascii_plot_from_curve_file(curve: &CurveFile, width: usize, height: usize) -> String {
    let grid = &curve.grid;
    let data = PlotData {
        points: curve.observations.iter().map(|o| (o.time, o.quantity)).collect(),
        zero_order: grid.time_min.iter().copied().zip(grid.zero_order.iter().copied()).collect(),
        first_order: grid.time_min.iter().copied().zip(grid.first_order.iter().copied()).collect(),
        legend: [
            legend_label(ModelKind::ZeroOrder, curve.zero_order.r2),
            legend_label(ModelKind::FirstOrder, curve.first_order.r2),
        ],
        equations: [
            format!("y = {:.4}x", curve.zero_order.k),
            format!("y = ln({:.4}) - {:.4}x", curve.first_order.a0, curve.first_order.k),
        ],
    };
    render_plot(&data, width, height)
}

fn render_plot(data: &PlotData, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let all_series = [&data.points, &data.zero_order, &data.first_order];
    let (t_min, t_max) = range(all_series.iter().flat_map(|s| s.iter().map(|p| p.0))).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = range(all_series.iter().flat_map(|s| s.iter().map(|p| p.1))).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Curves first so points can overlay.
    draw_curve(&mut grid, &data.zero_order, t_min, t_max, y_min, y_max, ZERO_ORDER);
    draw_curve(&mut grid, &data.first_order, t_min, t_max, y_min, y_max, FIRST_ORDER);

    for &(t, y) in &data.points {
        if !(t.is_finite() && y.is_finite()) {
            continue;
        }
        let x = map_x(t, t_min, t_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][x] = POINT;
    }

    let mut out = String::new();
    out.push_str(PLOT_TITLE);
    out.push('\n');
    out.push_str(&format!(
        "Plot: {X_LABEL}=[{t_min:.2}, {t_max:.2}] | {Y_LABEL}=[{y_min:.2}, {y_max:.2}]\n"
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out.push_str(&format!("{POINT} {DATA_LABEL}\n"));
    out.push_str(&format!("{ZERO_ORDER} {}\n", data.legend[0]));
    out.push_str(&format!("{FIRST_ORDER} {}\n", data.legend[1]));
    out.push_str(&format!("  {}\n", data.equations[0]));
    out.push_str(&format!("  {}\n", data.equations[1]));

    out
}

fn range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values.filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max.is_finite() && max > min {
        Some((min, max))
    } else if min.is_finite() {
        Some((min - 0.5, min + 0.5))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(
    grid: &mut [Vec<char>],
    curve: &[(f64, f64)],
    t_min: f64,
    t_max: f64,
    y_min: f64,
    y_max: f64,
    ch: char,
) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, y) in curve {
        if !(t.is_finite() && y.is_finite()) {
            prev = None;
            continue;
        }
        let x = map_x(t, t_min, t_max, width);
        let row = map_y(y, y_min, y_max, height);
        let (x0, y0) = prev.unwrap_or((x, row));
        draw_line(grid, x0, y0, x, row, ch);
        prev = Some((x, row));
    }
}

/// Integer line drawing (Bresenham-ish). Only blank cells are written.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FirstOrderFit, ObservationSet, ZeroOrderFit};

    fn tiny_report() -> KineticsReport {
        KineticsReport {
            observations: ObservationSet::new(vec![0.0, 10.0], vec![0.0, 10.0]).unwrap(),
            scale: 100.0,
            zero_order: ZeroOrderFit {
                k: 1.0,
                predicted: vec![0.0, 10.0],
                r2: 1.0,
                sse: 0.0,
                iterations: 1,
            },
            first_order: FirstOrderFit {
                k: 0.01,
                a0: 100.0,
                log_observed: vec![0.0, 0.0],
                log_predicted: vec![0.0, 0.0],
                predicted: vec![0.0, 5.0],
                r2: 0.5,
                sse: 0.0,
                iterations: 1,
            },
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let txt = render_ascii_plot(&tiny_report(), 10, 5);
        let expected = concat!(
            "Dissolution Test Results and Kinetics Fit\n",
            "Plot: Time (min)=[0.00, 10.00] | Quantity=[-0.50, 10.50]\n",
            "        -o\n",
            "      --  \n",
            "    -- ***\n",
            "  --***   \n",
            "o-*       \n",
            "o Data\n",
            "- Zero-Order Kinetics (R2 = 1.0000)\n",
            "* First-Order Kinetics (R2 = 0.5000)\n",
            "  y = 1.0000x\n",
            "  y = ln(100.0000) - 0.0100x\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn curve_file_plot_has_same_labels() {
        let report = tiny_report();
        let curve = crate::io::curve::curve_file(&report);
        let txt = render_ascii_plot_from_curve_file(&curve, 40, 10);
        assert!(txt.contains("- Zero-Order Kinetics (R2 = 1.0000)"));
        assert!(txt.contains("  y = ln(100.0000) - 0.0100x"));
        assert_eq!(txt.lines().count(), 2 + 10 + 5);
    }
}
