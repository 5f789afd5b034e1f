//! Command-line parsing for the dissolution kinetics fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_SCALE, ENTRY_ROWS, Observation};
use crate::io::ingest::parse_point_arg;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "dissolve", version, about = "Dissolution test kinetics fitter (zero-order / first-order)")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit both kinetic models to observations, print the summary, and optionally plot/export.
    Fit(FitArgs),
    /// Plot a previously exported curve JSON.
    Plot(PlotArgs),
    /// Generate a synthetic first-order dissolution profile as CSV.
    Demo(DemoArgs),
    /// Launch the interactive entry form.
    ///
    /// Uses the same fit pipeline as `dissolve fit`, rendered in a terminal UI.
    Tui(TuiArgs),
}

/// Options shared by everything that runs a fit.
#[derive(Debug, Args, Clone)]
pub struct ModelArgs {
    /// Total amount on the quantity axis; the first-order transform is ln(scale - quantity).
    #[arg(long, default_value_t = DEFAULT_SCALE)]
    pub scale: f64,

    /// Iteration limit for the least-squares solver.
    #[arg(long, default_value_t = 200)]
    pub max_iterations: usize,
}

/// Options for `dissolve fit`.
#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// CSV file with `time` and `quantity` columns.
    #[arg(long, value_name = "CSV")]
    pub csv: Option<PathBuf>,

    /// Observation as TIME,QUANTITY (repeatable; appended after CSV rows).
    #[arg(short = 'p', long = "point", value_name = "T,Q", value_parser = parse_point_arg)]
    pub points: Vec<Observation>,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export per-observation results to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export curve (params + R² + fitted grid) to JSON.
    #[arg(long = "export-curve")]
    pub export_curve: Option<PathBuf>,
}

/// Options for plotting a saved curve.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Curve JSON file produced by `dissolve fit --export-curve`.
    #[arg(long, value_name = "JSON")]
    pub curve: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for `dissolve demo`.
#[derive(Debug, Parser)]
pub struct DemoArgs {
    /// Number of samples.
    #[arg(short = 'n', long, default_value_t = ENTRY_ROWS)]
    pub count: usize,

    /// Minutes between samples.
    #[arg(long, default_value_t = 5.0)]
    pub interval: f64,

    /// First-order rate constant (1/min).
    #[arg(long, default_value_t = 0.05)]
    pub rate: f64,

    /// Standard deviation of the measurement noise.
    #[arg(long, default_value_t = 1.0)]
    pub noise: f64,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Total amount on the quantity axis.
    #[arg(long, default_value_t = DEFAULT_SCALE)]
    pub scale: f64,

    /// Write the CSV here instead of stdout.
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Also fit the generated profile and print the summary.
    #[arg(long)]
    pub fit: bool,
}

/// Options for `dissolve tui`.
#[derive(Debug, Parser, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub model: ModelArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_args_parse_points_and_scale() {
        let cli = Cli::parse_from(["dissolve", "fit", "-p", "0,0", "--point", "10,25.5", "--scale", "50", "--no-plot"]);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.points.len(), 2);
        assert_eq!(args.points[1], Observation { time: 10.0, quantity: 25.5 });
        assert_eq!(args.model.scale, 50.0);
        assert!(args.no_plot);
    }

    #[test]
    fn bad_point_is_a_parse_error() {
        assert!(Cli::try_parse_from(["dissolve", "fit", "--point", "abc"]).is_err());
    }
}
