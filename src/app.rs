//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and initializes logging
//! - parses CLI arguments
//! - runs the fit pipeline
//! - prints reports/plots
//! - writes optional exports

use std::fs::File;
use std::io::Write;

use clap::Parser;
use log::warn;

use crate::cli::{Command, DemoArgs, FitArgs, PlotArgs, TuiArgs};
use crate::domain::{DemoConfig, FitConfig};
use crate::error::{AppError, EXIT_USAGE};

pub mod pipeline;

/// Entry point for the `dissolve` binary.
pub fn run() -> Result<(), AppError> {
    // A missing `.env` is the common case.
    let _ = dotenvy::dotenv();
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).try_init();

    // We want `dissolve` and `dissolve --scale 50` to behave like `dissolve tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Plot(args) => handle_plot(args),
        Command::Demo(args) => handle_demo(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    let run = pipeline::run_fit(&config).inspect_err(|err| {
        if err.exit_code() == crate::error::EXIT_EMPTY {
            warn!("{err}");
        }
    })?;

    if let Some(ingest) = &run.ingest {
        if ingest.rows_skipped > 0 {
            eprintln!(
                "note: {} of {} CSV row(s) were blank and skipped",
                ingest.rows_skipped, ingest.rows_read
            );
        }
    }

    println!("{}", crate::report::format_summary(&run.report));

    if config.plot {
        let plot = crate::plot::render_ascii_plot(&run.report, config.plot_width, config.plot_height);
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &config.export_results {
        crate::io::export::write_results_csv(path, &run.report)?;
    }
    if let Some(path) = &config.export_curve {
        crate::io::curve::write_curve_json(path, &run.report)?;
    }

    Ok(())
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    let config = FitConfig {
        scale: args.model.scale,
        max_iterations: args.model.max_iterations,
        ..FitConfig::default()
    };
    crate::tui::run(&config)
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let curve = crate::io::curve::read_curve_json(&args.curve)?;
    let plot = crate::plot::render_ascii_plot_from_curve_file(&curve, args.width, args.height);

    println!("{plot}");
    Ok(())
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = DemoConfig {
        count: args.count,
        interval: args.interval,
        rate: args.rate,
        noise: args.noise,
        seed: args.seed,
        scale: args.scale,
    };
    let observations = crate::data::generate_profile(&config)?;

    let write_err = |e: csv::Error| AppError::new(EXIT_USAGE, format!("Failed to write demo CSV: {e}"));
    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .map_err(|e| AppError::new(EXIT_USAGE, format!("Failed to create '{}': {e}", path.display())))?;
            crate::io::export::write_observations(file, &observations).map_err(write_err)?;
        }
        None => {
            let stdout = std::io::stdout();
            crate::io::export::write_observations(stdout.lock(), &observations).map_err(write_err)?;
        }
    }

    if args.fit {
        let fit_config = FitConfig {
            scale: args.scale,
            ..FitConfig::default()
        };
        let report = pipeline::run_fit_with_observations(&observations, &pipeline::fit_options(&fit_config))?;
        let mut err = std::io::stderr().lock();
        let _ = writeln!(err, "\n{}", crate::report::format_summary(&report));
    }

    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    FitConfig {
        csv_path: args.csv.clone(),
        points: args.points.clone(),
        scale: args.model.scale,
        max_iterations: args.model.max_iterations,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_results: args.export.clone(),
        export_curve: args.export_curve.clone(),
    }
}

/// Rewrite argv so `dissolve` defaults to `dissolve tui`.
///
/// Rules:
/// - `dissolve`                         -> `dissolve tui`
/// - `dissolve --scale 50 ...`          -> `dissolve tui --scale 50 ...`
/// - `dissolve --help/--version/-h`     -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fit" | "plot" | "demo" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
