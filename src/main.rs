use std::process::ExitCode;

use dissolution_kinetics::error::EXIT_EMPTY;

fn main() -> ExitCode {
    match dissolution_kinetics::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if err.exit_code() == EXIT_EMPTY {
                eprintln!("warning: {err}");
            } else {
                eprintln!("error: {err}");
            }
            ExitCode::from(err.exit_code())
        }
    }
}
