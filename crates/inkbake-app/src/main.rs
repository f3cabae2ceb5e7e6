//! Main application entry point.

use clap::Parser;
use inkbake_app::{CliArgs, RunOutcome};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Starting InkBake");

    let args = CliArgs::parse();
    match inkbake_app::run(&args) {
        Ok(RunOutcome::Saved(path)) => {
            log::info!("Saved {}", path.display());
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::Cancelled) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("inkbake: {e}");
            ExitCode::FAILURE
        }
    }
}
