//! Headless host: load, replay, flatten, save.

use crate::cli::CliArgs;
use crate::error::{AppError, AppResult};
use crate::io::{load_image, write_png};
use crate::script::Script;
use inkbake_core::{EditingSession, SessionConfig, SessionOutcome};
use std::path::{Path, PathBuf};

/// What a run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The finished image was written here.
    Saved(PathBuf),
    /// The script cancelled the session; nothing was written.
    Cancelled,
}

fn read_text(path: &Path) -> AppResult<String> {
    std::fs::read_to_string(path).map_err(|source| AppError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Load the session config, falling back to defaults.
pub fn load_config(path: Option<&Path>) -> AppResult<SessionConfig> {
    match path {
        Some(path) => {
            let config = SessionConfig::from_json(&read_text(path)?)?;
            log::info!("Loaded config from {}", path.display());
            Ok(config)
        }
        None => Ok(SessionConfig::default()),
    }
}

/// Run one annotation session end to end.
pub fn run(args: &CliArgs) -> AppResult<RunOutcome> {
    let config = load_config(args.config.as_deref())?;
    let script = Script::from_json(&read_text(&args.script)?)?;
    let image = load_image(&args.input)?;

    let (mut session, handle) = EditingSession::create(image, args.viewport, config);
    script.apply(&mut session);
    if !script.closes_session() {
        log::info!("Script did not end the session; finishing");
        session.finish();
    }

    match handle.try_outcome() {
        Some(SessionOutcome::Finished(image)) => {
            write_png(&args.output, &image)?;
            Ok(RunOutcome::Saved(args.output.clone()))
        }
        Some(SessionOutcome::Cancelled) => {
            log::info!("Session cancelled; {} not written", args.output.display());
            Ok(RunOutcome::Cancelled)
        }
        None => Err(AppError::NoOutcome),
    }
}
