//! InkBake Application
//!
//! Headless host for the annotation core: decodes the input image, replays a
//! recorded gesture script and encodes the finished image.

mod app;
pub mod cli;
mod error;
mod io;
pub mod script;

pub use app::{RunOutcome, load_config, run};
pub use cli::CliArgs;
pub use error::{AppError, AppResult};
pub use io::{encode_png, load_image, write_png};
pub use script::{Script, ScriptCommand};
