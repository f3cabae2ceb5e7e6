//! Command-line arguments for headless replay.
//!
//! Usage:
//!   inkbake photo.jpg --script strokes.json --output annotated.png
//!   inkbake photo.png -s strokes.json -o out.png --viewport 1280x800 --config pen.json

use clap::Parser;
use kurbo::Size;
use std::path::PathBuf;

/// Replay a gesture script over an image and write the flattened result.
#[derive(Parser, Debug)]
#[command(name = "inkbake", version, about = "Annotate an image by replaying recorded drag gestures")]
pub struct CliArgs {
    /// Image to annotate (PNG, JPEG or WEBP).
    pub input: PathBuf,

    /// JSON gesture script to replay.
    #[arg(short, long, value_name = "SCRIPT.json")]
    pub script: PathBuf,

    /// Where to write the finished PNG.
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Size of the simulated drawing area, as WIDTHxHEIGHT.
    #[arg(long, default_value = "1280x800", value_parser = parse_viewport)]
    pub viewport: Size,

    /// Session config JSON (stroke width, zoom step, scale floor, initial color).
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Parse `WIDTHxHEIGHT` into a size.
pub fn parse_viewport(value: &str) -> Result<Size, String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {value:?}"))?;
    let w: f64 = w.trim().parse().map_err(|_| format!("bad width {w:?}"))?;
    let h: f64 = h.trim().parse().map_err(|_| format!("bad height {h:?}"))?;
    if w <= 0.0 || h <= 0.0 {
        return Err(format!("viewport must be positive, got {value:?}"));
    }
    Ok(Size::new(w, h))
}
