//! Gesture scripts: recorded user input replayed against a session.
//!
//! A script is a JSON array of commands:
//!
//! ```json
//! [
//!   { "op": "set_color", "color": "#ff3b30" },
//!   { "op": "drag", "points": [[10, 10], [40, 25], [80, 30]] },
//!   { "op": "pan_mode", "enabled": true },
//!   { "op": "drag", "points": [[0, 0], [25, 0]] },
//!   { "op": "finish" }
//! ]
//! ```

use crate::error::{AppError, AppResult};
use inkbake_core::{EditingSession, ScreenPoint, StrokeColor};
use kurbo::Vec2;
use serde::{Deserialize, Serialize};

/// One recorded user action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptCommand {
    /// A full drag gesture through `points` (screen space), then release.
    Drag { points: Vec<[f64; 2]> },
    /// A drag with no movement.
    Tap { at: [f64; 2] },
    SetColor { color: String },
    PanMode { enabled: bool },
    ZoomIn,
    ZoomOut,
    Clear,
    Finish,
    Cancel,
}

/// A validated list of commands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script {
    pub commands: Vec<ScriptCommand>,
}

impl Script {
    pub fn from_json(json: &str) -> AppResult<Self> {
        let commands: Vec<ScriptCommand> =
            serde_json::from_str(json).map_err(|e| AppError::Script(e.to_string()))?;
        let script = Self { commands };
        script.validate()?;
        Ok(script)
    }

    fn validate(&self) -> AppResult<()> {
        for (index, command) in self.commands.iter().enumerate() {
            match command {
                ScriptCommand::Drag { points } if points.is_empty() => {
                    return Err(AppError::Script(format!("command {index}: drag needs at least one point")));
                }
                ScriptCommand::SetColor { color } if StrokeColor::from_hex(color).is_none() => {
                    return Err(AppError::Script(format!("command {index}: bad color {color:?}")));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// True if the script ends the session itself.
    pub fn closes_session(&self) -> bool {
        self.commands
            .iter()
            .any(|c| matches!(c, ScriptCommand::Finish | ScriptCommand::Cancel))
    }

    /// Replay every command, the way a UI would deliver them.
    pub fn apply(&self, session: &mut EditingSession) {
        for command in &self.commands {
            apply_command(session, command);
            for event in session.poll_events() {
                log::debug!("{:?} -> {:?}", command, event);
            }
        }
    }
}

fn apply_command(session: &mut EditingSession, command: &ScriptCommand) {
    match command {
        ScriptCommand::Drag { points } => drag(session, points),
        ScriptCommand::Tap { at } => drag(session, std::slice::from_ref(at)),
        ScriptCommand::SetColor { color } => {
            if let Some(color) = StrokeColor::from_hex(color) {
                session.set_color(color);
            }
        }
        ScriptCommand::PanMode { enabled } => {
            session.set_pan_mode(*enabled);
        }
        ScriptCommand::ZoomIn => session.zoom_in(),
        ScriptCommand::ZoomOut => session.zoom_out(),
        ScriptCommand::Clear => session.clear(),
        ScriptCommand::Finish => session.finish(),
        ScriptCommand::Cancel => session.cancel(),
    }
}

fn drag(session: &mut EditingSession, points: &[[f64; 2]]) {
    let Some(&[sx, sy]) = points.first() else {
        return;
    };
    for &[x, y] in points {
        session.drag_changed(ScreenPoint::new(x, y), Vec2::new(x - sx, y - sy));
    }
    session.drag_ended();
}
