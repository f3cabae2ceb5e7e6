//! Drag gesture interpretation.
//!
//! The engine turns pointer drags into either stroke geometry or pan updates.
//! Which one is decided once, when the gesture starts, from the selected
//! [`InputMode`]; the active [`GestureState`] then carries that decision until
//! the drag ends.

use crate::geometry::ScreenPoint;
use crate::stroke::{StrokeColor, StrokeList};
use crate::viewport::Viewport;
use kurbo::Vec2;
use serde::{Deserialize, Serialize};

/// What a drag does when it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum InputMode {
    #[default]
    Draw,
    Pan,
}

/// State of the current gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GestureState {
    /// No drag in progress.
    #[default]
    Idle,
    /// A stroke is open and receives every move.
    Drawing,
    /// The pan offset follows the drag translation.
    Panning,
}

/// Effect of a single drag-change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEffect {
    StrokeStarted,
    StrokeExtended,
    Panned,
}

/// What the caller must do once a drag ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEnd {
    /// A drawing gesture finished; the strokes must be flattened.
    Flatten,
    /// A pan gesture finished and its offset is now the baseline.
    PanCommitted,
    /// No gesture was in progress.
    Ignored,
}

/// Drives strokes and panning from drag events.
#[derive(Debug, Clone, Default)]
pub struct DrawingEngine {
    mode: InputMode,
    state: GestureState,
    color: StrokeColor,
}

impl DrawingEngine {
    pub fn new(color: StrokeColor) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn color(&self) -> StrokeColor {
        self.color
    }

    pub fn is_panning(&self) -> bool {
        self.mode == InputMode::Pan
    }

    /// Color and mode controls are only usable between gestures.
    pub fn controls_enabled(&self) -> bool {
        self.state == GestureState::Idle
    }

    /// Select the color for the next stroke. Rejected mid-gesture.
    pub fn set_color(&mut self, color: StrokeColor) -> bool {
        if !self.controls_enabled() {
            log::warn!("Ignoring color change during an active gesture");
            return false;
        }
        self.color = color;
        true
    }

    /// Switch between drawing and panning. Rejected mid-gesture.
    pub fn set_mode(&mut self, mode: InputMode) -> bool {
        if !self.controls_enabled() {
            log::warn!("Ignoring mode change during an active gesture");
            return false;
        }
        self.mode = mode;
        true
    }

    /// Handle one drag-change event.
    ///
    /// `translation` is measured from where the gesture started. The first
    /// event of a gesture decides whether it draws or pans.
    pub fn drag_changed(
        &mut self,
        position: ScreenPoint,
        translation: Vec2,
        strokes: &mut StrokeList,
        viewport: &mut Viewport,
    ) -> DragEffect {
        match (self.state, self.mode) {
            (GestureState::Idle, InputMode::Draw) => {
                let start = viewport.screen_to_image(position);
                log::debug!("Stroke started at ({:.1}, {:.1})", start.x(), start.y());
                strokes.begin(start, self.color);
                self.state = GestureState::Drawing;
                DragEffect::StrokeStarted
            }
            (GestureState::Idle, InputMode::Pan) => {
                self.state = GestureState::Panning;
                viewport.pan_to(translation);
                DragEffect::Panned
            }
            (GestureState::Drawing, _) => {
                let extended = strokes.extend_last(viewport.screen_to_image(position));
                debug_assert!(extended, "drawing gesture without an open stroke");
                DragEffect::StrokeExtended
            }
            (GestureState::Panning, _) => {
                viewport.pan_to(translation);
                DragEffect::Panned
            }
        }
    }

    /// Handle the end of a drag and return to idle.
    pub fn drag_ended(&mut self, viewport: &mut Viewport) -> DragEnd {
        let state = std::mem::take(&mut self.state);
        match state {
            GestureState::Drawing => DragEnd::Flatten,
            GestureState::Panning => {
                viewport.commit_pan();
                log::debug!(
                    "Pan committed at ({:.1}, {:.1})",
                    viewport.offset().x,
                    viewport.offset().y
                );
                DragEnd::PanCommitted
            }
            GestureState::Idle => DragEnd::Ignored,
        }
    }

    /// Abandon any gesture in progress without committing it.
    pub(crate) fn reset_gesture(&mut self) {
        self.state = GestureState::Idle;
    }
}
