//! Viewport module for pan/zoom state.

use crate::config::{DEFAULT_MIN_SCALE, DEFAULT_ZOOM_STEP};
use crate::geometry::{ImagePoint, ScreenPoint, image_to_screen, screen_to_image};
use kurbo::{Affine, Size, Vec2};

/// Scale that fits `image` entirely inside `viewport`, preserving aspect ratio.
///
/// The limiting dimension wins. Degenerate sizes fall back to 1.0.
pub fn calculate_initial_scale(viewport: Size, image: Size) -> f64 {
    if image.width <= 0.0 || image.height <= 0.0 || viewport.width <= 0.0 || viewport.height <= 0.0 {
        return 1.0;
    }
    (viewport.width / image.width).min(viewport.height / image.height)
}

/// Viewport owns the pan offset and zoom scale of the editor.
///
/// `offset` tracks the gesture in progress, `last_offset` is the baseline
/// committed at the end of the previous pan gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    offset: Vec2,
    last_offset: Vec2,
    scale: f64,
    zoom_step: f64,
    min_scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            last_offset: Vec2::ZERO,
            scale: 1.0,
            zoom_step: DEFAULT_ZOOM_STEP,
            min_scale: DEFAULT_MIN_SCALE,
        }
    }
}

impl Viewport {
    pub fn new(zoom_step: f64, min_scale: f64) -> Self {
        Self {
            zoom_step,
            min_scale,
            ..Self::default()
        }
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn last_offset(&self) -> Vec2 {
        self.last_offset
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn min_scale(&self) -> f64 {
        self.min_scale
    }

    /// Transform from image space to the host's display.
    pub fn transform(&self) -> Affine {
        Affine::scale(self.scale) * Affine::translate(self.offset)
    }

    pub fn screen_to_image(&self, screen: ScreenPoint) -> ImagePoint {
        screen_to_image(screen, self.offset)
    }

    pub fn image_to_screen(&self, image: ImagePoint) -> ScreenPoint {
        image_to_screen(image, self.offset)
    }

    /// Set the offset to the committed baseline plus the gesture translation.
    pub(crate) fn pan_to(&mut self, translation: Vec2) {
        self.offset = self.last_offset + translation;
    }

    /// Make the current offset the baseline for the next pan gesture.
    pub(crate) fn commit_pan(&mut self) {
        self.last_offset = self.offset;
    }

    pub fn zoom_in(&mut self) {
        self.scale += self.zoom_step;
    }

    /// Zoom out one step, never below `min_scale`.
    pub fn zoom_out(&mut self) {
        self.scale = (self.scale - self.zoom_step).max(self.min_scale);
    }

    /// Refit the scale to the viewport, leaving the pan alone.
    pub fn fit_scale(&mut self, viewport: Size, image: Size) {
        self.scale = calculate_initial_scale(viewport, image).max(self.min_scale);
    }

    /// Fit the image to the viewport and drop any pan.
    pub fn reset(&mut self, viewport: Size, image: Size) {
        self.offset = Vec2::ZERO;
        self.last_offset = Vec2::ZERO;
        self.fit_scale(viewport, image);
    }
}
