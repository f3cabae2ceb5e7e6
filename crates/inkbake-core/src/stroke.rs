//! Uncommitted strokes waiting to be flattened onto the base image.

use crate::geometry::ImagePoint;
use kurbo::BezPath;
use peniko::Color;
use serde::{Deserialize, Serialize};

/// Stroke color as straight (non-premultiplied) RGBA8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StrokeColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl StrokeColor {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const RED: Self = Self::rgb(255, 59, 48);
    pub const ORANGE: Self = Self::rgb(255, 149, 0);
    pub const YELLOW: Self = Self::rgb(255, 204, 0);
    pub const GREEN: Self = Self::rgb(52, 199, 89);
    pub const BLUE: Self = Self::rgb(0, 122, 255);
    pub const PURPLE: Self = Self::rgb(175, 82, 222);

    /// Swatches offered by the color picker.
    pub const PALETTE: [Self; 8] = [
        Self::BLACK,
        Self::WHITE,
        Self::RED,
        Self::ORANGE,
        Self::YELLOW,
        Self::GREEN,
        Self::BLUE,
        Self::PURPLE,
    ];

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Parse `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::new(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    /// Format as `#rrggbbaa`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

impl Default for StrokeColor {
    fn default() -> Self {
        Self::BLACK
    }
}

impl From<Color> for StrokeColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<StrokeColor> for Color {
    fn from(color: StrokeColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// One continuous line: at least one image-space point and a fixed color.
///
/// Only [`Stroke::new`] builds one, so the point list is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    points: Vec<ImagePoint>,
    color: StrokeColor,
}

impl Stroke {
    /// Start a stroke at `start`. The color cannot change afterwards.
    pub fn new(start: ImagePoint, color: StrokeColor) -> Self {
        Self {
            points: vec![start],
            color,
        }
    }

    pub fn push(&mut self, point: ImagePoint) {
        self.points.push(point);
    }

    /// Points in draw order. Never empty.
    pub fn points(&self) -> &[ImagePoint] {
        &self.points
    }

    pub fn color(&self) -> StrokeColor {
        self.color
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; strokes start with one point.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True when every point coincides, so the stroke renders as a dot.
    pub fn is_dot(&self) -> bool {
        let first = self.points[0];
        self.points.iter().all(|p| *p == first)
    }

    /// Polyline through the points in draw order.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut points = self.points.iter();
        if let Some(first) = points.next() {
            path.move_to(first.0);
            for point in points {
                path.line_to(point.0);
            }
        }
        path
    }
}

/// Ordered strokes; insertion order is paint order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrokeList {
    strokes: Vec<Stroke>,
}

impl StrokeList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new stroke on top of the others.
    pub(crate) fn begin(&mut self, start: ImagePoint, color: StrokeColor) {
        self.strokes.push(Stroke::new(start, color));
    }

    /// Append to the topmost stroke. Returns false if there is none.
    pub(crate) fn extend_last(&mut self, point: ImagePoint) -> bool {
        match self.strokes.last_mut() {
            Some(stroke) => {
                stroke.push(point);
                true
            }
            None => false,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.strokes.clear();
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn last(&self) -> Option<&Stroke> {
        self.strokes.last()
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// Total number of points across all strokes.
    pub fn point_count(&self) -> usize {
        self.strokes.iter().map(Stroke::len).sum()
    }
}
