//! Screen-space and image-space coordinates.
//!
//! A pointer reports positions in the content layer's local frame (screen
//! space). Stroke points are stored in the base image's own pixel frame
//! (image space). The two are related by the pan offset only: the zoom scale
//! is applied by the host at render time and never baked into stored points.

use kurbo::{Point, Vec2};

/// A pointer position in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint(pub Point);

/// A position in the base image's pixel frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ImagePoint(pub Point);

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self(Point::new(x, y))
    }
}

impl ImagePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self(Point::new(x, y))
    }

    pub fn x(self) -> f64 {
        self.0.x
    }

    pub fn y(self) -> f64 {
        self.0.y
    }
}

/// Convert a pointer position to image space by removing the pan offset.
///
/// Scale is not an input: points are stored in the unscaled frame.
pub fn screen_to_image(screen: ScreenPoint, offset: Vec2) -> ImagePoint {
    ImagePoint(screen.0 - offset)
}

/// Inverse of [`screen_to_image`], used to place the live overlay.
pub fn image_to_screen(image: ImagePoint, offset: Vec2) -> ScreenPoint {
    ScreenPoint(image.0 + offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_without_offset() {
        let image = screen_to_image(ScreenPoint::new(12.0, 34.0), Vec2::ZERO);
        assert_eq!(image, ImagePoint::new(12.0, 34.0));
    }

    #[test]
    fn test_offset_is_subtracted() {
        let image = screen_to_image(ScreenPoint::new(100.0, 200.0), Vec2::new(30.0, -20.0));
        assert!((image.x() - 70.0).abs() < f64::EPSILON);
        assert!((image.y() - 220.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let offset = Vec2::new(-14.5, 8.25);
        let original = ScreenPoint::new(123.0, 456.0);
        let back = image_to_screen(screen_to_image(original, offset), offset);
        assert!((back.0.x - original.0.x).abs() < 1e-10);
        assert!((back.0.y - original.0.y).abs() < 1e-10);
    }
}
