//! Flattening strokes into the base image.

use crate::stroke::Stroke;
use image::{Rgba, RgbaImage};
use kurbo::PathEl;
use thiserror::Error;
use tiny_skia::{FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, Transform};

/// Rasterization errors.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Cannot draw onto an empty {width}x{height} image")]
    EmptyImage { width: u32, height: u32 },
    #[error("Failed to allocate a {width}x{height} drawing surface")]
    SurfaceAllocation { width: u32, height: u32 },
}

/// Result type for rasterizer operations.
pub type RasterResult<T> = Result<T, RasterError>;

/// Composites strokes onto a raster image.
///
/// Implementations must be deterministic and must return the base image
/// unchanged when `strokes` is empty.
pub trait Rasterizer {
    /// Draw `strokes` in order over a copy of `base`.
    fn flatten(&self, base: &RgbaImage, strokes: &[Stroke], stroke_width: f64) -> RasterResult<RgbaImage>;
}

/// CPU rasterizer built on tiny-skia.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuRasterizer;

impl Rasterizer for CpuRasterizer {
    fn flatten(&self, base: &RgbaImage, strokes: &[Stroke], stroke_width: f64) -> RasterResult<RgbaImage> {
        if strokes.is_empty() {
            return Ok(base.clone());
        }

        let (width, height) = base.dimensions();
        if width == 0 || height == 0 {
            return Err(RasterError::EmptyImage { width, height });
        }

        // Strokes are painted on a transparent layer first so pixels they
        // don't touch keep their exact original value.
        let mut overlay = Pixmap::new(width, height).ok_or(RasterError::SurfaceAllocation { width, height })?;
        let style = tiny_skia::Stroke {
            width: stroke_width as f32,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Default::default()
        };

        for stroke in strokes {
            paint_stroke(&mut overlay, stroke, &style);
        }

        Ok(composite_over(base, &overlay))
    }
}

/// Flatten with the default CPU rasterizer.
pub fn flatten(base: &RgbaImage, strokes: &[Stroke], stroke_width: f64) -> RasterResult<RgbaImage> {
    CpuRasterizer.flatten(base, strokes, stroke_width)
}

fn paint_stroke(overlay: &mut Pixmap, stroke: &Stroke, style: &tiny_skia::Stroke) {
    let color = stroke.color();
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;

    if stroke.is_dot() {
        let center = stroke.points()[0];
        let radius = style.width / 2.0;
        if let Some(dot) = PathBuilder::from_circle(center.x() as f32, center.y() as f32, radius) {
            overlay.fill_path(&dot, &paint, FillRule::Winding, Transform::identity(), None);
        }
        return;
    }

    if let Some(path) = to_skia_path(&stroke.to_path()) {
        overlay.stroke_path(&path, &paint, style, Transform::identity(), None);
    }
}

fn to_skia_path(path: &kurbo::BezPath) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => pb.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => pb.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(c, p) => pb.quad_to(c.x as f32, c.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(c1, c2, p) => pb.cubic_to(
                c1.x as f32,
                c1.y as f32,
                c2.x as f32,
                c2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => pb.close(),
        }
    }
    pb.finish()
}

/// Source-over composite of a premultiplied overlay onto a straight-alpha image.
fn composite_over(base: &RgbaImage, overlay: &Pixmap) -> RgbaImage {
    let mut out = base.clone();
    for (dst, src) in out.pixels_mut().zip(overlay.pixels()) {
        let src_alpha = src.alpha();
        if src_alpha == 0 {
            continue;
        }
        if src_alpha == 255 {
            *dst = Rgba([src.red(), src.green(), src.blue(), 255]);
            continue;
        }

        let sa = f32::from(src_alpha) / 255.0;
        let da = f32::from(dst[3]) / 255.0;
        let out_alpha = sa + da * (1.0 - sa);
        let channel = |s: u8, d: u8| {
            let premul = f32::from(s) / 255.0 + f32::from(d) / 255.0 * da * (1.0 - sa);
            to_u8(premul / out_alpha)
        };
        *dst = Rgba([
            channel(src.red(), dst[0]),
            channel(src.green(), dst[1]),
            channel(src.blue(), dst[2]),
            to_u8(out_alpha),
        ]);
    }
    out
}

fn to_u8(unit: f32) -> u8 {
    (unit * 255.0).round().clamp(0.0, 255.0) as u8
}
