//! InkBake Core Library
//!
//! Freehand annotation over a raster image: drag gestures become strokes or
//! pan updates, and finished strokes are flattened into the image.

pub mod config;
pub mod engine;
pub mod geometry;
pub mod raster;
pub mod session;
pub mod stroke;
pub mod viewport;

pub use config::{ConfigError, SessionConfig};
pub use engine::{DragEffect, DragEnd, DrawingEngine, GestureState, InputMode};
pub use geometry::{ImagePoint, ScreenPoint, image_to_screen, screen_to_image};
pub use raster::{CpuRasterizer, RasterError, Rasterizer, flatten};
pub use session::{EditingSession, FinishHandle, SessionEvent, SessionOutcome};
pub use stroke::{Stroke, StrokeColor, StrokeList};
pub use viewport::{Viewport, calculate_initial_scale};
