//! Editing session: the image, its strokes and the viewport in one place.

use crate::config::SessionConfig;
use crate::engine::{DragEffect, DragEnd, DrawingEngine, GestureState, InputMode};
use crate::geometry::ScreenPoint;
use crate::raster::{CpuRasterizer, Rasterizer};
use crate::stroke::{StrokeColor, StrokeList};
use crate::viewport::Viewport;
use image::RgbaImage;
use kurbo::{Size, Vec2};
use std::sync::mpsc::{Receiver, Sender, channel};

/// Notifications queued by every state change. Drain with
/// [`EditingSession::poll_events`] and re-read whatever state they name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    StrokesChanged,
    ImageChanged,
    ViewportChanged,
    ModeChanged,
    ColorChanged,
    /// The session was finished or cancelled and should be dismissed.
    Dismissed,
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// The user accepted the edit; carries the final image.
    Finished(RgbaImage),
    Cancelled,
}

/// Receiving end of a session's completion. Resolves exactly once.
#[derive(Debug)]
pub struct FinishHandle {
    rx: Receiver<SessionOutcome>,
}

impl FinishHandle {
    /// Take the outcome if the session has ended.
    pub fn try_outcome(&self) -> Option<SessionOutcome> {
        self.rx.try_recv().ok()
    }

    /// Block until the session ends. Returns `None` if it was dropped first.
    pub fn wait(self) -> Option<SessionOutcome> {
        self.rx.recv().ok()
    }
}

/// An open annotation session over one image.
pub struct EditingSession {
    original: RgbaImage,
    image: RgbaImage,
    strokes: StrokeList,
    viewport: Viewport,
    viewport_size: Size,
    engine: DrawingEngine,
    config: SessionConfig,
    rasterizer: Box<dyn Rasterizer>,
    finish_tx: Option<Sender<SessionOutcome>>,
    events: Vec<SessionEvent>,
}

impl std::fmt::Debug for EditingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditingSession")
            .field("image", &self.image.dimensions())
            .field("strokes", &self.strokes.len())
            .field("viewport", &self.viewport)
            .field("engine", &self.engine)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl EditingSession {
    /// Open a session over `image`, fitted to `viewport_size`.
    pub fn create(image: RgbaImage, viewport_size: Size, config: SessionConfig) -> (Self, FinishHandle) {
        Self::with_rasterizer(image, viewport_size, config, Box::new(CpuRasterizer))
    }

    /// Open a session that flattens with a custom rasterizer.
    pub fn with_rasterizer(
        image: RgbaImage,
        viewport_size: Size,
        config: SessionConfig,
        rasterizer: Box<dyn Rasterizer>,
    ) -> (Self, FinishHandle) {
        let (tx, rx) = channel();
        let mut viewport = Viewport::new(config.zoom_step, config.min_scale);
        viewport.reset(viewport_size, image_size(&image));
        log::info!(
            "Session opened on {}x{} image, scale {:.3}",
            image.width(),
            image.height(),
            viewport.scale()
        );

        let session = Self {
            image: image.clone(),
            original: image,
            strokes: StrokeList::new(),
            viewport,
            viewport_size,
            engine: DrawingEngine::new(config.initial_color),
            config,
            rasterizer,
            finish_tx: Some(tx),
            events: Vec::new(),
        };
        (session, FinishHandle { rx })
    }

    // --- Observable state ---

    /// The current flattened image.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// The image the session was opened with.
    pub fn original_image(&self) -> &RgbaImage {
        &self.original
    }

    /// Strokes not yet flattened, for the live overlay.
    pub fn strokes(&self) -> &StrokeList {
        &self.strokes
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn offset(&self) -> Vec2 {
        self.viewport.offset()
    }

    pub fn scale(&self) -> f64 {
        self.viewport.scale()
    }

    pub fn is_panning(&self) -> bool {
        self.engine.is_panning()
    }

    pub fn mode(&self) -> InputMode {
        self.engine.mode()
    }

    pub fn gesture_state(&self) -> GestureState {
        self.engine.state()
    }

    pub fn color(&self) -> StrokeColor {
        self.engine.color()
    }

    /// Whether color/mode controls should be enabled in the host UI.
    pub fn controls_enabled(&self) -> bool {
        !self.is_closed() && self.engine.controls_enabled()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// True once the session has been finished or cancelled.
    pub fn is_closed(&self) -> bool {
        self.finish_tx.is_none()
    }

    /// Drain pending change notifications.
    pub fn poll_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    // --- Gesture input ---

    /// Pointer moved during a drag. `translation` is relative to the drag start.
    pub fn drag_changed(&mut self, position: ScreenPoint, translation: Vec2) {
        if !self.ensure_open("drag") {
            return;
        }
        let effect = self
            .engine
            .drag_changed(position, translation, &mut self.strokes, &mut self.viewport);
        self.emit(match effect {
            DragEffect::Panned => SessionEvent::ViewportChanged,
            _ => SessionEvent::StrokesChanged,
        });
    }

    /// Pointer released.
    pub fn drag_ended(&mut self) {
        if !self.ensure_open("drag end") {
            return;
        }
        match self.engine.drag_ended(&mut self.viewport) {
            DragEnd::Flatten => self.flatten(),
            DragEnd::PanCommitted => self.emit(SessionEvent::ViewportChanged),
            DragEnd::Ignored => {}
        }
    }

    // --- Controls ---

    /// Select the color for subsequent strokes. Returns false if rejected.
    pub fn set_color(&mut self, color: StrokeColor) -> bool {
        if !self.ensure_open("set color") || !self.engine.set_color(color) {
            return false;
        }
        self.emit(SessionEvent::ColorChanged);
        true
    }

    /// Toggle pan mode. Returns false if rejected.
    pub fn set_pan_mode(&mut self, panning: bool) -> bool {
        let mode = if panning { InputMode::Pan } else { InputMode::Draw };
        if !self.ensure_open("set pan mode") || !self.engine.set_mode(mode) {
            return false;
        }
        self.emit(SessionEvent::ModeChanged);
        true
    }

    pub fn zoom_in(&mut self) {
        if self.ensure_open("zoom in") {
            self.viewport.zoom_in();
            self.emit(SessionEvent::ViewportChanged);
        }
    }

    pub fn zoom_out(&mut self) {
        if self.ensure_open("zoom out") {
            self.viewport.zoom_out();
            self.emit(SessionEvent::ViewportChanged);
        }
    }

    /// The host's drawing area changed size; refit the image.
    ///
    /// Mid-gesture only the scale is refit so an ongoing pan keeps its baseline.
    pub fn set_viewport_size(&mut self, viewport_size: Size) {
        if !self.ensure_open("resize") {
            return;
        }
        self.viewport_size = viewport_size;
        if self.engine.controls_enabled() {
            self.viewport.reset(viewport_size, image_size(&self.image));
        } else {
            self.viewport.fit_scale(viewport_size, image_size(&self.image));
        }
        self.emit(SessionEvent::ViewportChanged);
    }

    /// Drop every stroke and restore the original image and fit.
    pub fn clear(&mut self) {
        if !self.ensure_open("clear") {
            return;
        }
        self.engine.reset_gesture();
        self.strokes.clear();
        self.image = self.original.clone();
        self.viewport.reset(self.viewport_size, image_size(&self.original));
        log::info!("Session cleared");
        self.emit(SessionEvent::StrokesChanged);
        self.emit(SessionEvent::ImageChanged);
        self.emit(SessionEvent::ViewportChanged);
    }

    /// Hand the current image to the finish handle, then dismiss.
    pub fn finish(&mut self) {
        let Some(tx) = self.finish_tx.take() else {
            log::warn!("Ignoring finish on a closed session");
            return;
        };
        log::info!("Session finished with {} unflattened strokes", self.strokes.len());
        if tx.send(SessionOutcome::Finished(self.image.clone())).is_err() {
            log::warn!("Finish handle was dropped; final image discarded");
        }
        self.emit(SessionEvent::Dismissed);
    }

    /// Dismiss without delivering an image.
    pub fn cancel(&mut self) {
        let Some(tx) = self.finish_tx.take() else {
            log::warn!("Ignoring cancel on a closed session");
            return;
        };
        log::info!("Session cancelled");
        if tx.send(SessionOutcome::Cancelled).is_err() {
            log::warn!("Finish handle was dropped; cancellation not delivered");
        }
        self.emit(SessionEvent::Dismissed);
    }

    /// Bake the strokes into the image. On failure both are left untouched.
    fn flatten(&mut self) {
        let count = self.strokes.len();
        match self
            .rasterizer
            .flatten(&self.image, self.strokes.strokes(), self.config.stroke_width)
        {
            Ok(image) => {
                self.image = image;
                self.strokes.clear();
                log::info!("Flattened {} strokes", count);
                self.emit(SessionEvent::ImageChanged);
                self.emit(SessionEvent::StrokesChanged);
            }
            Err(e) => log::error!("Flatten failed, keeping {} strokes: {}", count, e),
        }
    }

    fn ensure_open(&self, action: &str) -> bool {
        if self.is_closed() {
            log::warn!("Ignoring {} on a closed session", action);
            return false;
        }
        true
    }

    /// Queue `event` unless it is already pending.
    fn emit(&mut self, event: SessionEvent) {
        if !self.events.contains(&event) {
            self.events.push(event);
        }
    }
}

fn image_size(image: &RgbaImage) -> Size {
    Size::new(f64::from(image.width()), f64::from(image.height()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{RasterError, RasterResult};
    use crate::stroke::Stroke;
    use image::Rgba;
    use std::cell::Cell;
    use std::rc::Rc;

    const VIEWPORT: Size = Size::new(800.0, 600.0);

    fn test_image() -> RgbaImage {
        RgbaImage::from_fn(64, 48, |x, y| Rgba([(x * 3) as u8, (y * 5) as u8, 90, 255]))
    }

    fn open() -> (EditingSession, FinishHandle) {
        EditingSession::create(test_image(), VIEWPORT, SessionConfig::default())
    }

    fn stroke(session: &mut EditingSession, points: &[(f64, f64)]) {
        let start = points[0];
        for &(x, y) in points {
            session.drag_changed(ScreenPoint::new(x, y), Vec2::new(x - start.0, y - start.1));
        }
        session.drag_ended();
    }

    /// Counts calls and delegates to the CPU rasterizer.
    struct CountingRasterizer(Rc<Cell<usize>>);

    impl Rasterizer for CountingRasterizer {
        fn flatten(&self, base: &RgbaImage, strokes: &[Stroke], width: f64) -> RasterResult<RgbaImage> {
            self.0.set(self.0.get() + 1);
            CpuRasterizer.flatten(base, strokes, width)
        }
    }

    struct FailingRasterizer;

    impl Rasterizer for FailingRasterizer {
        fn flatten(&self, base: &RgbaImage, _: &[Stroke], _: f64) -> RasterResult<RgbaImage> {
            Err(RasterError::SurfaceAllocation {
                width: base.width(),
                height: base.height(),
            })
        }
    }

    #[test]
    fn test_create_fits_image() {
        let (session, handle) = EditingSession::create(
            RgbaImage::new(1600, 600),
            Size::new(800.0, 600.0),
            SessionConfig::default(),
        );
        assert!((session.scale() - 0.5).abs() < f64::EPSILON);
        assert_eq!(session.offset(), Vec2::ZERO);
        assert!(session.strokes().is_empty());
        assert!(handle.try_outcome().is_none());
    }

    #[test]
    fn test_stroke_is_flattened_on_drag_end() {
        let (mut session, _handle) = open();
        stroke(&mut session, &[(10.0, 10.0), (30.0, 10.0), (30.0, 30.0)]);

        assert!(session.strokes().is_empty());
        assert_ne!(session.image(), session.original_image());
        assert_eq!(session.gesture_state(), GestureState::Idle);
    }

    #[test]
    fn test_live_strokes_visible_before_drag_end() {
        let (mut session, _handle) = open();
        session.drag_changed(ScreenPoint::new(5.0, 5.0), Vec2::ZERO);
        for i in 1..=4 {
            let t = Vec2::new(f64::from(i), 0.0);
            session.drag_changed(ScreenPoint::new(5.0 + t.x, 5.0), t);
        }
        assert_eq!(session.strokes().len(), 1);
        assert_eq!(session.strokes().last().unwrap().len(), 5);
        assert_eq!(session.image(), session.original_image());
    }

    #[test]
    fn test_tap_creates_one_point_stroke_and_one_flatten() {
        let calls = Rc::new(Cell::new(0));
        let (mut session, _handle) = EditingSession::with_rasterizer(
            test_image(),
            VIEWPORT,
            SessionConfig::default(),
            Box::new(CountingRasterizer(calls.clone())),
        );

        session.drag_changed(ScreenPoint::new(20.0, 20.0), Vec2::ZERO);
        assert_eq!(session.strokes().len(), 1);
        assert_eq!(session.strokes().strokes()[0].len(), 1);

        session.drag_ended();
        assert_eq!(calls.get(), 1);
        assert!(session.strokes().is_empty());
        assert_eq!(*session.image().get_pixel(20, 20), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_pan_mode_never_touches_strokes() {
        let calls = Rc::new(Cell::new(0));
        let (mut session, _handle) = EditingSession::with_rasterizer(
            test_image(),
            VIEWPORT,
            SessionConfig::default(),
            Box::new(CountingRasterizer(calls.clone())),
        );
        assert!(session.set_pan_mode(true));

        stroke(&mut session, &[(0.0, 0.0), (10.0, 5.0), (20.0, 10.0)]);
        assert!(session.strokes().is_empty());
        assert_eq!(calls.get(), 0);
        assert_eq!(session.image(), session.original_image());
        assert_eq!(session.offset(), Vec2::new(20.0, 10.0));
    }

    #[test]
    fn test_pan_commit_law() {
        let (mut session, _handle) = open();
        session.set_pan_mode(true);
        stroke(&mut session, &[(0.0, 0.0), (15.0, -5.0)]);
        stroke(&mut session, &[(100.0, 100.0), (100.0, 100.0)]);
        assert_eq!(session.offset(), Vec2::new(15.0, -5.0));
        stroke(&mut session, &[(0.0, 0.0), (5.0, 5.0)]);
        assert_eq!(session.offset(), Vec2::new(20.0, 0.0));
    }

    #[test]
    fn test_drawing_after_pan_is_offset_corrected() {
        let (mut session, _handle) = open();
        session.set_pan_mode(true);
        stroke(&mut session, &[(0.0, 0.0), (10.0, 10.0)]);
        session.set_pan_mode(false);

        session.drag_changed(ScreenPoint::new(30.0, 30.0), Vec2::ZERO);
        let start = session.strokes().strokes()[0].points()[0];
        assert!((start.x() - 20.0).abs() < f64::EPSILON);
        assert!((start.y() - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_failed_flatten_keeps_strokes_and_image() {
        let (mut session, _handle) = EditingSession::with_rasterizer(
            test_image(),
            VIEWPORT,
            SessionConfig::default(),
            Box::new(FailingRasterizer),
        );
        stroke(&mut session, &[(1.0, 1.0), (8.0, 8.0)]);

        assert_eq!(session.strokes().len(), 1);
        assert_eq!(session.strokes().point_count(), 2);
        assert_eq!(session.image(), session.original_image());
        assert_eq!(session.gesture_state(), GestureState::Idle);
    }

    #[test]
    fn test_failed_strokes_flatten_with_next_gesture() {
        let (mut session, _handle) = EditingSession::with_rasterizer(
            RgbaImage::new(0, 0),
            VIEWPORT,
            SessionConfig::default(),
            Box::new(CpuRasterizer),
        );
        stroke(&mut session, &[(1.0, 1.0)]);
        stroke(&mut session, &[(2.0, 2.0)]);
        assert_eq!(session.strokes().len(), 2);
    }

    #[test]
    fn test_clear_restores_original() {
        let (mut session, _handle) = open();
        stroke(&mut session, &[(10.0, 10.0), (40.0, 40.0)]);
        session.zoom_in();
        session.zoom_in();
        session.set_pan_mode(true);
        stroke(&mut session, &[(0.0, 0.0), (7.0, 9.0)]);
        session.set_pan_mode(false);
        session.drag_changed(ScreenPoint::new(3.0, 3.0), Vec2::ZERO);

        session.clear();

        assert_eq!(session.image(), &test_image());
        assert!(session.strokes().is_empty());
        assert_eq!(session.offset(), Vec2::ZERO);
        assert_eq!(session.viewport().last_offset(), Vec2::ZERO);
        let fit = crate::viewport::calculate_initial_scale(VIEWPORT, Size::new(64.0, 48.0));
        assert!((session.scale() - fit).abs() < f64::EPSILON);
        assert_eq!(session.gesture_state(), GestureState::Idle);
    }

    #[test]
    fn test_zoom_floor() {
        let (mut session, _handle) = open();
        for _ in 0..500 {
            session.zoom_out();
        }
        assert!((session.scale() - session.config().min_scale).abs() < f64::EPSILON);
    }

    #[test]
    fn test_controls_locked_mid_gesture() {
        let (mut session, _handle) = open();
        session.drag_changed(ScreenPoint::new(1.0, 1.0), Vec2::ZERO);
        assert!(!session.controls_enabled());
        assert!(!session.set_color(StrokeColor::RED));
        assert!(!session.set_pan_mode(true));
        session.drag_ended();
        assert!(session.controls_enabled());
        assert!(session.set_color(StrokeColor::RED));
        assert_eq!(session.color(), StrokeColor::RED);
    }

    #[test]
    fn test_finish_delivers_image_once() {
        let (mut session, handle) = open();
        stroke(&mut session, &[(5.0, 5.0), (20.0, 5.0)]);
        let expected = session.image().clone();

        session.finish();
        session.finish();
        session.cancel();

        assert_eq!(handle.try_outcome(), Some(SessionOutcome::Finished(expected)));
        assert_eq!(handle.try_outcome(), None);
        assert!(session.is_closed());
    }

    #[test]
    fn test_finish_then_dismissed_event() {
        let (mut session, handle) = open();
        session.poll_events();
        session.finish();
        assert_eq!(session.poll_events(), vec![SessionEvent::Dismissed]);
        assert!(matches!(handle.wait(), Some(SessionOutcome::Finished(_))));
    }

    #[test]
    fn test_cancel_delivers_no_image() {
        let (mut session, handle) = open();
        stroke(&mut session, &[(5.0, 5.0)]);
        session.cancel();
        assert_eq!(handle.try_outcome(), Some(SessionOutcome::Cancelled));
        assert_eq!(session.poll_events().last(), Some(&SessionEvent::Dismissed));
    }

    #[test]
    fn test_closed_session_ignores_input() {
        let (mut session, _handle) = open();
        session.cancel();
        session.drag_changed(ScreenPoint::new(1.0, 1.0), Vec2::ZERO);
        session.drag_ended();
        session.zoom_in();
        assert!(!session.set_color(StrokeColor::BLUE));
        assert!(session.strokes().is_empty());
        assert_eq!(session.image(), session.original_image());
    }

    #[test]
    fn test_dropped_session_resolves_handle_to_none() {
        let (session, handle) = open();
        drop(session);
        assert_eq!(handle.wait(), None);
    }

    #[test]
    fn test_events_reflect_changes() {
        let (mut session, _handle) = open();
        session.drag_changed(ScreenPoint::new(1.0, 1.0), Vec2::ZERO);
        session.drag_changed(ScreenPoint::new(2.0, 1.0), Vec2::new(1.0, 0.0));
        assert_eq!(session.poll_events(), vec![SessionEvent::StrokesChanged]);

        session.drag_ended();
        assert_eq!(
            session.poll_events(),
            vec![SessionEvent::ImageChanged, SessionEvent::StrokesChanged]
        );

        session.set_pan_mode(true);
        session.zoom_in();
        assert_eq!(
            session.poll_events(),
            vec![SessionEvent::ModeChanged, SessionEvent::ViewportChanged]
        );
        assert!(session.poll_events().is_empty());
    }

    #[test]
    fn test_event_queue_is_bounded_without_polling() {
        let (mut session, _handle) = open();
        for i in 0..1000 {
            let at = f64::from(i % 40);
            stroke(&mut session, &[(at, at), (at + 1.0, at)]);
            session.zoom_in();
            session.set_color(StrokeColor::PALETTE[i as usize % 8]);
        }
        let events = session.poll_events();
        assert!(events.len() <= 6, "queued {} events", events.len());
        assert!(events.contains(&SessionEvent::ImageChanged));
        assert!(events.contains(&SessionEvent::StrokesChanged));
    }

    #[test]
    fn test_cancel_with_dropped_handle_still_closes() {
        let (mut session, handle) = open();
        drop(handle);
        session.cancel();
        assert!(session.is_closed());
        assert_eq!(session.poll_events(), vec![SessionEvent::Dismissed]);
    }

    #[test]
    fn test_resize_mid_pan_keeps_offsets() {
        let (mut session, _handle) = open();
        session.set_pan_mode(true);
        stroke(&mut session, &[(0.0, 0.0), (20.0, 10.0)]);

        session.drag_changed(ScreenPoint::new(0.0, 0.0), Vec2::ZERO);
        session.drag_changed(ScreenPoint::new(5.0, 5.0), Vec2::new(5.0, 5.0));
        session.set_viewport_size(Size::new(128.0, 48.0));

        assert_eq!(session.offset(), Vec2::new(25.0, 15.0));
        assert_eq!(session.viewport().last_offset(), Vec2::new(20.0, 10.0));
        assert!((session.scale() - 1.0).abs() < f64::EPSILON);

        session.drag_changed(ScreenPoint::new(6.0, 6.0), Vec2::new(6.0, 6.0));
        assert_eq!(session.offset(), Vec2::new(26.0, 16.0));
        session.drag_ended();
        assert_eq!(session.viewport().last_offset(), Vec2::new(26.0, 16.0));
    }

    #[test]
    fn test_resize_refits() {
        let (mut session, _handle) = open();
        session.set_viewport_size(Size::new(128.0, 48.0));
        assert!((session.scale() - 1.0).abs() < f64::EPSILON);
    }
}
