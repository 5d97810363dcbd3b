//! Editing session: routes input to stroke capture and the gesture
//! controller, applies the crop clamp, and owns the stroke list.
//!
//! Handlers return a list of [`Action`]s for the host to process, the same
//! way for every input source. Invalid input is logged at debug level and
//! ignored without touching state.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use std::rc::Rc;

use tracing::{debug, info};

use crate::capture::{Brush, StrokeCapture};
use crate::consts::{DEFAULT_BRUSH_WIDTH, MIN_POINT_DISTANCE, MIN_SCALE, WHEEL_ZOOM_SENSITIVITY};
use crate::crop::CropFrame;
use crate::error::MaskError;
use crate::geometry::{OverlayPieces, Rect};
use crate::gesture::{GestureController, GestureSettings};
use crate::input::{CaptureHost, InputError, PointerEvent, PointerId, SurfaceGeometry, WheelDelta};
use crate::raster::{MaskMode, MaskRequest, PixelSize};
use crate::stroke::{Stroke, StrokeError, StrokeVisibility};
use crate::transform::{Point, ViewTransform};

/// Tuning for one editing session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    pub min_scale: f64,
    pub wheel_sensitivity: f64,
    pub min_point_distance: f64,
    pub default_brush_width: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            min_scale: MIN_SCALE,
            wheel_sensitivity: WHEEL_ZOOM_SENSITIVITY,
            min_point_distance: MIN_POINT_DISTANCE,
            default_brush_width: DEFAULT_BRUSH_WIDTH,
        }
    }
}

/// What a single pointer does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    /// One pointer pans, two pinch.
    #[default]
    Transform,
    /// One pointer draws, two pinch (cancelling the stroke).
    Brush,
}

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    TransformChanged(ViewTransform),
    /// The in-progress stroke grew or started.
    StrokeUpdated,
    StrokeCommitted(Stroke),
    /// The open stroke was dropped (too short, cancelled, or interrupted).
    StrokeDiscarded,
    RenderNeeded,
}

/// Core engine state for one editing session.
pub struct EngineCore {
    transform: ViewTransform,
    gesture: GestureController,
    capture: StrokeCapture,
    strokes: Vec<Stroke>,
    crop: Option<CropFrame>,
    viewport: SurfaceGeometry,
    surface: SurfaceGeometry,
    drawing_pointer: Option<PointerId>,
    mode: EditMode,
    settings: EngineSettings,
}

impl Default for EngineCore {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}

impl EngineCore {
    #[must_use]
    pub fn new(settings: EngineSettings) -> Self {
        Self::build(settings, GestureController::new(gesture_settings(&settings)))
    }

    /// Engine whose tracked pointers hold capture through `host`.
    #[must_use]
    pub fn with_capture(settings: EngineSettings, host: Rc<dyn CaptureHost>) -> Self {
        Self::build(settings, GestureController::with_capture(gesture_settings(&settings), host))
    }

    fn build(settings: EngineSettings, gesture: GestureController) -> Self {
        let mut capture = StrokeCapture::new(settings.min_point_distance);
        let brush = Brush { width: settings.default_brush_width, ..Brush::default() };
        if let Err(error) = capture.set_brush(brush) {
            debug!(%error, "engine: default brush rejected, keeping built-in brush");
        }
        Self {
            transform: ViewTransform::default(),
            gesture,
            capture,
            strokes: Vec::new(),
            crop: None,
            viewport: SurfaceGeometry::default(),
            surface: SurfaceGeometry::default(),
            drawing_pointer: None,
            mode: EditMode::Transform,
            settings,
        }
    }

    // --- Layout ---

    /// Client rectangle of the viewport element; gestures are measured from its center.
    pub fn set_viewport(&mut self, element: Rect) {
        self.viewport = SurfaceGeometry::new(element, element.width, element.height);
    }

    /// Where the drawing surface is shown and its pixel size. Strokes are
    /// recorded in surface pixels.
    pub fn set_surface(&mut self, surface: SurfaceGeometry) {
        self.surface = surface;
    }

    // --- Mode / brush ---

    pub fn set_mode(&mut self, mode: EditMode) -> Vec<Action> {
        if self.mode == mode {
            return Vec::new();
        }
        info!(?mode, "engine: edit mode changed");
        let was_drawing = self.capture.is_open();
        self.mode = mode;
        self.drawing_pointer = None;
        self.capture.set_enabled(mode == EditMode::Brush);
        self.gesture.set_pan_enabled(mode == EditMode::Transform, &self.transform);
        if was_drawing {
            vec![Action::StrokeDiscarded, Action::RenderNeeded]
        } else {
            Vec::new()
        }
    }

    /// Brush for the next stroke.
    ///
    /// # Errors
    ///
    /// Rejects a color brush without a color, a selection brush with one, and
    /// non-positive widths.
    pub fn set_brush(&mut self, brush: Brush) -> Result<(), StrokeError> {
        self.capture.set_brush(brush)
    }

    // --- Pointer input ---

    pub fn on_pointer_down(&mut self, event: PointerEvent) -> Vec<Action> {
        let position = match self.viewport.to_viewport(event.client) {
            Ok(p) => p,
            Err(error) => return ignored(event.id, &error),
        };
        if let Err(error) = self.gesture.pointer_down(event.id, position, &self.transform) {
            return ignored(event.id, &error);
        }

        if self.mode != EditMode::Brush {
            return Vec::new();
        }
        if self.gesture.is_pinching() {
            return self.interrupt_stroke();
        }
        if self.drawing_pointer.is_some() {
            return Vec::new();
        }
        let point = match self.surface.to_surface(event.client, event.timestamp) {
            Ok(p) => p,
            Err(error) => return ignored(event.id, &error),
        };
        match self.capture.begin(point) {
            Ok(()) => {
                self.drawing_pointer = Some(event.id);
                vec![Action::StrokeUpdated, Action::RenderNeeded]
            }
            Err(error) => {
                debug!(pointer = event.id, %error, "engine: stroke not started");
                Vec::new()
            }
        }
    }

    pub fn on_pointer_move(&mut self, event: PointerEvent) -> Vec<Action> {
        let position = match self.viewport.to_viewport(event.client) {
            Ok(p) => p,
            Err(error) => return ignored(event.id, &error),
        };
        let mut actions = match self.gesture.pointer_move(event.id, position) {
            Ok(Some(next)) => self.apply_transform(next),
            Ok(None) => Vec::new(),
            Err(error) => return ignored(event.id, &error),
        };

        if self.drawing_pointer == Some(event.id) {
            match self.surface.to_surface(event.client, event.timestamp) {
                Ok(point) => match self.capture.extend(point) {
                    Ok(true) => actions.extend([Action::StrokeUpdated, Action::RenderNeeded]),
                    Ok(false) => {}
                    Err(error) => debug!(pointer = event.id, %error, "engine: stroke point rejected"),
                },
                Err(error) => debug!(pointer = event.id, %error, "engine: stroke point dropped"),
            }
        }
        actions
    }

    pub fn on_pointer_up(&mut self, id: PointerId) -> Vec<Action> {
        self.release_pointer(id)
    }

    pub fn on_pointer_cancel(&mut self, id: PointerId) -> Vec<Action> {
        self.release_pointer(id)
    }

    /// The host lost capture for `id` (device gone, element hidden).
    pub fn on_lost_capture(&mut self, id: PointerId) -> Vec<Action> {
        self.release_pointer(id)
    }

    fn release_pointer(&mut self, id: PointerId) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.drawing_pointer == Some(id) {
            self.drawing_pointer = None;
            match self.capture.end() {
                Some(stroke) => {
                    debug!(points = stroke.points().len(), kind = ?stroke.kind(), "engine: stroke committed");
                    self.strokes.push(stroke.clone());
                    actions.push(Action::StrokeCommitted(stroke));
                }
                None => actions.push(Action::StrokeDiscarded),
            }
            actions.push(Action::RenderNeeded);
        }
        self.gesture.pointer_up(id, &self.transform);
        actions
    }

    fn interrupt_stroke(&mut self) -> Vec<Action> {
        self.drawing_pointer = None;
        if !self.capture.is_open() {
            return Vec::new();
        }
        self.capture.cancel();
        debug!("engine: second pointer interrupted stroke");
        vec![Action::StrokeDiscarded, Action::RenderNeeded]
    }

    pub fn on_wheel(&mut self, client: Point, delta: WheelDelta) -> Vec<Action> {
        let anchor = match self.viewport.to_viewport(client) {
            Ok(p) => p,
            Err(error) => {
                debug!(%error, "engine: ignored wheel event");
                return Vec::new();
            }
        };
        match self.gesture.wheel(anchor, delta.dy, &self.transform) {
            Some(next) => self.apply_transform(next),
            None => Vec::new(),
        }
    }

    // --- Transform controls ---

    fn apply_transform(&mut self, next: ViewTransform) -> Vec<Action> {
        let floored = next.with_scale_floor(self.settings.min_scale);
        let clamped = match &self.crop {
            Some(frame) => frame.apply(floored),
            None => floored,
        };
        if clamped == self.transform {
            return Vec::new();
        }
        self.transform = clamped;
        vec![Action::TransformChanged(clamped), Action::RenderNeeded]
    }

    pub fn set_rotation(&mut self, degrees: f64) -> Vec<Action> {
        self.apply_transform(self.transform.with_rotation(degrees))
    }

    pub fn rotate_by(&mut self, degrees: f64) -> Vec<Action> {
        self.apply_transform(self.transform.rotated_by(degrees))
    }

    /// Zoom about the viewport center.
    pub fn set_scale(&mut self, scale: f64) -> Vec<Action> {
        self.apply_transform(self.transform.rescaled_about(Point::default(), scale))
    }

    pub fn flip_x(&mut self) -> Vec<Action> {
        self.apply_transform(self.transform.flipped_x())
    }

    pub fn flip_y(&mut self) -> Vec<Action> {
        self.apply_transform(self.transform.flipped_y())
    }

    pub fn reset_transform(&mut self) -> Vec<Action> {
        self.apply_transform(ViewTransform::default())
    }

    // --- Crop ---

    /// Start or end a crop interaction. While active, every transform change
    /// goes through the frame's cover-scale floor and translation clamp.
    pub fn set_crop(&mut self, frame: Option<CropFrame>) -> Vec<Action> {
        self.crop = frame;
        self.apply_transform(self.transform)
    }

    /// Move the crop rectangle of the active crop interaction.
    pub fn set_crop_rect(&mut self, rect: Rect) -> Vec<Action> {
        let Some(frame) = self.crop.as_mut() else {
            debug!("engine: crop rectangle set without an active crop");
            return Vec::new();
        };
        let next = frame.set_crop(rect, self.transform);
        self.apply_transform(next)
    }

    #[must_use]
    pub fn crop_overlay(&self) -> Option<OverlayPieces> {
        self.crop.as_ref().map(CropFrame::overlay)
    }

    // --- Strokes ---

    pub fn clear_strokes(&mut self) -> Vec<Action> {
        if self.strokes.is_empty() {
            return Vec::new();
        }
        self.strokes.clear();
        vec![Action::RenderNeeded]
    }

    /// Owned snapshot of the strokes for rasterization off the input thread.
    ///
    /// # Errors
    ///
    /// [`MaskError::InvalidDimension`] when no valid surface size has been set.
    pub fn mask_request(&self, mode: MaskMode, target: PixelSize) -> Result<MaskRequest, MaskError> {
        let source = PixelSize::from_f64(self.surface.pixel_width, self.surface.pixel_height)?;
        Ok(MaskRequest { strokes: self.strokes.clone(), source, target, mode })
    }

    /// Drop every pointer and any open stroke, releasing all captures.
    pub fn teardown(&mut self) {
        self.gesture.reset();
        self.capture.cancel();
        self.drawing_pointer = None;
    }

    // --- Queries ---

    #[must_use]
    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    #[must_use]
    pub fn mode(&self) -> EditMode {
        self.mode
    }

    #[must_use]
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Committed strokes the live preview should draw.
    pub fn preview_strokes(&self, visibility: StrokeVisibility) -> impl Iterator<Item = &Stroke> {
        self.strokes.iter().filter(move |s| visibility.shows(s.kind()))
    }

    #[must_use]
    pub fn in_progress(&self) -> Option<&Stroke> {
        self.capture.in_progress()
    }

    #[must_use]
    pub fn crop(&self) -> Option<&CropFrame> {
        self.crop.as_ref()
    }
}

fn gesture_settings(settings: &EngineSettings) -> GestureSettings {
    GestureSettings { min_scale: settings.min_scale, wheel_sensitivity: settings.wheel_sensitivity }
}

fn ignored(id: PointerId, error: &InputError) -> Vec<Action> {
    debug!(pointer = id, %error, "engine: ignored pointer event");
    Vec::new()
}
