//! Stroke capture: turns a pointer stream into denoised [`Stroke`] records.
//!
//! Capture only thins points by distance; smoothing happens at render time.
//! One stroke can be open at a time. A second `begin` while a stroke is open
//! is ignored rather than closing the first.

#[cfg(test)]
#[path = "capture_test.rs"]
mod capture_test;

use tracing::debug;

use crate::consts::{DEFAULT_BRUSH_WIDTH, MIN_POINT_DISTANCE};
use crate::stroke::{Rgba, Stroke, StrokeError, StrokeKind, StrokePoint, validate_brush};

/// Why a capture call did nothing.
///
/// These are expected during normal mode switches; callers usually log and move on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    #[error("stroke capture is disabled")]
    Disabled,
    #[error("a stroke is already open")]
    AlreadyOpen,
    #[error("no stroke is open")]
    NotOpen,
}

/// Kind, color and width applied to the next stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brush {
    pub kind: StrokeKind,
    pub color: Option<Rgba>,
    pub width: f64,
}

impl Default for Brush {
    fn default() -> Self {
        Self { kind: StrokeKind::Add, color: None, width: DEFAULT_BRUSH_WIDTH }
    }
}

type StrokeListener = Box<dyn FnMut(&Stroke)>;

/// Pointer-to-stroke recorder.
pub struct StrokeCapture {
    enabled: bool,
    min_distance: f64,
    brush: Brush,
    open: Option<Stroke>,
    on_update: Option<StrokeListener>,
    on_complete: Option<StrokeListener>,
}

impl Default for StrokeCapture {
    fn default() -> Self {
        Self::new(MIN_POINT_DISTANCE)
    }
}

impl StrokeCapture {
    /// A disabled recorder that drops points closer than `min_distance`.
    #[must_use]
    pub fn new(min_distance: f64) -> Self {
        Self {
            enabled: false,
            min_distance,
            brush: Brush::default(),
            open: None,
            on_update: None,
            on_complete: None,
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable capture. Disabling with a stroke open cancels it.
    pub fn set_enabled(&mut self, enabled: bool) {
        if !enabled && self.open.is_some() {
            self.cancel();
        }
        self.enabled = enabled;
    }

    #[must_use]
    pub fn brush(&self) -> Brush {
        self.brush
    }

    /// Set the brush used by the next [`begin`](Self::begin).
    ///
    /// # Errors
    ///
    /// Returns a [`StrokeError`] if the color does not match the kind or the
    /// width is not positive. The previous brush is kept.
    pub fn set_brush(&mut self, brush: Brush) -> Result<(), StrokeError> {
        validate_brush(brush.kind, brush.color, brush.width)?;
        self.brush = brush;
        Ok(())
    }

    /// Called with the in-progress stroke after every accepted point.
    pub fn set_update_listener(&mut self, listener: impl FnMut(&Stroke) + 'static) {
        self.on_update = Some(Box::new(listener));
    }

    /// Called with each completed stroke. Not called for discarded or cancelled strokes.
    pub fn set_complete_listener(&mut self, listener: impl FnMut(&Stroke) + 'static) {
        self.on_complete = Some(Box::new(listener));
    }

    /// The stroke being drawn, if any.
    #[must_use]
    pub fn in_progress(&self) -> Option<&Stroke> {
        self.open.as_ref()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Open a stroke with its first point.
    ///
    /// # Errors
    ///
    /// [`CaptureError::Disabled`] when capture is off and
    /// [`CaptureError::AlreadyOpen`] while another stroke is open.
    pub fn begin(&mut self, point: StrokePoint) -> Result<(), CaptureError> {
        if !self.enabled {
            return Err(CaptureError::Disabled);
        }
        if self.open.is_some() {
            return Err(CaptureError::AlreadyOpen);
        }
        // The brush was validated in `set_brush`; a failure here means a
        // non-finite point, which is treated like a missing stroke.
        match Stroke::from_points(self.brush.kind, self.brush.color, self.brush.width, vec![point]) {
            Ok(stroke) => {
                self.open = Some(stroke);
                Ok(())
            }
            Err(error) => {
                debug!(%error, "capture: rejected first point");
                Err(CaptureError::NotOpen)
            }
        }
    }

    /// Append `point` if it is at least `min_distance` from the last one.
    ///
    /// Returns `Ok(true)` when the point was recorded.
    ///
    /// # Errors
    ///
    /// [`CaptureError::NotOpen`] when no stroke is open.
    pub fn extend(&mut self, point: StrokePoint) -> Result<bool, CaptureError> {
        let stroke = self.open.as_mut().ok_or(CaptureError::NotOpen)?;
        if !(point.x.is_finite() && point.y.is_finite()) {
            return Ok(false);
        }
        let far_enough = stroke
            .last_point()
            .is_none_or(|last| last.distance(&point) >= self.min_distance);
        if !far_enough {
            return Ok(false);
        }
        stroke.push_point(point);
        if let Some(listener) = self.on_update.as_mut() {
            listener(stroke);
        }
        Ok(true)
    }

    /// Close the open stroke. Strokes with fewer than two points are discarded.
    pub fn end(&mut self) -> Option<Stroke> {
        let stroke = self.open.take()?;
        if stroke.points().len() < 2 {
            debug!(points = stroke.points().len(), "capture: discarded short stroke");
            return None;
        }
        if let Some(listener) = self.on_complete.as_mut() {
            listener(&stroke);
        }
        Some(stroke)
    }

    /// Drop the open stroke without notifying the completion listener.
    pub fn cancel(&mut self) {
        if let Some(stroke) = self.open.take() {
            debug!(points = stroke.points().len(), "capture: cancelled stroke");
        }
    }
}
