//! Gesture controller: one- and two-pointer pan/pinch plus wheel zoom.
//!
//! The controller never owns the view transform. Callers pass the current
//! value in and get an updated one back, so every event yields at most one
//! new transform. Sessions are created and dropped only when the tracked
//! pointer count changes:
//!
//! ```text
//! Idle (0) -> Panning (1) -> Pinching (2) -> Panning (1, current transform) -> Idle
//! ```

#[cfg(test)]
#[path = "gesture_test.rs"]
mod gesture_test;

use std::rc::Rc;

use tracing::debug;

use crate::consts::{MIN_SCALE, WHEEL_ZOOM_SENSITIVITY};
use crate::input::{CaptureHost, InputError, PointerId, PointerTracker};
use crate::transform::{Point, ViewTransform};

/// Zoom tuning shared by pinch and wheel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSettings {
    /// Scale floor. Values below [`MIN_SCALE`] are raised to it.
    pub min_scale: f64,
    pub wheel_sensitivity: f64,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self { min_scale: MIN_SCALE, wheel_sensitivity: WHEEL_ZOOM_SENSITIVITY }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanSession {
    pub start_point: Point,
    pub start_transform: ViewTransform,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchSession {
    pub start_distance: f64,
    pub start_scale: f64,
    pub midpoint: Point,
    pub start_transform: ViewTransform,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    Panning(PanSession),
    Pinching(PinchSession),
}

/// Pointer-count state machine producing view transforms.
pub struct GestureController {
    tracker: PointerTracker,
    state: GestureState,
    settings: GestureSettings,
    pan_enabled: bool,
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new(GestureSettings::default())
    }
}

impl GestureController {
    #[must_use]
    pub fn new(settings: GestureSettings) -> Self {
        Self { tracker: PointerTracker::new(), state: GestureState::Idle, settings, pan_enabled: true }
    }

    /// Controller whose tracked pointers hold capture through `host`.
    #[must_use]
    pub fn with_capture(settings: GestureSettings, host: Rc<dyn CaptureHost>) -> Self {
        Self { tracker: PointerTracker::with_capture(host), ..Self::new(settings) }
    }

    #[must_use]
    pub fn state(&self) -> &GestureState {
        &self.state
    }

    #[must_use]
    pub fn settings(&self) -> GestureSettings {
        self.settings
    }

    #[must_use]
    pub fn pointer_count(&self) -> usize {
        self.tracker.len()
    }

    #[must_use]
    pub fn is_tracking(&self, id: PointerId) -> bool {
        self.tracker.contains(id)
    }

    #[must_use]
    pub fn is_pinching(&self) -> bool {
        matches!(self.state, GestureState::Pinching(_))
    }

    fn floor(&self) -> f64 {
        self.settings.min_scale.max(MIN_SCALE)
    }

    /// Allow or forbid single-pointer panning. Brush mode turns it off so the
    /// drawing pointer does not move the image.
    pub fn set_pan_enabled(&mut self, enabled: bool, current: &ViewTransform) {
        if self.pan_enabled != enabled {
            self.pan_enabled = enabled;
            self.sync(current);
        }
    }

    /// Track a new pointer at a viewport-local position.
    ///
    /// # Errors
    ///
    /// Non-finite positions and pointers past the two-pointer limit. Neither
    /// changes the gesture state.
    pub fn pointer_down(&mut self, id: PointerId, position: Point, current: &ViewTransform) -> Result<(), InputError> {
        if self.tracker.press(id, position)? {
            self.sync(current);
        }
        Ok(())
    }

    /// Move a tracked pointer. Returns the new transform, if the move changes it.
    ///
    /// # Errors
    ///
    /// Untracked pointers and non-finite positions.
    pub fn pointer_move(&mut self, id: PointerId, position: Point) -> Result<Option<ViewTransform>, InputError> {
        self.tracker.update(id, position)?;
        Ok(match self.state {
            GestureState::Idle => None,
            GestureState::Panning(session) => Some(ViewTransform {
                x: session.start_transform.x + (position.x - session.start_point.x),
                y: session.start_transform.y + (position.y - session.start_point.y),
                ..session.start_transform
            }),
            GestureState::Pinching(session) => self.pinch(&session),
        })
    }

    fn pinch(&self, session: &PinchSession) -> Option<ViewTransform> {
        let [a, b] = self.pair()?;
        if session.start_distance <= f64::EPSILON {
            return None;
        }
        let factor = a.distance(b) / session.start_distance;
        let new_scale = (session.start_scale * factor).max(self.floor());
        Some(session.start_transform.rescaled_about(session.midpoint, new_scale))
    }

    /// Release a pointer (up, cancel and lost capture all land here).
    /// Returns whether the pointer was tracked.
    pub fn pointer_up(&mut self, id: PointerId, current: &ViewTransform) -> bool {
        let released = self.tracker.release(id);
        if released {
            self.sync(current);
        }
        released
    }

    /// One-shot wheel zoom around `anchor` (viewport-local).
    ///
    /// Independent of the pointer state machine. Returns `None` when the
    /// delta leaves the scale unchanged.
    #[must_use]
    pub fn wheel(&self, anchor: Point, delta_y: f64, current: &ViewTransform) -> Option<ViewTransform> {
        let factor = 1.0 + (-delta_y) * self.settings.wheel_sensitivity;
        if !factor.is_finite() || factor.total_cmp(&1.0).is_eq() || !anchor.is_finite() {
            return None;
        }
        let new_scale = (current.scale * factor).max(self.floor());
        Some(current.rescaled_about(anchor, new_scale))
    }

    /// Forget every pointer and session, releasing all captures.
    pub fn reset(&mut self) {
        self.tracker.clear();
        if self.state != GestureState::Idle {
            debug!("gesture: reset to idle");
        }
        self.state = GestureState::Idle;
    }

    fn pair(&self) -> Option<[Point; 2]> {
        match self.tracker.positions().as_slice() {
            &[a, b, ..] => Some([a, b]),
            _ => None,
        }
    }

    fn sync(&mut self, current: &ViewTransform) {
        let next = match self.tracker.len() {
            0 => GestureState::Idle,
            1 if self.pan_enabled => match self.tracker.positions().first() {
                Some(&start_point) => GestureState::Panning(PanSession { start_point, start_transform: *current }),
                None => GestureState::Idle,
            },
            1 => GestureState::Idle,
            _ => match self.pair() {
                Some([a, b]) => GestureState::Pinching(PinchSession {
                    start_distance: a.distance(b),
                    start_scale: current.scale,
                    midpoint: a.midpoint(b),
                    start_transform: *current,
                }),
                None => GestureState::Idle,
            },
        };
        debug!(pointers = self.tracker.len(), from = state_name(&self.state), to = state_name(&next), "gesture: state change");
        self.state = next;
    }
}

fn state_name(state: &GestureState) -> &'static str {
    match state {
        GestureState::Idle => "idle",
        GestureState::Panning(_) => "panning",
        GestureState::Pinching(_) => "pinching",
    }
}
