//! Input model: pointer and wheel events, element geometry, pointer tracking.
//!
//! Events arrive in client (page) coordinates. [`SurfaceGeometry`] converts
//! them into the two frames the engine uses: surface pixels for stroke
//! capture and viewport-local points for gestures.
//!
//! Pointer capture is scoped. [`PointerTracker`] holds a [`CaptureGuard`] per
//! tracked pointer, and the guard releases capture when it is dropped, so up,
//! cancel, lost capture, teardown and plain drops all take the same path.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::consts::MAX_GESTURE_POINTERS;
use crate::geometry::Rect;
use crate::stroke::StrokePoint;
use crate::transform::Point;

/// Host-assigned pointer identity.
pub type PointerId = i32;

/// Malformed or unexpected pointer data. The engine drops these events.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("non-finite pointer coordinate ({x}, {y})")]
    NonFiniteCoordinate { x: f64, y: f64 },
    #[error("element has zero or invalid size")]
    EmptyElement,
    #[error("pointer {0} is not tracked")]
    UnknownPointer(PointerId),
    #[error("pointer {0} exceeds the tracked pointer limit")]
    TooManyPointers(PointerId),
}

/// A pointer event as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub id: PointerId,
    /// Client coordinates in CSS pixels.
    pub client: Point,
    /// Milliseconds, in the host's event clock.
    pub timestamp: f64,
}

impl PointerEvent {
    #[must_use]
    pub fn new(id: PointerId, client_x: f64, client_y: f64, timestamp: f64) -> Self {
        Self { id, client: Point::new(client_x, client_y), timestamp }
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Where an element sits on the page and how many pixels its surface has.
///
/// The surface (canvas backing store, or the target image) can be larger or
/// smaller than the element's CSS box.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceGeometry {
    /// Element bounding rectangle in client coordinates.
    pub element: Rect,
    pub pixel_width: f64,
    pub pixel_height: f64,
}

impl SurfaceGeometry {
    #[must_use]
    pub fn new(element: Rect, pixel_width: f64, pixel_height: f64) -> Self {
        Self { element, pixel_width, pixel_height }
    }

    fn check(&self, client: Point) -> Result<(), InputError> {
        if !client.is_finite() {
            return Err(InputError::NonFiniteCoordinate { x: client.x, y: client.y });
        }
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !(valid(self.element.width) && valid(self.element.height)) {
            return Err(InputError::EmptyElement);
        }
        Ok(())
    }

    /// Client coordinates to surface pixels: `(client - origin) * pixels / css`.
    ///
    /// # Errors
    ///
    /// Non-finite coordinates or an element without area.
    pub fn to_surface(&self, client: Point, timestamp: f64) -> Result<StrokePoint, InputError> {
        self.check(client)?;
        if !(self.pixel_width > 0.0 && self.pixel_height > 0.0) {
            return Err(InputError::EmptyElement);
        }
        let sx = self.pixel_width / self.element.width;
        let sy = self.pixel_height / self.element.height;
        Ok(StrokePoint::new(
            (client.x - self.element.left) * sx,
            (client.y - self.element.top) * sy,
            timestamp,
        ))
    }

    /// Client coordinates to viewport-local CSS pixels, origin at the element center.
    ///
    /// # Errors
    ///
    /// Non-finite coordinates or an element without area.
    pub fn to_viewport(&self, client: Point) -> Result<Point, InputError> {
        self.check(client)?;
        Ok(Point::new(
            client.x - (self.element.left + self.element.width / 2.0),
            client.y - (self.element.top + self.element.height / 2.0),
        ))
    }
}

/// The host side of pointer capture (e.g. `setPointerCapture` on an element).
pub trait CaptureHost {
    fn capture(&self, id: PointerId);
    fn release(&self, id: PointerId);
}

/// Holds capture for one pointer and releases it on drop.
pub struct CaptureGuard {
    host: Rc<dyn CaptureHost>,
    id: PointerId,
}

impl CaptureGuard {
    #[must_use]
    pub fn acquire(host: Rc<dyn CaptureHost>, id: PointerId) -> Self {
        host.capture(id);
        Self { host, id }
    }

    #[must_use]
    pub fn id(&self) -> PointerId {
        self.id
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.host.release(self.id);
    }
}

impl std::fmt::Debug for CaptureGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureGuard").field("id", &self.id).finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct Tracked {
    position: Point,
    _guard: Option<CaptureGuard>,
}

/// Active pointers keyed by id, at most two.
///
/// Iteration order is by pointer id, so the pair used for a pinch is stable
/// for the life of the gesture.
#[derive(Default)]
pub struct PointerTracker {
    pointers: BTreeMap<PointerId, Tracked>,
    host: Option<Rc<dyn CaptureHost>>,
}

impl PointerTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker that captures each pointer through `host` while it is down.
    #[must_use]
    pub fn with_capture(host: Rc<dyn CaptureHost>) -> Self {
        Self { pointers: BTreeMap::new(), host: Some(host) }
    }

    /// Start tracking `id` at `position`.
    ///
    /// Returns `Ok(true)` when the pointer is new and `Ok(false)` when it was
    /// already tracked (its position is refreshed).
    ///
    /// # Errors
    ///
    /// Non-finite positions, and new pointers beyond the two-pointer limit.
    pub fn press(&mut self, id: PointerId, position: Point) -> Result<bool, InputError> {
        if !position.is_finite() {
            return Err(InputError::NonFiniteCoordinate { x: position.x, y: position.y });
        }
        if let Some(tracked) = self.pointers.get_mut(&id) {
            tracked.position = position;
            return Ok(false);
        }
        if self.pointers.len() >= MAX_GESTURE_POINTERS {
            return Err(InputError::TooManyPointers(id));
        }
        let guard = self.host.as_ref().map(|host| CaptureGuard::acquire(Rc::clone(host), id));
        self.pointers.insert(id, Tracked { position, _guard: guard });
        Ok(true)
    }

    /// Record a new position for a tracked pointer.
    ///
    /// # Errors
    ///
    /// Untracked pointers and non-finite positions.
    pub fn update(&mut self, id: PointerId, position: Point) -> Result<(), InputError> {
        if !position.is_finite() {
            return Err(InputError::NonFiniteCoordinate { x: position.x, y: position.y });
        }
        let tracked = self.pointers.get_mut(&id).ok_or(InputError::UnknownPointer(id))?;
        tracked.position = position;
        Ok(())
    }

    /// Stop tracking `id`, releasing its capture. Returns whether it was tracked.
    pub fn release(&mut self, id: PointerId) -> bool {
        self.pointers.remove(&id).is_some()
    }

    /// Drop every pointer and release all captures.
    pub fn clear(&mut self) {
        self.pointers.clear();
    }

    #[must_use]
    pub fn contains(&self, id: PointerId) -> bool {
        self.pointers.contains_key(&id)
    }

    #[must_use]
    pub fn position(&self, id: PointerId) -> Option<Point> {
        self.pointers.get(&id).map(|t| t.position)
    }

    /// Tracked positions in pointer-id order.
    #[must_use]
    pub fn positions(&self) -> Vec<Point> {
        self.pointers.values().map(|t| t.position).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pointers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pointers.is_empty()
    }
}
