//! View transform: the affine mapping from image-local space to the viewport.
//!
//! Translation is measured from the viewport center to the image center, so
//! the identity transform shows the image centered and unscaled. Pointer
//! positions handed to the gesture controller use the same frame (viewport
//! center at the origin, CSS pixels, y down).

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use serde::{Deserialize, Serialize};

use crate::consts::MIN_SCALE;

/// A point in either viewport-local or image-local space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Point halfway between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Row-major 2D affine matrix `[a c e; b d f]`, canvas `setTransform` order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Affine {
    #[must_use]
    pub fn apply(&self, p: Point) -> Point {
        Point::new(self.a * p.x + self.c * p.y + self.e, self.b * p.x + self.d * p.y + self.f)
    }
}

/// Pan/zoom/rotate/flip state for the editing viewport.
///
/// `scale` is always `>= MIN_SCALE` when produced by this crate and
/// `rotation` is kept in `[-180, 180)` degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub rotation: f64,
    pub flip_x: bool,
    pub flip_y: bool,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, scale: 1.0, rotation: 0.0, flip_x: false, flip_y: false }
    }
}

impl ViewTransform {
    /// Same transform with `scale` raised to at least `floor` (and `MIN_SCALE`).
    #[must_use]
    pub fn with_scale_floor(mut self, floor: f64) -> Self {
        let floor = floor.max(MIN_SCALE);
        if !self.scale.is_finite() || self.scale < floor {
            self.scale = floor;
        }
        self
    }

    /// Set an absolute rotation; the angle is normalized into `[-180, 180)`.
    #[must_use]
    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = normalize_rotation(degrees);
        self
    }

    /// Rotate by a relative angle in degrees.
    #[must_use]
    pub fn rotated_by(self, degrees: f64) -> Self {
        let current = self.rotation;
        self.with_rotation(current + degrees)
    }

    #[must_use]
    pub fn flipped_x(mut self) -> Self {
        self.flip_x = !self.flip_x;
        self
    }

    #[must_use]
    pub fn flipped_y(mut self) -> Self {
        self.flip_y = !self.flip_y;
        self
    }

    /// Rescale to `new_scale` while keeping the image point under `anchor`
    /// (viewport-local) fixed on screen.
    ///
    /// `new_scale` is clamped to `MIN_SCALE`.
    #[must_use]
    pub fn rescaled_about(&self, anchor: Point, new_scale: f64) -> Self {
        let new_scale = if new_scale.is_finite() { new_scale.max(MIN_SCALE) } else { self.scale };
        let ratio = new_scale / self.scale;
        Self {
            x: anchor.x + (self.x - anchor.x) * ratio,
            y: anchor.y + (self.y - anchor.y) * ratio,
            scale: new_scale,
            ..*self
        }
    }

    /// Matrix that maps image-local points (origin at the image center) to
    /// viewport-local points (origin at the viewport center).
    #[must_use]
    pub fn to_affine(&self) -> Affine {
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        let fx = if self.flip_x { -1.0 } else { 1.0 };
        let fy = if self.flip_y { -1.0 } else { 1.0 };
        Affine {
            a: self.scale * cos * fx,
            b: self.scale * sin * fx,
            c: -self.scale * sin * fy,
            d: self.scale * cos * fy,
            e: self.x,
            f: self.y,
        }
    }

    #[must_use]
    pub fn image_to_viewport(&self, image: Point) -> Point {
        self.to_affine().apply(image)
    }

    #[must_use]
    pub fn viewport_to_image(&self, viewport: Point) -> Point {
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        let dx = (viewport.x - self.x) / self.scale;
        let dy = (viewport.y - self.y) / self.scale;
        // Undo rotation, then the flip (a flip is its own inverse).
        let rx = dx * cos + dy * sin;
        let ry = -dx * sin + dy * cos;
        Point::new(
            if self.flip_x { -rx } else { rx },
            if self.flip_y { -ry } else { ry },
        )
    }

    /// CSS `transform` value equivalent to this transform, for hosts that
    /// apply it to an element with `transform-origin: center`.
    #[must_use]
    pub fn to_css(&self) -> String {
        let sx = if self.flip_x { -self.scale } else { self.scale };
        let sy = if self.flip_y { -self.scale } else { self.scale };
        format!(
            "translate({}px, {}px) rotate({}deg) scale({}, {})",
            self.x, self.y, self.rotation, sx, sy
        )
    }
}

/// Normalize an angle in degrees into `[-180, 180)`.
#[must_use]
pub fn normalize_rotation(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let wrapped = (degrees + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if wrapped >= 180.0 { wrapped - 360.0 } else { wrapped }
}
