//! Pure geometry helpers for the crop and fit-to-container layouts.
//!
//! Nothing in here holds state. Angles are degrees, lengths are CSS pixels.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Size = Size { width: 0.0, height: 0.0 };

    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle given by its top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Axis-aligned bounding box of a `width` x `height` rectangle rotated by
/// `angle_deg` about its center.
#[must_use]
pub fn rotated_bounding_box(width: f64, height: f64, angle_deg: f64) -> Size {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    Size {
        width: (width * cos).abs() + (height * sin).abs(),
        height: (width * sin).abs() + (height * cos).abs(),
    }
}

/// Largest size with the natural aspect ratio that fits in `max_width` x `max_height`.
///
/// Width is filled first; if that overflows the height, the result is
/// height-constrained instead.
#[must_use]
pub fn fit_dimensions(natural_width: f64, natural_height: f64, max_width: f64, max_height: f64) -> Size {
    if !(natural_width > 0.0 && natural_height > 0.0) || !natural_width.is_finite() || !natural_height.is_finite() {
        return Size::ZERO;
    }
    let ratio = natural_width / natural_height;
    let mut width = max_width;
    let mut height = width / ratio;
    if height > max_height {
        height = max_height;
        width = height * ratio;
    }
    Size { width, height }
}

/// Minimum uniform scale at which `content` covers a crop area of `crop` size.
#[must_use]
pub fn required_cover_scale(crop_width: f64, crop_height: f64, content_width: f64, content_height: f64) -> f64 {
    (crop_width / content_width).max(crop_height / content_height)
}

/// The four dimming rectangles drawn around a crop selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayPieces {
    pub top: Rect,
    pub bottom: Rect,
    pub left: Rect,
    pub right: Rect,
}

/// Split `container` minus `crop` into four non-overlapping rectangles.
///
/// `crop` is in container-local coordinates. The top and bottom pieces span
/// the full container width; left and right fill the band beside the crop.
#[must_use]
pub fn overlay_pieces(crop: Rect, container: Size) -> OverlayPieces {
    let cw = container.width;
    let ch = container.height;
    let band_top = crop.top.max(0.0);
    let band_height = (crop.bottom().min(ch) - band_top).max(0.0);

    OverlayPieces {
        top: Rect::new(0.0, 0.0, cw, crop.top.max(0.0)),
        bottom: Rect::new(0.0, crop.bottom().min(ch), cw, (ch - crop.bottom()).max(0.0)),
        left: Rect::new(0.0, band_top, crop.left.max(0.0), band_height),
        right: Rect::new(crop.right().min(cw), band_top, (cw - crop.right()).max(0.0), band_height),
    }
}

/// Whether a candidate crop box extends past the displayed image.
#[must_use]
pub fn crop_outside_image(crop: Rect, image: Rect) -> bool {
    crop.left < image.left || crop.top < image.top || crop.right() > image.right() || crop.bottom() > image.bottom()
}
