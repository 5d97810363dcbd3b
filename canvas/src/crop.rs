//! Crop clamp: keeps a rotated, scaled image covering the viewport.

#[cfg(test)]
#[path = "crop_test.rs"]
mod crop_test;

use tracing::debug;

use crate::geometry::{OverlayPieces, Rect, Size, crop_outside_image, overlay_pieces, required_cover_scale, rotated_bounding_box};
use crate::transform::ViewTransform;

/// Limit translation so `content` (unscaled, unrotated) still covers `viewport`.
///
/// The allowed offset on each axis is half the overhang of the transformed
/// content's bounding box. Applying this twice gives the same result as once.
#[must_use]
pub fn clamp_translation(transform: ViewTransform, content: Size, viewport: Size) -> ViewTransform {
    let bbox = rotated_bounding_box(content.width * transform.scale, content.height * transform.scale, transform.rotation);
    let half_x = ((bbox.width - viewport.width) / 2.0).max(0.0);
    let half_y = ((bbox.height - viewport.height) / 2.0).max(0.0);
    ViewTransform { x: clamp_axis(transform.x, half_x), y: clamp_axis(transform.y, half_y), ..transform }
}

fn clamp_axis(value: f64, half: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.max(-half).min(half)
}

/// Raise `scale` so content covers a crop of `crop`'s size, then clamp translation.
#[must_use]
pub fn enforce_cover_scale(transform: ViewTransform, crop: Rect, content: Size, viewport: Size) -> ViewTransform {
    let floor = required_cover_scale(crop.width, crop.height, content.width, content.height);
    let scaled = if floor.is_finite() { transform.with_scale_floor(floor) } else { transform };
    clamp_translation(scaled, content, viewport)
}

/// A crop interaction in progress: what the image is, where it is shown, and
/// the fixed crop rectangle inside the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropFrame {
    /// Displayed image size at scale 1.
    pub content: Size,
    pub viewport: Size,
    /// Crop rectangle in viewport-local coordinates (top-left origin).
    pub crop: Rect,
}

impl CropFrame {
    /// A frame whose crop covers the whole viewport.
    #[must_use]
    pub fn new(content: Size, viewport: Size) -> Self {
        Self { content, viewport, crop: Rect::new(0.0, 0.0, viewport.width, viewport.height) }
    }

    /// Cover-scale floor plus translation clamp, applied after every transform change.
    #[must_use]
    pub fn apply(&self, transform: ViewTransform) -> ViewTransform {
        enforce_cover_scale(transform, self.crop, self.content, self.viewport)
    }

    /// Replace the crop rectangle, re-applying the frame to `transform`.
    pub fn set_crop(&mut self, crop: Rect, transform: ViewTransform) -> ViewTransform {
        self.crop = crop;
        debug!(width = crop.width, height = crop.height, "crop: rectangle changed");
        self.apply(transform)
    }

    /// Dimming rectangles around the crop.
    #[must_use]
    pub fn overlay(&self) -> OverlayPieces {
        overlay_pieces(self.crop, self.viewport)
    }

    /// Whether `candidate` stays on the displayed image for `transform`.
    ///
    /// Uses the image's axis-aligned footprint in viewport-local
    /// (top-left origin) coordinates.
    #[must_use]
    pub fn crop_allowed(&self, candidate: Rect, transform: &ViewTransform) -> bool {
        let shown = rotated_bounding_box(
            self.content.width * transform.scale,
            self.content.height * transform.scale,
            transform.rotation,
        );
        let image = Rect::new(
            self.viewport.width / 2.0 + transform.x - shown.width / 2.0,
            self.viewport.height / 2.0 + transform.y - shown.height / 2.0,
            shown.width,
            shown.height,
        );
        !crop_outside_image(candidate, image)
    }
}
