//! Shared numeric constants for the canvas crate.

use crate::stroke::Rgba;

// ── Transform ───────────────────────────────────────────────────

/// Lower bound for `ViewTransform::scale`. Zoom gestures clamp here instead of failing.
pub const MIN_SCALE: f64 = 0.05;

/// Scale change per wheel delta unit: `factor = 1 + (-delta_y) * sensitivity`.
pub const WHEEL_ZOOM_SENSITIVITY: f64 = 0.0015;

/// The controller tracks at most this many simultaneous pointers.
pub const MAX_GESTURE_POINTERS: usize = 2;

// ── Capture ─────────────────────────────────────────────────────

/// Minimum distance (surface pixels) between consecutive captured points.
pub const MIN_POINT_DISTANCE: f64 = 2.0;

/// Brush width used when the host never sets one.
pub const DEFAULT_BRUSH_WIDTH: f64 = 8.0;

/// Live-preview tint for add strokes.
pub const ADD_PREVIEW_COLOR: Rgba = Rgba::new(0, 255, 0, 128);

/// Live-preview tint for subtract strokes.
pub const SUBTRACT_PREVIEW_COLOR: Rgba = Rgba::new(255, 0, 0, 128);

// ── Backend masks ───────────────────────────────────────────────

/// Square edge length the quill backend expects for every image it receives.
pub const BACKEND_MASK_SIZE: u32 = 512;

/// File name used when a mask is wrapped as an upload blob.
pub const MASK_UPLOAD_FILENAME: &str = "mask.png";
