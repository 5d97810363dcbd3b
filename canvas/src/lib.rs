//! Photo editing core: view transforms, brush strokes and mask rasterization.
//!
//! The host (browser shell, native UI, or the `photomask` CLI) feeds raw
//! pointer and wheel events into [`engine::EngineCore`] and applies the
//! returned [`engine::Action`]s. The engine pans, pinches and rotates the
//! photo, keeps it covering the crop area, and records brush strokes in the
//! photo's pixel space. Those strokes become PNG masks through [`raster`] or
//! a complete quill edit request through [`payload`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Editing session: input routing, stroke list, mask snapshots |
//! | [`gesture`] | One/two-pointer pan and pinch, wheel zoom |
//! | [`transform`] | View transform, coordinate mapping, rotation normalization |
//! | [`crop`] | Translation clamp and cover-scale floor for a crop area |
//! | [`geometry`] | Rotated bounding boxes, fit sizing, overlay rectangles |
//! | [`input`] | Event types, element geometry, pointer tracking and capture |
//! | [`capture`] | Pointer stream to denoised strokes |
//! | [`stroke`] | Stroke, color and stroke document types |
//! | [`raster`] | Strokes to binary, color or alpha-punch PNG masks |
//! | [`payload`] | Quill backend payload assembly and result rescaling |
//! | [`error`] | Mask and image errors |
//! | [`consts`] | Shared constants (scale floor, brush defaults, backend size) |

pub mod capture;
pub mod consts;
pub mod crop;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod input;
pub mod payload;
pub mod raster;
pub mod stroke;
pub mod transform;
