//! Quill edit payload: the image and mask set a quill-style backend consumes.
//!
//! Every image is a base64 PNG of exactly the backend size. Masks are drawn
//! at the original image resolution first and resized afterwards, the same
//! way [`rasterize`] handles any target size.

#[cfg(test)]
#[path = "payload_test.rs"]
mod payload_test;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use image::{DynamicImage, RgbaImage};
use serde::Serialize;
use tiny_skia::{Color, PixmapPaint, Transform};
use tracing::info;

use crate::consts::MASK_UPLOAD_FILENAME;
use crate::error::MaskError;
use crate::raster::{
    ColorBackground, MaskMode, PixelSize, decode_rgba, encode_png, image_pixmap, new_pixmap, pixmap_to_image,
    rasterize, resize_rgba,
};
use crate::stroke::{Stroke, StrokeKind};

/// Stretch an encoded image to exactly `size` over white and re-encode as PNG.
///
/// Returns the PNG and the image's original dimensions.
///
/// # Errors
///
/// [`MaskError::Decode`] for unreadable input and
/// [`MaskError::InvalidDimension`] for a zero-sized target.
pub fn stretch_to(image_bytes: &[u8], size: PixelSize) -> Result<(Vec<u8>, PixelSize), MaskError> {
    let decoded = decode_rgba(image_bytes)?;
    let original = PixelSize::new(decoded.width(), decoded.height());
    Ok((flatten_onto(&decoded, size, Color::WHITE)?, original))
}

/// An encoded mask with the file name it is uploaded under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskUpload {
    pub filename: &'static str,
    pub bytes: Vec<u8>,
}

/// Flatten an existing mask image onto opaque black at `size`, ready to be
/// sent as the `mask.png` file part.
///
/// # Errors
///
/// [`MaskError::InvalidDimension`] for a zero-sized target,
/// [`MaskError::Decode`] for unreadable mask bytes.
pub fn binary_mask_file(mask_bytes: &[u8], size: PixelSize) -> Result<MaskUpload, MaskError> {
    let size = size.checked("mask")?;
    let decoded = decode_rgba(mask_bytes)?;
    let bytes = flatten_onto(&decoded, size, Color::BLACK)?;
    info!(width = size.width, height = size.height, bytes = bytes.len(), "payload: mask file flattened");
    Ok(MaskUpload { filename: MASK_UPLOAD_FILENAME, bytes })
}

fn flatten_onto(image: &RgbaImage, size: PixelSize, backdrop: Color) -> Result<Vec<u8>, MaskError> {
    let mut canvas = new_pixmap(size)?;
    canvas.fill(backdrop);
    let stretched = image_pixmap(image, size)?;
    canvas.draw_pixmap(0, 0, stretched.as_ref(), &PixmapPaint::default(), Transform::identity(), None);
    encode_png(&DynamicImage::ImageRgba8(pixmap_to_image(&canvas)?))
}

/// Resize a backend result back to the original image resolution.
///
/// # Errors
///
/// [`MaskError::Decode`] when the backend bytes are not an image.
pub fn rescale_result(result_bytes: &[u8], original: PixelSize) -> Result<Vec<u8>, MaskError> {
    if original.width == 0 || original.height == 0 {
        return Err(MaskError::InvalidDimension {
            role: "original",
            width: f64::from(original.width),
            height: f64::from(original.height),
        });
    }
    let decoded = decode_rgba(result_bytes)?;
    encode_png(&DynamicImage::ImageRgba8(resize_rgba(&decoded, original)))
}

/// Request body for the quill `/edit_image` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuillPayload {
    /// Source photo stretched to the backend size.
    pub original_image: String,
    /// Alpha-punch mask of every stroke.
    pub total_mask: String,
    /// Color strokes over the photo; empty when there are none.
    pub add_color_image: String,
    /// Alpha-punch mask of add strokes.
    pub add_edge_image: String,
    /// Alpha-punch mask of subtract strokes.
    pub remove_edge_image: String,
    pub positive_prompt: String,
    pub negative_prompt: String,
    /// Original photo dimensions, for [`rescale_result`]. Not sent.
    #[serde(skip)]
    pub original_size: PixelSize,
}

impl QuillPayload {
    /// Build every image in the payload from the photo and its strokes.
    ///
    /// Stroke coordinates are in the photo's own pixel space.
    ///
    /// # Errors
    ///
    /// Decode failures for the photo, and any rasterization error.
    pub fn build(image_bytes: &[u8], strokes: &[Stroke], size: PixelSize) -> Result<Self, MaskError> {
        let (original_image, original) = stretch_to(image_bytes, size)?;

        let of_kind = |kind: StrokeKind| -> Vec<Stroke> { strokes.iter().filter(|s| s.kind() == kind).cloned().collect() };
        let punch = |subset: &[Stroke]| rasterize(subset, original, size, &MaskMode::AlphaPunch);

        let total_mask = punch(strokes)?;
        let add_edge_image = punch(&of_kind(StrokeKind::Add))?;
        let remove_edge_image = punch(&of_kind(StrokeKind::Subtract))?;

        let color_strokes = of_kind(StrokeKind::Color);
        let add_color_image = if color_strokes.is_empty() {
            String::new()
        } else {
            let mode = MaskMode::ColorComposite { background: ColorBackground::Image(image_bytes.to_vec()) };
            BASE64.encode(rasterize(&color_strokes, original, size, &mode)?)
        };

        info!(
            strokes = strokes.len(),
            color_strokes = color_strokes.len(),
            original_w = original.width,
            original_h = original.height,
            size = size.width,
            "payload: quill request assembled"
        );

        Ok(Self {
            original_image: BASE64.encode(original_image),
            total_mask: BASE64.encode(total_mask),
            add_color_image,
            add_edge_image: BASE64.encode(add_edge_image),
            remove_edge_image: BASE64.encode(remove_edge_image),
            positive_prompt: String::new(),
            negative_prompt: String::new(),
            original_size: original,
        })
    }

    #[must_use]
    pub fn with_prompts(mut self, positive: impl Into<String>, negative: impl Into<String>) -> Self {
        self.positive_prompt = positive.into();
        self.negative_prompt = negative.into();
        self
    }

    /// Field name/value pairs for a multipart form, in wire order.
    #[must_use]
    pub fn form_fields(&self) -> [(&'static str, &str); 7] {
        [
            ("original_image", self.original_image.as_str()),
            ("total_mask", self.total_mask.as_str()),
            ("add_color_image", self.add_color_image.as_str()),
            ("add_edge_image", self.add_edge_image.as_str()),
            ("remove_edge_image", self.remove_edge_image.as_str()),
            ("positive_prompt", self.positive_prompt.as_str()),
            ("negative_prompt", self.negative_prompt.as_str()),
        ]
    }
}

/// Decode a base64 payload field back to bytes.
///
/// # Errors
///
/// [`MaskError::Decode`] for invalid base64.
pub fn decode_field(field: &str) -> Result<Vec<u8>, MaskError> {
    BASE64.decode(field).map_err(|e| MaskError::Decode(e.to_string()))
}
