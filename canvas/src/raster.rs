//! Mask rasterizer: strokes to encoded PNG at any target size.
//!
//! Rendering is a pure function of (strokes, sizes, mode). Strokes are drawn
//! at the source resolution they were captured in, then the finished raster
//! is resized to the target as one image, so thin strokes keep their shape
//! when the backend wants a different size.

#[cfg(test)]
#[path = "raster_test.rs"]
mod raster_test;

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, ImageBuffer, ImageFormat, Pixel, RgbaImage};
use tiny_skia::{
    BlendMode, Color, ColorU8, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, PixmapPaint,
    PremultipliedColorU8, Transform,
};
use tracing::debug;

use crate::error::MaskError;
use crate::stroke::{Rgba, Stroke, StrokeKind, StrokePoint};

/// Raster dimensions in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Round a fractional size (e.g. an element's logical size) to pixels.
    ///
    /// # Errors
    ///
    /// [`MaskError::InvalidDimension`] for zero, negative or non-finite input.
    pub fn from_f64(width: f64, height: f64) -> Result<Self, MaskError> {
        let invalid = MaskError::InvalidDimension { role: "surface", width, height };
        if !(width.is_finite() && height.is_finite()) || width.round() < 1.0 || height.round() < 1.0 {
            return Err(invalid);
        }
        if width.round() > f64::from(u32::MAX) || height.round() > f64::from(u32::MAX) {
            return Err(invalid);
        }
        Ok(Self::new(width.round() as u32, height.round() as u32))
    }

    pub(crate) fn checked(self, role: &'static str) -> Result<Self, MaskError> {
        if self.width == 0 || self.height == 0 {
            return Err(MaskError::InvalidDimension {
                role,
                width: f64::from(self.width),
                height: f64::from(self.height),
            });
        }
        Ok(self)
    }
}

/// Background of a color composite.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ColorBackground {
    #[default]
    Transparent,
    /// Encoded image, stretched to the source size over opaque black.
    Image(Vec<u8>),
}

/// How strokes become pixels.
///
/// Inclusion is fixed per mode and independent of what the live preview shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaskMode {
    /// White add/subtract strokes on black, as 8-bit grayscale.
    Binary,
    /// Color strokes in their own colors.
    ColorComposite { background: ColorBackground },
    /// Opaque black with every supplied stroke erased to transparent.
    AlphaPunch,
}

impl MaskMode {
    /// Whether strokes of `kind` are drawn in this mode.
    #[must_use]
    pub fn includes(&self, kind: StrokeKind) -> bool {
        match self {
            Self::Binary => matches!(kind, StrokeKind::Add | StrokeKind::Subtract),
            Self::ColorComposite { .. } => kind == StrokeKind::Color,
            Self::AlphaPunch => true,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::ColorComposite { .. } => "color",
            Self::AlphaPunch => "alpha-punch",
        }
    }
}

/// Render `strokes` captured against a `source` surface into a PNG of `target` size.
///
/// Strokes excluded by `mode` are skipped before drawing; the rest are drawn
/// in order. Strokes with fewer than two points draw nothing. An empty list
/// yields a blank raster.
///
/// # Errors
///
/// [`MaskError::InvalidDimension`] before any drawing, [`MaskError::Decode`]
/// for an undecodable background image, [`MaskError::Encode`] if PNG
/// encoding fails.
pub fn rasterize(strokes: &[Stroke], source: PixelSize, target: PixelSize, mode: &MaskMode) -> Result<Vec<u8>, MaskError> {
    let source = source.checked("source")?;
    let target = target.checked("target")?;
    let mut pixmap = new_pixmap(source)?;

    match mode {
        MaskMode::Binary | MaskMode::AlphaPunch => pixmap.fill(Color::BLACK),
        MaskMode::ColorComposite { background: ColorBackground::Transparent } => {}
        MaskMode::ColorComposite { background: ColorBackground::Image(bytes) } => {
            pixmap.fill(Color::BLACK);
            let backdrop = image_pixmap(&decode_rgba(bytes)?, source)?;
            pixmap.draw_pixmap(0, 0, backdrop.as_ref(), &PixmapPaint::default(), Transform::identity(), None);
        }
    }

    let mut drawn = 0usize;
    for stroke in strokes.iter().filter(|s| mode.includes(s.kind())) {
        if draw_stroke(&mut pixmap, stroke, mode) {
            drawn += 1;
        }
    }

    let rendered = pixmap_to_image(&pixmap)?;
    let output = match mode {
        MaskMode::Binary => {
            let gray = DynamicImage::ImageRgba8(rendered).to_luma8();
            DynamicImage::ImageLuma8(resize_to(&gray, target))
        }
        _ => DynamicImage::ImageRgba8(resize_rgba(&rendered, target)),
    };

    debug!(
        mode = mode.label(),
        strokes = strokes.len(),
        drawn,
        source_w = source.width,
        source_h = source.height,
        target_w = target.width,
        target_h = target.height,
        "raster: mask rendered"
    );
    encode_png(&output)
}

pub(crate) fn new_pixmap(size: PixelSize) -> Result<Pixmap, MaskError> {
    Pixmap::new(size.width, size.height).ok_or(MaskError::InvalidDimension {
        role: "source",
        width: f64::from(size.width),
        height: f64::from(size.height),
    })
}

fn draw_stroke(pixmap: &mut Pixmap, stroke: &Stroke, mode: &MaskMode) -> bool {
    if stroke.points().len() < 2 {
        return false;
    }
    let Some(path) = smoothed_path(stroke.points()) else {
        debug!(points = stroke.points().len(), "raster: degenerate stroke path skipped");
        return false;
    };

    let mut paint = Paint::default();
    paint.anti_alias = true;
    match mode {
        MaskMode::Binary => paint.set_color_rgba8(255, 255, 255, 255),
        MaskMode::ColorComposite { .. } => {
            let Rgba { r, g, b, a } = stroke.color().unwrap_or(Rgba::BLACK);
            paint.set_color_rgba8(r, g, b, a);
        }
        MaskMode::AlphaPunch => {
            paint.set_color_rgba8(0, 0, 0, 255);
            paint.blend_mode = BlendMode::DestinationOut;
        }
    }

    let outline = tiny_skia::Stroke {
        width: stroke.width() as f32,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..tiny_skia::Stroke::default()
    };
    pixmap.stroke_path(&path, &paint, &outline, Transform::identity(), None);
    true
}

/// Quadratic midpoint smoothing: each interior point is a control point and
/// the midpoint to its successor is the curve end. The path finishes with a
/// straight segment to the last point.
fn smoothed_path(points: &[StrokePoint]) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let last = rest.last()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x as f32, first.y as f32);
    for pair in rest.windows(2) {
        let (control, next) = (pair[0], pair[1]);
        pb.quad_to(
            control.x as f32,
            control.y as f32,
            ((control.x + next.x) / 2.0) as f32,
            ((control.y + next.y) / 2.0) as f32,
        );
    }
    pb.line_to(last.x as f32, last.y as f32);
    pb.finish()
}

/// Stretch a decoded image to `size` as a premultiplied pixmap.
pub(crate) fn image_pixmap(image: &RgbaImage, size: PixelSize) -> Result<Pixmap, MaskError> {
    let stretched = resize_rgba(image, size);
    let mut pixmap = new_pixmap(size)?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(stretched.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

pub(crate) fn pixmap_to_image(pixmap: &Pixmap) -> Result<RgbaImage, MaskError> {
    let data: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), data)
        .ok_or_else(|| MaskError::Encode("raster buffer does not match its dimensions".to_string()))
}

/// Decode any supported image format to 8-bit RGBA.
pub(crate) fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage, MaskError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| MaskError::Decode(e.to_string()))?;
    Ok(decoded.to_rgba8())
}

/// Whole-image resize with a triangle (bilinear) filter.
fn resize_to<I>(image: &I, size: PixelSize) -> ImageBuffer<I::Pixel, Vec<<I::Pixel as Pixel>::Subpixel>>
where
    I: GenericImageView,
    I::Pixel: 'static,
    <I::Pixel as Pixel>::Subpixel: 'static,
{
    imageops::resize(image, size.width, size.height, FilterType::Triangle)
}

/// Resize straight-alpha RGBA, interpolating in premultiplied space so
/// transparent neighbors do not darken edge colors.
pub(crate) fn resize_rgba(image: &RgbaImage, size: PixelSize) -> RgbaImage {
    let mut premultiplied = image.clone();
    for px in premultiplied.pixels_mut() {
        px.0 = premultiply(px.0);
    }
    let mut resized = resize_to(&premultiplied, size);
    for px in resized.pixels_mut() {
        px.0 = demultiply(px.0);
    }
    resized
}

fn premultiply([r, g, b, a]: [u8; 4]) -> [u8; 4] {
    let c = ColorU8::from_rgba(r, g, b, a).premultiply();
    [c.red(), c.green(), c.blue(), c.alpha()]
}

fn demultiply([r, g, b, a]: [u8; 4]) -> [u8; 4] {
    // Filter rounding can push a channel one step past alpha.
    match PremultipliedColorU8::from_rgba(r.min(a), g.min(a), b.min(a), a) {
        Some(c) => {
            let c = c.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        }
        None => [0, 0, 0, 0],
    }
}

pub(crate) fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, MaskError> {
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| MaskError::Encode(e.to_string()))?;
    Ok(out.into_inner())
}

/// An owned snapshot of everything a rasterization needs.
///
/// Built by the engine so rendering can run while input keeps arriving.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskRequest {
    pub strokes: Vec<Stroke>,
    pub source: PixelSize,
    pub target: PixelSize,
    pub mode: MaskMode,
}

impl MaskRequest {
    /// Rasterize on the calling thread.
    ///
    /// # Errors
    ///
    /// See [`rasterize`].
    pub fn run(&self) -> Result<Vec<u8>, MaskError> {
        rasterize(&self.strokes, self.source, self.target, &self.mode)
    }
}

/// Rasterize on tokio's blocking pool. Requests are independent; any number
/// may be in flight.
///
/// # Errors
///
/// See [`rasterize`]; [`MaskError::Task`] if the worker panics or is cancelled.
pub async fn rasterize_async(request: MaskRequest) -> Result<Vec<u8>, MaskError> {
    tokio::task::spawn_blocking(move || request.run())
        .await
        .map_err(|e| MaskError::Task(e.to_string()))?
}

/// Default file name for a saved mask: `{prefix}_{now_ms}.png`.
#[must_use]
pub fn mask_filename(prefix: &str, now_ms: u128) -> String {
    format!("{prefix}_{now_ms}.png")
}
