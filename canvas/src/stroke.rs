//! Stroke model: captured points, stroke kinds, colors and the stroke document.
//!
//! A [`Stroke`] is immutable once recorded. Construction goes through
//! [`Stroke::from_points`] (or deserialization, which is routed through the
//! same validation) so a color stroke always carries a color and no other
//! kind does.

#[cfg(test)]
#[path = "stroke_test.rs"]
mod stroke_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::{ADD_PREVIEW_COLOR, SUBTRACT_PREVIEW_COLOR};

/// Error returned when a stroke or color value is malformed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StrokeError {
    /// A stroke needs at least one point.
    #[error("stroke has no points")]
    Empty,
    /// Stroke width must be a positive finite number.
    #[error("invalid stroke width: {0}")]
    InvalidWidth(f64),
    /// `Color` strokes need a color.
    #[error("color stroke is missing its color")]
    MissingColor,
    /// Only `Color` strokes may carry a color.
    #[error("{0:?} stroke must not carry a color")]
    UnexpectedColor(StrokeKind),
    /// A point coordinate is NaN or infinite.
    #[error("non-finite stroke point at index {0}")]
    NonFinitePoint(usize),
    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),
}

/// A captured point in surface pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f64,
    pub y: f64,
    /// Milliseconds, in the host's event clock.
    #[serde(default)]
    pub timestamp: f64,
}

impl StrokePoint {
    #[must_use]
    pub fn new(x: f64, y: f64, timestamp: f64) -> Self {
        Self { x, y, timestamp }
    }

    #[must_use]
    pub fn distance(&self, other: &StrokePoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Which mask channel a stroke feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeKind {
    /// Region added to the selection.
    Add,
    /// Region removed from the selection.
    Subtract,
    /// Painted color hint.
    Color,
}

/// An 8-bit straight-alpha color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);
    pub const BLACK: Rgba = Rgba::new(0, 0, 0, 255);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    #[must_use]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }
}

impl FromStr for Rgba {
    type Err = StrokeError;

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StrokeError::InvalidColor(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        match hex.len() {
            3 => {
                let mut out = [0u8; 3];
                for (slot, c) in out.iter_mut().zip(hex.chars()) {
                    let v = c.to_digit(16).ok_or_else(invalid)? as u8;
                    *slot = v * 17;
                }
                Ok(Rgba::opaque(out[0], out[1], out[2]))
            }
            6 => Ok(Rgba::opaque(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Rgba::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Serialize for Rgba {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One continuous brush gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StrokeRecord", into = "StrokeRecord")]
pub struct Stroke {
    points: Vec<StrokePoint>,
    kind: StrokeKind,
    color: Option<Rgba>,
    width: f64,
    start_time: f64,
}

impl Stroke {
    /// Build a validated stroke. `start_time` is the first point's timestamp.
    ///
    /// # Errors
    ///
    /// Returns a [`StrokeError`] when there are no points, the width is not
    /// positive, a point is non-finite, or the color does not match the kind.
    pub fn from_points(
        kind: StrokeKind,
        color: Option<Rgba>,
        width: f64,
        points: Vec<StrokePoint>,
    ) -> Result<Self, StrokeError> {
        let first = points.first().ok_or(StrokeError::Empty)?;
        let start_time = first.timestamp;
        validate_brush(kind, color, width)?;
        if let Some(i) = points.iter().position(|p| !(p.x.is_finite() && p.y.is_finite())) {
            return Err(StrokeError::NonFinitePoint(i));
        }
        Ok(Self { points, kind, color, width, start_time })
    }

    #[must_use]
    pub fn points(&self) -> &[StrokePoint] {
        &self.points
    }

    #[must_use]
    pub fn kind(&self) -> StrokeKind {
        self.kind
    }

    #[must_use]
    pub fn color(&self) -> Option<Rgba> {
        self.color
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[must_use]
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Tint used when drawing this stroke in the live preview.
    #[must_use]
    pub fn preview_color(&self) -> Rgba {
        match self.kind {
            StrokeKind::Add => ADD_PREVIEW_COLOR,
            StrokeKind::Subtract => SUBTRACT_PREVIEW_COLOR,
            StrokeKind::Color => self.color.unwrap_or(Rgba::BLACK),
        }
    }

    #[must_use]
    pub fn last_point(&self) -> Option<&StrokePoint> {
        self.points.last()
    }

    /// Appends without checks; only the capture module grows open strokes.
    pub(crate) fn push_point(&mut self, point: StrokePoint) {
        self.points.push(point);
    }
}

/// Check the kind/color/width combination a brush or stroke will use.
pub(crate) fn validate_brush(kind: StrokeKind, color: Option<Rgba>, width: f64) -> Result<(), StrokeError> {
    if !(width.is_finite() && width > 0.0) {
        return Err(StrokeError::InvalidWidth(width));
    }
    match (kind, color) {
        (StrokeKind::Color, None) => Err(StrokeError::MissingColor),
        (StrokeKind::Add | StrokeKind::Subtract, Some(_)) => Err(StrokeError::UnexpectedColor(kind)),
        _ => Ok(()),
    }
}

/// Wire shape of a stroke; converted through [`Stroke::from_points`].
#[derive(Serialize, Deserialize)]
struct StrokeRecord {
    points: Vec<StrokePoint>,
    #[serde(rename = "type")]
    kind: StrokeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<Rgba>,
    width: f64,
    #[serde(default, rename = "startTime", skip_serializing_if = "Option::is_none")]
    start_time: Option<f64>,
}

impl TryFrom<StrokeRecord> for Stroke {
    type Error = StrokeError;

    fn try_from(record: StrokeRecord) -> Result<Self, Self::Error> {
        let mut stroke = Stroke::from_points(record.kind, record.color, record.width, record.points)?;
        if let Some(start) = record.start_time {
            stroke.start_time = start;
        }
        Ok(stroke)
    }
}

impl From<Stroke> for StrokeRecord {
    fn from(stroke: Stroke) -> Self {
        Self {
            points: stroke.points,
            kind: stroke.kind,
            color: stroke.color,
            width: stroke.width,
            start_time: Some(stroke.start_time),
        }
    }
}

/// Which stroke kinds the live preview shows.
///
/// Independent of the rasterization mode: the preview hides color strokes
/// while the add/subtract brush is active and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrokeVisibility {
    /// Every stroke.
    #[default]
    All,
    /// Add and subtract strokes only.
    Selection,
    /// Color strokes only.
    Color,
}

impl StrokeVisibility {
    #[must_use]
    pub fn shows(self, kind: StrokeKind) -> bool {
        match self {
            Self::All => true,
            Self::Selection => kind != StrokeKind::Color,
            Self::Color => kind == StrokeKind::Color,
        }
    }

    /// Visibility that matches the brush kind being painted.
    #[must_use]
    pub fn for_brush(kind: StrokeKind) -> Self {
        match kind {
            StrokeKind::Add | StrokeKind::Subtract => Self::Selection,
            StrokeKind::Color => Self::Color,
        }
    }
}

/// Strokes recorded over one source image, as exchanged with the driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeDocument {
    /// Pixel width of the image the strokes were captured against.
    pub source_width: u32,
    /// Pixel height of the image the strokes were captured against.
    pub source_height: u32,
    #[serde(default)]
    pub strokes: Vec<Stroke>,
}

impl StrokeDocument {
    /// Parse a document from JSON.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error for malformed JSON or invalid strokes.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Strokes of the given kind, in recorded order.
    pub fn strokes_of(&self, kind: StrokeKind) -> impl Iterator<Item = &Stroke> {
        self.strokes.iter().filter(move |s| s.kind() == kind)
    }
}
