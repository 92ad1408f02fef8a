//! Text-bearing geometry: text blocks, sticky notes and watermarks.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Free-standing text confined to a box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextGeom {
    pub rect: Rect,
    pub text: String,
    #[serde(default)]
    pub align: TextAlign,
    /// Rotation in degrees around the box center.
    #[serde(default)]
    pub rotation_deg: f64,
}

impl TextGeom {
    pub fn new(rect: Rect, text: impl Into<String>) -> Self {
        Self {
            rect,
            text: text.into(),
            align: TextAlign::default(),
            rotation_deg: 0.0,
        }
    }
}

/// Sticky note: filled rounded box with wrapped text and a drop shadow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteGeom {
    pub rect: Rect,
    pub text: String,
    #[serde(default = "default_shadow")]
    pub shadow: bool,
}

fn default_shadow() -> bool {
    true
}

impl NoteGeom {
    pub fn new(rect: Rect, text: impl Into<String>) -> Self {
        Self {
            rect,
            text: text.into(),
            shadow: true,
        }
    }
}

/// Watermark text, either a single stamp at `origin` or tiled across
/// the whole canvas on a rotated grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatermarkGeom {
    pub origin: Point,
    pub text: String,
    #[serde(default = "default_tiled")]
    pub tiled: bool,
    /// Tile rotation in degrees.
    pub rotation_deg: f64,
    /// Tile spacing as a multiple of the font size.
    pub spacing_factor: f64,
}

fn default_tiled() -> bool {
    true
}

impl WatermarkGeom {
    pub fn new(origin: Point, text: impl Into<String>, rotation_deg: f64, spacing_factor: f64) -> Self {
        Self {
            origin,
            text: text.into(),
            tiled: true,
            rotation_deg,
            spacing_factor,
        }
    }

    /// Selection handle around the stamp origin. Tiled watermarks cover
    /// the canvas, so hit testing and selection work on this anchor
    /// rather than the full tiling.
    pub fn anchor_bounds(&self, font_size: f64) -> Rect {
        // Approximate glyph advance, matching the built-in raster text
        // model; a host with real text metrics only gains accuracy.
        let width = (self.text.chars().count() as f64 * font_size * 0.6).max(font_size);
        Rect::new(
            self.origin.x,
            self.origin.y - font_size,
            self.origin.x + width,
            self.origin.y,
        )
    }
}
