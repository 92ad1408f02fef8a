//! RGBA8 color representation used by shape styles.

use serde::{Deserialize, Serialize};

/// Serializable color (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Scale the alpha channel by `opacity` (clamped to 0..=1).
    pub fn with_opacity(self, opacity: f64) -> Self {
        let a = (self.a as f64 * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a, ..self }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`. Anything else is black.
    pub fn from_hex(s: &str) -> Self {
        let Some(hex) = s.strip_prefix('#') else {
            return Self::black();
        };
        let hex = hex.trim();
        let byte = |range: &str| u8::from_str_radix(range, 16).unwrap_or(0);
        match hex.len() {
            3 => {
                let r = byte(&hex[0..1]) * 17;
                let g = byte(&hex[1..2]) * 17;
                let b = byte(&hex[2..3]) * 17;
                Self::opaque(r, g, b)
            }
            6 => Self::opaque(byte(&hex[0..2]), byte(&hex[2..4]), byte(&hex[4..6])),
            8 => Self::new(
                byte(&hex[0..2]),
                byte(&hex[2..4]),
                byte(&hex[4..6]),
                byte(&hex[6..8]),
            ),
            _ => Self::black(),
        }
    }

    /// Format as `#rrggbb` (alpha dropped), for the SVG exporter.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::black()
    }
}
