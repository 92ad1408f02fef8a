//! Region-based kinds: redact overlays and captured pixel snapshots.

use kurbo::Rect;
use serde::{Deserialize, Serialize};

/// Raw RGBA8 pixels. Serialized as base64 to keep JSON documents
/// readable and diff-friendly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    #[serde(with = "base64_bytes")]
    pub rgba: Vec<u8>,
}

impl PixelBuffer {
    /// Returns `None` when the byte length does not match the
    /// dimensions (4 bytes per pixel).
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        if rgba.len() != (width as usize) * (height as usize) * 4 {
            return None;
        }
        Some(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

mod base64_bytes {
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(D::Error::custom)
    }
}

/// A rectangle whose underlying pixels get obscured. The obscuring mode
/// and its strength live in the shape style.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionGeom {
    pub rect: Rect,
}

impl RegionGeom {
    pub fn new(rect: Rect) -> Self {
        Self { rect }
    }
}

/// Pixels captured from the canvas, re-stamped at `rect`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotGeom {
    pub rect: Rect,
    pub pixels: PixelBuffer,
}

impl SnapshotGeom {
    pub fn new(rect: Rect, pixels: PixelBuffer) -> Self {
        Self { rect, pixels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_buffer_length_check() {
        assert!(PixelBuffer::new(2, 2, vec![0; 16]).is_some());
        assert!(PixelBuffer::new(2, 2, vec![0; 15]).is_none());
    }

    #[test]
    fn test_pixel_buffer_base64_round_trip() {
        let buffer = PixelBuffer::new(1, 2, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let json = serde_json::to_string(&buffer).unwrap();
        assert!(json.contains("\"rgba\":\"AQIDBAUGBwg=\""));
        let back: PixelBuffer = serde_json::from_str(&json).unwrap();
        assert_eq!(back, buffer);
    }
}
