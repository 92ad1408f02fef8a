//! Box and segment geometry shared by the primitive shape kinds.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Axis-aligned box geometry (rectangle, ellipse).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxGeom {
    pub rect: Rect,
}

impl BoxGeom {
    pub fn new(rect: Rect) -> Self {
        Self { rect }
    }

    /// Build from two drag corners, normalized to non-negative extent.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            rect: Rect::from_points(a, b),
        }
    }

    /// Hit test against the inscribed ellipse. Filled ellipses hit
    /// anywhere inside, outline-only ellipses hit on the rim band.
    pub fn ellipse_hit(&self, point: Point, tolerance: f64, filled: bool) -> bool {
        let center = self.rect.center();
        let rx = self.rect.width() / 2.0;
        let ry = self.rect.height() / 2.0;
        if rx < f64::EPSILON || ry < f64::EPSILON {
            return false;
        }
        let dx = (point.x - center.x) / rx;
        let dy = (point.y - center.y) / ry;
        let norm = (dx * dx + dy * dy).sqrt();
        // Tolerance in normalized units, scaled by the smaller radius.
        let band = tolerance / rx.min(ry);
        if filled {
            norm <= 1.0 + band
        } else {
            (norm - 1.0).abs() <= band
        }
    }
}

/// Two-endpoint geometry (line, arrow).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentGeom {
    pub start: Point,
    pub end: Point,
}

impl SegmentGeom {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        (self.end - self.start).hypot()
    }

    /// Direction angle in radians, start toward end.
    pub fn angle(&self) -> f64 {
        (self.end.y - self.start.y).atan2(self.end.x - self.start.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_corners_normalizes() {
        let geom = BoxGeom::from_corners(Point::new(100.0, 80.0), Point::new(20.0, 120.0));
        assert_eq!(geom.rect, Rect::new(20.0, 80.0, 100.0, 120.0));
    }

    #[test]
    fn test_ellipse_rim_hit() {
        let geom = BoxGeom::new(Rect::new(0.0, 0.0, 100.0, 100.0));
        // On the rim at the rightmost point.
        assert!(geom.ellipse_hit(Point::new(100.0, 50.0), 2.0, false));
        // Center misses an outline-only ellipse but hits a filled one.
        assert!(!geom.ellipse_hit(Point::new(50.0, 50.0), 2.0, false));
        assert!(geom.ellipse_hit(Point::new(50.0, 50.0), 2.0, true));
    }

    #[test]
    fn test_segment_angle() {
        let geom = SegmentGeom::new(Point::new(0.0, 0.0), Point::new(0.0, 5.0));
        assert!((geom.angle() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert_eq!(geom.length(), 5.0);
    }
}
