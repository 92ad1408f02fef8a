//! Point-list geometry for freehand strokes, highlighter strokes and
//! polylines.

use super::{point_to_polyline_dist, point_to_segment_dist};
use kurbo::Point;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathGeom {
    pub points: Vec<Point>,
    /// Closed paths connect the last vertex back to the first.
    #[serde(default)]
    pub closed: bool,
}

impl PathGeom {
    pub fn open(points: Vec<Point>) -> Self {
        Self {
            points,
            closed: false,
        }
    }

    pub fn closed(points: Vec<Point>) -> Self {
        Self {
            points,
            closed: true,
        }
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        if self.points.len() < 2 {
            return self
                .points
                .first()
                .is_some_and(|p| (*p - point).hypot() <= tolerance);
        }
        if point_to_polyline_dist(point, &self.points) <= tolerance {
            return true;
        }
        if self.closed {
            let first = self.points[0];
            let last = self.points[self.points.len() - 1];
            return point_to_segment_dist(point, last, first) <= tolerance;
        }
        false
    }
}
