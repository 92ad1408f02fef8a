//! Callout geometry: speech bubbles with a tail, and leader callouts
//! whose text box points at an anchor through a right-angle leader line.

use super::{point_to_polyline_dist, point_to_segment_dist};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Width of the speech bubble tail at its base.
pub const TAIL_WIDTH: f64 = 20.0;
/// How far the tail extends below the bubble.
pub const TAIL_HEIGHT: f64 = 15.0;

/// Rounded speech bubble with a tail at the bottom edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalloutGeom {
    pub rect: Rect,
    #[serde(default)]
    pub text: String,
}

impl CalloutGeom {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            text: String::new(),
        }
    }

    /// Base of the tail on the bottom edge, a quarter in from the left.
    pub fn tail_base(&self) -> Point {
        Point::new(
            self.rect.x0 + (self.rect.width() / 4.0).min(self.rect.width()),
            self.rect.y1,
        )
    }

    /// Tip of the tail, below the bubble.
    pub fn tail_tip(&self) -> Point {
        let base = self.tail_base();
        Point::new(base.x - TAIL_WIDTH / 4.0, base.y + TAIL_HEIGHT)
    }

    /// Bubble rect extended to include the tail.
    pub fn bounds(&self) -> Rect {
        self.rect.union_pt(self.tail_tip())
    }
}

/// Text box plus an anchor tip connected by a two-segment leader line
/// with a right-angle elbow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderGeom {
    pub rect: Rect,
    /// The point being called out.
    pub tip: Point,
    #[serde(default)]
    pub text: String,
}

impl LeaderGeom {
    pub fn new(rect: Rect, tip: Point) -> Self {
        Self {
            rect,
            tip,
            text: String::new(),
        }
    }

    /// Where the leader meets the box: on the side nearest the tip,
    /// clamped to that side's extent.
    pub fn attach_point(&self) -> Point {
        let r = self.rect;
        let c = r.center();
        let dx = self.tip.x - c.x;
        let dy = self.tip.y - c.y;
        // Which side faces the tip: compare the tip offset against the
        // box aspect so shallow angles still pick the long side.
        let half_w = (r.width() / 2.0).max(f64::EPSILON);
        let half_h = (r.height() / 2.0).max(f64::EPSILON);
        if (dx / half_w).abs() >= (dy / half_h).abs() {
            let x = if dx >= 0.0 { r.x1 } else { r.x0 };
            Point::new(x, self.tip.y.clamp(r.y0, r.y1))
        } else {
            let y = if dy >= 0.0 { r.y1 } else { r.y0 };
            Point::new(self.tip.x.clamp(r.x0, r.x1), y)
        }
    }

    /// The right-angle corner of the leader: vertical run from the tip,
    /// horizontal run into the box.
    pub fn elbow(&self) -> Point {
        Point::new(self.tip.x, self.attach_point().y)
    }

    /// Leader polyline from tip to box.
    pub fn leader_points(&self) -> [Point; 3] {
        [self.tip, self.elbow(), self.attach_point()]
    }

    pub fn hit_test(&self, point: Point, stroke_tolerance: f64, box_tolerance: f64) -> bool {
        if self
            .rect
            .inflate(box_tolerance, box_tolerance)
            .contains(point)
        {
            return true;
        }
        let leader = self.leader_points();
        point_to_polyline_dist(point, &leader) <= stroke_tolerance
            || point_to_segment_dist(point, leader[0], leader[1]) <= stroke_tolerance
    }
}
