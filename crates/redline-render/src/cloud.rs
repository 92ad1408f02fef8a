//! Revision-cloud outline: a closed run of outward-bulging arcs along a
//! polygon's perimeter.

use kurbo::{Arc, BezPath, Point, Vec2};

/// Minimum number of scallops a cloud is drawn with. Below this the
/// outline stops reading as a cloud, so the caller should fall back to
/// the plain outline.
const MIN_ARCS: usize = 4;

/// Build a revision-cloud path around the closed polygon `vertices`.
///
/// Anchor points are spaced `spacing` apart along the perimeter, with
/// distance carrying across vertices so corners pick up a scallop that
/// spans the two edge directions. Consecutive anchors are joined by a
/// circular arc bulging away from the polygon with a central angle of
/// `sweep_deg`. Returns `None` when the perimeter is too short to hold
/// a recognizable cloud.
pub fn cloud_path(vertices: &[Point], spacing: f64, sweep_deg: f64) -> Option<BezPath> {
    if vertices.len() < 3 || spacing <= 0.0 {
        return None;
    }
    let perimeter = perimeter_length(vertices);
    let count = (perimeter / spacing).floor() as usize;
    if count < MIN_ARCS {
        return None;
    }
    let step = perimeter / count as f64;
    let orientation = polygon_orientation(vertices);
    let sweep = sweep_deg.to_radians().clamp(0.1, std::f64::consts::PI - 0.01);

    let anchors: Vec<Point> = (0..count)
        .map(|i| point_at(vertices, i as f64 * step))
        .collect();

    let mut path = BezPath::new();
    path.move_to(anchors[0]);
    for i in 0..count {
        let a = anchors[i];
        let b = anchors[(i + 1) % count];
        append_scallop(&mut path, a, b, orientation, sweep);
    }
    path.close_path();
    Some(path)
}

fn perimeter_length(vertices: &[Point]) -> f64 {
    let mut total = 0.0;
    for i in 0..vertices.len() {
        let next = vertices[(i + 1) % vertices.len()];
        total += (next - vertices[i]).hypot();
    }
    total
}

/// Point at arc-length `dist` along the closed polygon.
fn point_at(vertices: &[Point], mut dist: f64) -> Point {
    for i in 0..vertices.len() {
        let a = vertices[i];
        let b = vertices[(i + 1) % vertices.len()];
        let len = (b - a).hypot();
        if dist <= len || i == vertices.len() - 1 {
            let t = if len > f64::EPSILON { (dist / len).min(1.0) } else { 0.0 };
            return a.lerp(b, t);
        }
        dist -= len;
    }
    vertices[0]
}

/// +1 for counterclockwise winding (shoelace), -1 for clockwise.
fn polygon_orientation(vertices: &[Point]) -> f64 {
    let mut doubled_area = 0.0;
    for i in 0..vertices.len() {
        let a = vertices[i];
        let b = vertices[(i + 1) % vertices.len()];
        doubled_area += a.x * b.y - b.x * a.y;
    }
    if doubled_area >= 0.0 { 1.0 } else { -1.0 }
}

/// Append the arc from `a` to `b` bulging away from the polygon
/// interior. For anchor pairs straddling a vertex the chord direction
/// already bisects the corner, so the same construction yields the
/// corner scallop.
fn append_scallop(path: &mut BezPath, a: Point, b: Point, orientation: f64, sweep: f64) {
    let chord = b - a;
    let len = chord.hypot();
    if len < f64::EPSILON {
        return;
    }
    // Outward normal of the chord, given the winding direction.
    let outward = Vec2::new(chord.y, -chord.x) * (orientation / len);
    let radius = len / (2.0 * (sweep / 2.0).sin());
    let mid = a.midpoint(b);
    let center = mid - outward * (radius * (sweep / 2.0).cos());

    let start_angle = (a - center).atan2();
    let end_angle = (b - center).atan2();
    let mut delta = end_angle - start_angle;
    while delta > std::f64::consts::PI {
        delta -= 2.0 * std::f64::consts::PI;
    }
    while delta < -std::f64::consts::PI {
        delta += 2.0 * std::f64::consts::PI;
    }

    let arc = Arc {
        center,
        radii: Vec2::new(radius, radius),
        start_angle,
        sweep_angle: delta,
        x_rotation: 0.0,
    };
    arc.to_cubic_beziers(0.1, |p1, p2, p| path.curve_to(p1, p2, p));
}
