//! Segment and polygon geometry shared by the extractor, graph queries and
//! the reference world implementation.

use super::point::WorldPoint;

/// Result of projecting a point onto a segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentProjection {
    /// Closest point on the segment.
    pub point: WorldPoint,
    /// Parameter along the segment (0 = start, 1 = end), clamped.
    pub t: f32,
    /// Distance from the query point to `point`.
    pub distance: f32,
}

/// Project `point` onto the segment `start`-`end`, clamping to the segment.
pub fn project_onto_segment(
    point: WorldPoint,
    start: WorldPoint,
    end: WorldPoint,
) -> SegmentProjection {
    let d = end - start;
    let len_sq = d.dot(&d);

    if len_sq < f32::EPSILON {
        return SegmentProjection {
            point: start,
            t: 0.0,
            distance: point.distance(&start),
        };
    }

    let t = ((point - start).dot(&d) / len_sq).clamp(0.0, 1.0);
    let projected = start + d * t;
    SegmentProjection {
        point: projected,
        t,
        distance: point.distance(&projected),
    }
}

/// Perpendicular distance from `point` to the infinite line through `a` and `b`.
///
/// Falls back to point distance when `a` and `b` coincide.
pub fn perpendicular_distance(point: WorldPoint, a: WorldPoint, b: WorldPoint) -> f32 {
    let d = b - a;
    let len = d.length();
    if len < f32::EPSILON {
        return point.distance(&a);
    }
    (d.cross(&(point - a))).abs() / len
}

/// Cosine of the angle between two direction vectors (0 if either is degenerate).
#[inline]
pub fn cosine_between(a: WorldPoint, b: WorldPoint) -> f32 {
    let la = a.length();
    let lb = b.length();
    if la < f32::EPSILON || lb < f32::EPSILON {
        return 0.0;
    }
    (a.dot(&b) / (la * lb)).clamp(-1.0, 1.0)
}

/// Orientation of the triplet (p, q, r): >0 counter-clockwise, <0 clockwise.
#[inline]
fn orientation(p: WorldPoint, q: WorldPoint, r: WorldPoint) -> f32 {
    (q - p).cross(&(r - p))
}

/// Check whether segments `p1-p2` and `q1-q2` properly intersect.
///
/// Touching at an endpoint or collinear overlap counts as an intersection.
pub fn segments_intersect(p1: WorldPoint, p2: WorldPoint, q1: WorldPoint, q2: WorldPoint) -> bool {
    const EPS: f32 = 1e-7;

    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);

    if ((d1 > EPS && d2 < -EPS) || (d1 < -EPS && d2 > EPS))
        && ((d3 > EPS && d4 < -EPS) || (d3 < -EPS && d4 > EPS))
    {
        return true;
    }

    (d1.abs() <= EPS && on_segment(q1, q2, p1))
        || (d2.abs() <= EPS && on_segment(q1, q2, p2))
        || (d3.abs() <= EPS && on_segment(p1, p2, q1))
        || (d4.abs() <= EPS && on_segment(p1, p2, q2))
}

/// Check whether collinear point `p` lies within the bounding box of `a-b`.
#[inline]
fn on_segment(a: WorldPoint, b: WorldPoint, p: WorldPoint) -> bool {
    p.x >= a.x.min(b.x) - 1e-6
        && p.x <= a.x.max(b.x) + 1e-6
        && p.y >= a.y.min(b.y) - 1e-6
        && p.y <= a.y.max(b.y) + 1e-6
}

/// Even-odd point-in-polygon test.
pub fn point_in_polygon(point: WorldPoint, polygon: &[WorldPoint]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = polygon[i];
        let pj = polygon[j];
        if (pi.y > point.y) != (pj.y > point.y) {
            let x_cross = (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Iterate the closed edges of a polygon as `(start, end)` pairs.
pub fn polygon_edges(polygon: &[WorldPoint]) -> impl Iterator<Item = (WorldPoint, WorldPoint)> + '_ {
    let n = polygon.len();
    (0..n).map(move |i| (polygon[i], polygon[(i + 1) % n]))
}

/// Total length of a polyline.
pub fn path_length(points: &[WorldPoint]) -> f32 {
    points.windows(2).map(|w| w[0].distance(&w[1])).sum()
}

/// Round to one decimal place.
#[inline]
pub fn round_to_tenth(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}
