//! Waypoint reduction for graph paths.

use crate::core::WorldPoint;
use crate::core::geometry::perpendicular_distance;
use crate::world::LineOfSight;

/// Drop intermediate waypoints that add nothing.
///
/// A point is removed when the last kept point and the point after it can
/// see each other and the point lies within `tolerance` of the line joining
/// them. Endpoints are always kept.
pub fn simplify_path<L: LineOfSight + ?Sized>(
    path: &[WorldPoint],
    tolerance: f32,
    sight: &L,
) -> Vec<WorldPoint> {
    if path.len() <= 2 || tolerance <= 0.0 {
        return path.to_vec();
    }

    let mut simplified = vec![path[0]];
    for i in 1..path.len() - 1 {
        let prev = simplified[simplified.len() - 1];
        let next = path[i + 1];
        let redundant = perpendicular_distance(path[i], prev, next) <= tolerance
            && sight.has_line_of_sight(prev, next);
        if !redundant {
            simplified.push(path[i]);
        }
    }
    simplified.push(path[path.len() - 1]);
    simplified
}

/// Line-of-sight shortcutting: from each kept point jump to the furthest
/// visible later point.
pub fn shortcut_path<L: LineOfSight + ?Sized>(path: &[WorldPoint], sight: &L) -> Vec<WorldPoint> {
    if path.len() <= 2 {
        return path.to_vec();
    }

    let mut smoothed = vec![path[0]];
    let mut i = 0;
    while i < path.len() - 1 {
        let mut furthest = i + 1;
        for j in (i + 2)..path.len() {
            if sight.has_line_of_sight(path[i], path[j]) {
                furthest = j;
            }
        }
        smoothed.push(path[furthest]);
        i = furthest;
    }
    smoothed
}
