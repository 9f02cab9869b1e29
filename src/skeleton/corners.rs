//! Corner nodes at reflex wall vertices.
//!
//! A wall vertex is reflex when the walkable region wraps around it (more
//! than 180 degrees of free space). Guards cannot see past such vertices,
//! so each gets a corner node a short way into free space, attached to the
//! nearest visible point of the skeleton.

use log::{debug, trace};

use super::simplify::SkeletonGraph;
use crate::core::WorldPoint;
use crate::core::geometry::project_onto_segment;
use crate::graph::NodeType;
use crate::world::{LineOfSight, Walkable};

/// Distance used to sample which side of a vertex is walkable.
const SIDE_SAMPLE_DISTANCE: f32 = 0.01;

/// Corner node positions, `offset` away from every reflex wall vertex.
pub(crate) fn reflex_corners<W: Walkable + ?Sized>(world: &W, offset: f32) -> Vec<WorldPoint> {
    let mut corners = Vec::new();
    for ring in world.wall_polygons() {
        let n = ring.len();
        if n < 3 {
            continue;
        }
        for i in 0..n {
            let vertex = ring[i];
            let prev = ring[(i + n - 1) % n];
            let next = ring[(i + 1) % n];
            let bisector = (prev - vertex).normalize() + (next - vertex).normalize();
            if bisector.length() < 1e-4 {
                continue;
            }
            // Bisector points into the narrower wedge.
            let into_wedge = bisector.normalize();
            let reach = SIDE_SAMPLE_DISTANCE.min(offset);
            let wedge_walkable = world.is_walkable(vertex + into_wedge * reach);
            let outside_walkable = world.is_walkable(vertex - into_wedge * reach);
            if wedge_walkable || !outside_walkable {
                continue;
            }
            let corner = vertex - into_wedge * offset;
            if world.is_walkable(corner) {
                corners.push(corner);
            } else {
                trace!("[Skeleton] Corner at ({:.2},{:.2}) lands in a wall", vertex.x, vertex.y);
            }
        }
    }
    corners
}

/// Attach each corner to the nearest visible skeleton edge point,
/// splitting the edge unless the point is within `snap` of an endpoint.
pub(crate) fn attach_corners<L: LineOfSight + ?Sized>(
    graph: &mut SkeletonGraph,
    corners: &[WorldPoint],
    sight: &L,
    snap: f32,
) -> usize {
    let mut attached = 0;
    for &corner in corners {
        let nearest = graph
            .edges()
            .into_iter()
            .filter(|&(a, b)| {
                graph.nodes[a].node_type != NodeType::Corner
                    && graph.nodes[b].node_type != NodeType::Corner
            })
            .map(|(a, b)| {
                let projection =
                    project_onto_segment(corner, graph.nodes[a].position, graph.nodes[b].position);
                (a, b, projection)
            })
            .filter(|(_, _, p)| sight.has_line_of_sight(corner, p.point))
            .min_by(|x, y| x.2.distance.total_cmp(&y.2.distance));

        let Some((a, b, projection)) = nearest else {
            debug!(
                "[Skeleton] No visible edge for corner at ({:.2},{:.2})",
                corner.x, corner.y
            );
            continue;
        };

        let anchor = if projection.point.distance(&graph.nodes[a].position) <= snap {
            a
        } else if projection.point.distance(&graph.nodes[b].position) <= snap {
            b
        } else {
            let split = graph.push(projection.point, NodeType::Regular);
            graph.disconnect(a, b);
            graph.connect(a, split);
            graph.connect(split, b);
            split
        };
        let node = graph.push(corner, NodeType::Corner);
        graph.connect(node, anchor);
        attached += 1;
    }
    attached
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{OpenSight, PolygonMap};
    use approx::assert_relative_eq;

    #[test]
    fn test_room_corners_are_not_reflex() {
        assert!(reflex_corners(&PolygonMap::rectangle(10.0, 4.0), 0.5).is_empty());
    }

    #[test]
    fn test_pillar_corners_are_reflex() {
        let map = PolygonMap::rectangle(10.0, 10.0).with_rect_hole(4.0, 4.0, 6.0, 6.0);
        let corners = reflex_corners(&map, 0.5);
        assert_eq!(corners.len(), 4);
        let offset = 0.5 / 2.0_f32.sqrt();
        assert!(
            corners
                .iter()
                .any(|c| c.approx_eq(&WorldPoint::new(4.0 - offset, 4.0 - offset), 1e-4))
        );
    }

    #[test]
    fn test_attach_splits_edge() {
        let mut graph = SkeletonGraph::default();
        let a = graph.push(WorldPoint::new(0.0, 0.0), NodeType::DeadEnd);
        let b = graph.push(WorldPoint::new(10.0, 0.0), NodeType::DeadEnd);
        graph.connect(a, b);
        let attached = attach_corners(
            &mut graph,
            &[WorldPoint::new(5.0, 2.0), WorldPoint::new(0.1, 1.0)],
            &OpenSight,
            0.25,
        );
        assert_eq!(attached, 2);
        // First corner splits a-b at (5, 0); second snaps to a.
        assert_eq!(graph.alive_count(), 5);
        let split = 2;
        assert_relative_eq!(graph.nodes[split].position.x, 5.0);
        assert!(!graph.adjacency[a].contains(&b));
        assert!(graph.adjacency[3].contains(&split));
        assert!(graph.adjacency[4].contains(&a));
        assert_eq!(graph.nodes[4].node_type, NodeType::Corner);
    }
}
