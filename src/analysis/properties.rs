//! Read-only structural measures of a road graph layer.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::graph::{GraphLayer, NodeId};
use crate::pathfinding::dijkstra_distances;

/// Cycle enumeration stops after this many cycles.
pub const DEFAULT_MAX_CYCLES: usize = 10_000;

/// Structural summary of a layer.
///
/// Corner nodes and nodes with no traversable edge are excluded from the
/// distance measures; eccentricities only range over reachable nodes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphProperties {
    pub node_count: usize,
    pub edge_count: usize,
    pub total_length: f32,
    /// Per-node eccentricity, `None` for excluded nodes.
    pub eccentricities: Vec<Option<f32>>,
    pub radius: f32,
    pub diameter: f32,
    /// Simple cycles as node sequences (first node not repeated).
    pub cycles: Vec<Vec<NodeId>>,
    /// Node count of the longest cycle.
    pub circumference: Option<usize>,
    /// Node count of the shortest cycle.
    pub girth: Option<usize>,
    /// Enumeration hit the cycle cap.
    pub cycles_truncated: bool,
}

impl GraphProperties {
    /// Measure `layer`, enumerating at most `max_cycles` cycles.
    pub fn analyze(layer: &GraphLayer, max_cycles: usize) -> Self {
        let adjacency = layer.weighted_adjacency();

        let eccentricities: Vec<Option<f32>> = (0..adjacency.len())
            .map(|i| {
                if adjacency[i].is_empty() {
                    return None;
                }
                let farthest = dijkstra_distances(&adjacency, i)
                    .into_iter()
                    .filter(|d| d.is_finite())
                    .fold(0.0, f32::max);
                Some(farthest)
            })
            .collect();
        let measured: Vec<f32> = eccentricities.iter().flatten().copied().collect();
        let radius = measured.iter().copied().reduce(f32::min).unwrap_or(0.0);
        let diameter = measured.iter().copied().fold(0.0, f32::max);

        let (cycles, cycles_truncated) = simple_cycles(&adjacency, max_cycles);
        if cycles_truncated {
            warn!("[Analysis] Cycle enumeration stopped at {} cycles", max_cycles);
        }
        let circumference = cycles.iter().map(Vec::len).max();
        let girth = cycles.iter().map(Vec::len).min();

        let properties = Self {
            node_count: layer.node_count(),
            edge_count: layer.edge_count(),
            total_length: layer.total_edge_length(),
            eccentricities,
            radius,
            diameter,
            cycles,
            circumference,
            girth,
            cycles_truncated,
        };
        debug!(
            "[Analysis] {} nodes, {} edges, length {:.1}, radius {:.1}, diameter {:.1}, {} cycles",
            properties.node_count,
            properties.edge_count,
            properties.total_length,
            properties.radius,
            properties.diameter,
            properties.cycles.len()
        );
        properties
    }
}

/// Simple cycles of an undirected graph, each reported once.
///
/// Every cycle is rooted at its smallest node and grown through larger
/// nodes only, with an explicit stack of partial paths. Each cycle is then
/// found once per direction; the copy whose second node exceeds its last
/// node is the reverse ordering and is dropped.
fn simple_cycles(adjacency: &[Vec<(usize, f32)>], max_cycles: usize) -> (Vec<Vec<NodeId>>, bool) {
    let mut cycles = Vec::new();

    for root in 0..adjacency.len() {
        let mut stack: Vec<Vec<usize>> = vec![vec![root]];
        while let Some(path) = stack.pop() {
            let Some(&last) = path.last() else {
                continue;
            };
            for &(next, _) in &adjacency[last] {
                if next == root && path.len() >= 3 {
                    if path[1] < path[path.len() - 1] {
                        cycles.push(path.iter().map(|&i| NodeId(i as u32)).collect());
                        if cycles.len() >= max_cycles {
                            return (cycles, true);
                        }
                    }
                } else if next > root && !path.contains(&next) {
                    let mut extended = path.clone();
                    extended.push(next);
                    stack.push(extended);
                }
            }
        }
    }
    (cycles, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::WorldPoint;
    use crate::graph::NodeType;
    use approx::assert_relative_eq;

    /// Unit square 0-1-2-3 with a tail 2-4.
    fn square_with_tail() -> GraphLayer {
        let mut layer = GraphLayer::new();
        let points = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (3.0, 1.0)];
        let ids: Vec<NodeId> = points
            .iter()
            .map(|&(x, y)| layer.add_node(WorldPoint::new(x, y), NodeType::Regular))
            .collect();
        for (a, b) in [(0, 1), (1, 2), (2, 3), (3, 0), (2, 4)] {
            layer.connect(ids[a], ids[b]);
        }
        layer
    }

    #[test]
    fn test_counts_and_distances() {
        let properties = GraphProperties::analyze(&square_with_tail(), DEFAULT_MAX_CYCLES);
        assert_eq!(properties.node_count, 5);
        assert_eq!(properties.edge_count, 5);
        assert_relative_eq!(properties.total_length, 6.0);
        // Node 0 to node 4: 0-1-2-4 = 4.
        assert_relative_eq!(properties.eccentricities[0].unwrap(), 4.0);
        assert_relative_eq!(properties.radius, 2.0);
        assert_relative_eq!(properties.diameter, 4.0);
    }

    #[test]
    fn test_single_cycle_deduplicated() {
        let properties = GraphProperties::analyze(&square_with_tail(), DEFAULT_MAX_CYCLES);
        assert_eq!(properties.cycles.len(), 1);
        assert_eq!(properties.girth, Some(4));
        assert_eq!(properties.circumference, Some(4));
    }

    #[test]
    fn test_two_triangles_sharing_an_edge() {
        // 0-1-2 and 0-2-3 share 0-2: cycles of length 3, 3 and 4.
        let adjacency = vec![
            vec![(1, 1.0), (2, 1.0), (3, 1.0)],
            vec![(0, 1.0), (2, 1.0)],
            vec![(0, 1.0), (1, 1.0), (3, 1.0)],
            vec![(0, 1.0), (2, 1.0)],
        ];
        let (cycles, truncated) = simple_cycles(&adjacency, DEFAULT_MAX_CYCLES);
        assert!(!truncated);
        let mut lengths: Vec<usize> = cycles.iter().map(Vec::len).collect();
        lengths.sort_unstable();
        assert_eq!(lengths, vec![3, 3, 4]);

        let (capped, truncated) = simple_cycles(&adjacency, 1);
        assert!(truncated);
        assert_eq!(capped.len(), 1);
    }

    #[test]
    fn test_tree_has_no_cycles() {
        let mut layer = GraphLayer::new();
        let a = layer.add_node(WorldPoint::ZERO, NodeType::DeadEnd);
        let b = layer.add_node(WorldPoint::new(1.0, 0.0), NodeType::DeadEnd);
        layer.connect(a, b);
        let properties = GraphProperties::analyze(&layer, DEFAULT_MAX_CYCLES);
        assert!(properties.cycles.is_empty());
        assert_eq!(properties.girth, None);
    }
}
