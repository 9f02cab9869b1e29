//! Flat node + edge table.
//!
//! This is the interchange form between the skeleton extractor, the
//! road-map file and [`RoadGraph`](super::RoadGraph).

use serde::{Deserialize, Serialize};

use super::node::NodeType;
use crate::core::WorldPoint;

/// One row of the node table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoadMapNode {
    /// Position in map coordinates.
    pub position: WorldPoint,
    /// Persisted node role.
    pub node_type: NodeType,
}

/// Node table plus undirected edge list of 0-based index pairs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoadMap {
    /// Nodes in file order.
    pub nodes: Vec<RoadMapNode>,
    /// Edges with the smaller index first, unique.
    pub edges: Vec<(usize, usize)>,
}

impl RoadMap {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node and return its index.
    pub fn push_node(&mut self, position: WorldPoint, node_type: NodeType) -> usize {
        self.nodes.push(RoadMapNode {
            position,
            node_type,
        });
        self.nodes.len() - 1
    }

    /// Add an undirected edge.
    ///
    /// Self-loops, out-of-range indices and duplicates are rejected.
    pub fn push_edge(&mut self, a: usize, b: usize) -> bool {
        if a == b || a >= self.nodes.len() || b >= self.nodes.len() {
            return false;
        }
        let edge = (a.min(b), a.max(b));
        if self.edges.contains(&edge) {
            return false;
        }
        self.edges.push(edge);
        true
    }

    /// Number of nodes.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Check if the table has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Neighbour indices of every node.
    pub fn adjacency(&self) -> Vec<Vec<usize>> {
        let mut adjacency = vec![Vec::new(); self.nodes.len()];
        for &(a, b) in &self.edges {
            adjacency[a].push(b);
            adjacency[b].push(a);
        }
        adjacency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_edge_rejects_invalid() {
        let mut map = RoadMap::new();
        let a = map.push_node(WorldPoint::ZERO, NodeType::DeadEnd);
        let b = map.push_node(WorldPoint::new(1.0, 0.0), NodeType::DeadEnd);
        assert!(map.push_edge(b, a));
        assert_eq!(map.edges, vec![(0, 1)]);
        assert!(!map.push_edge(a, b));
        assert!(!map.push_edge(a, a));
        assert!(!map.push_edge(a, 5));
        assert_eq!(map.adjacency(), vec![vec![1], vec![0]]);
    }
}
