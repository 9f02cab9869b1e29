//! Node types for the road graph.

use serde::{Deserialize, Serialize};

use crate::core::{AgentId, WorldPoint};

/// Dense node index, unique within one graph layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Index into the layer's node arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub(crate) fn from_index(index: usize) -> Self {
        NodeId(index as u32)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Role of a node in the road graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    /// Ridge node of the skeleton or a subdivision point.
    Regular,
    /// Node with a single neighbour at the end of a corridor.
    DeadEnd,
    /// Anchor at a concave wall corner; never traversed.
    Corner,
    /// Node derived from a local maximum of the distance field (room centre).
    Hump,
    /// Projected future agent position, retracted every tick.
    Temporary,
}

impl NodeType {
    /// Tag used in road-map files.
    pub fn tag(self) -> &'static str {
        match self {
            NodeType::Regular => "regular",
            NodeType::DeadEnd => "dead_end",
            NodeType::Corner => "corner",
            NodeType::Hump => "hump",
            NodeType::Temporary => "temporary",
        }
    }

    /// Parse a road-map file tag. Temporary nodes are never persisted.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "regular" | "0" => Some(NodeType::Regular),
            "dead_end" | "deadend" | "1" => Some(NodeType::DeadEnd),
            "corner" | "2" => Some(NodeType::Corner),
            "hump" | "3" => Some(NodeType::Hump),
            _ => None,
        }
    }

    /// Whether search, projection and path finding may pass through this node.
    #[inline]
    pub fn is_traversable(self) -> bool {
        self != NodeType::Corner
    }

    /// SVG fill colour.
    pub fn svg_color(self) -> &'static str {
        match self {
            NodeType::Regular => "blue",
            NodeType::DeadEnd => "orange",
            NodeType::Corner => "gray",
            NodeType::Hump => "green",
            NodeType::Temporary => "red",
        }
    }
}

/// Occupancy-risk annotation placed by the trajectory projector.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeAnnotation {
    /// Guard whose projected position this is.
    pub agent: AgentId,
    /// Occupancy risk in [0, 1].
    pub probability: f32,
}

/// A node in a road graph layer.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
    /// Unique id within the layer.
    pub id: NodeId,
    /// Position in map coordinates.
    pub position: WorldPoint,
    /// Node role.
    pub node_type: NodeType,
    /// Ordered neighbour list; always symmetric with the neighbours' lists.
    pub(crate) neighbors: Vec<NodeId>,
    /// Projected-occupancy annotation (temporary or projector-tagged nodes).
    pub annotation: Option<NodeAnnotation>,
}

impl GraphNode {
    /// Create an unconnected node.
    pub fn new(id: NodeId, position: WorldPoint, node_type: NodeType) -> Self {
        Self {
            id,
            position,
            node_type,
            neighbors: Vec::new(),
            annotation: None,
        }
    }

    /// Neighbour ids in insertion order.
    #[inline]
    pub fn neighbors(&self) -> &[NodeId] {
        &self.neighbors
    }

    /// Number of neighbours.
    #[inline]
    pub fn degree(&self) -> usize {
        self.neighbors.len()
    }

    /// Annotated probability, zero when unannotated.
    #[inline]
    pub fn probability(&self) -> f32 {
        self.annotation.map_or(0.0, |a| a.probability)
    }

    /// Check if this is a temporary node.
    #[inline]
    pub fn is_temporary(&self) -> bool {
        self.node_type == NodeType::Temporary
    }

    /// Check if traversal may pass through this node.
    #[inline]
    pub fn is_traversable(&self) -> bool {
        self.node_type.is_traversable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_roundtrip() {
        for t in [
            NodeType::Regular,
            NodeType::DeadEnd,
            NodeType::Corner,
            NodeType::Hump,
        ] {
            assert_eq!(NodeType::from_tag(t.tag()), Some(t));
        }
        assert_eq!(NodeType::from_tag("temporary"), None);
        assert_eq!(NodeType::from_tag(" Corner "), Some(NodeType::Corner));
    }

    #[test]
    fn test_corner_not_traversable() {
        let node = GraphNode::new(NodeId(0), WorldPoint::ZERO, NodeType::Corner);
        assert!(!node.is_traversable());
        assert_eq!(node.probability(), 0.0);
    }
}
