//! Read-only view of a graph layer for external visualisation.

use serde::{Deserialize, Serialize};

use super::layer::GraphLayer;
use super::node::NodeType;
use crate::core::{AgentId, Bounds, WorldPoint};

/// Node entry of a [`GraphSnapshot`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: u32,
    pub position: WorldPoint,
    pub node_type: NodeType,
    /// Projected occupancy, if annotated.
    pub probability: Option<f32>,
}

/// Edge entry of a [`GraphSnapshot`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub a: u32,
    pub b: u32,
    pub probability: f32,
    /// Arm positions towards `a` and `b`.
    pub arms: (WorldPoint, WorldPoint),
    pub observed: bool,
    pub searchable: bool,
    pub planned_by: Vec<AgentId>,
}

/// Node positions, edges and current probabilities of one layer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<NodeSnapshot>,
    pub edges: Vec<EdgeSnapshot>,
}

impl GraphSnapshot {
    /// Capture the current state of a layer.
    pub fn capture(layer: &GraphLayer) -> Self {
        let nodes = layer
            .nodes()
            .iter()
            .map(|n| NodeSnapshot {
                id: n.id.0,
                position: n.position,
                node_type: n.node_type,
                probability: n.annotation.map(|a| a.probability),
            })
            .collect();
        let edges = layer
            .edges()
            .map(|e| EdgeSnapshot {
                a: e.key.low().0,
                b: e.key.high().0,
                probability: e.segment.probability(),
                arms: e.segment.arms(),
                observed: e.segment.is_observed(),
                searchable: e.searchable,
                planned_by: e.planned_by.clone(),
            })
            .collect();
        Self { nodes, edges }
    }

    /// Extent of all node positions.
    pub fn bounds(&self) -> Bounds {
        Bounds::from_points(self.nodes.iter().map(|n| &n.position))
    }

    /// Position of a node by id.
    pub fn position(&self, id: u32) -> Option<WorldPoint> {
        self.nodes.get(id as usize).map(|n| n.position)
    }
}
