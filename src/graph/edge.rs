//! Undirected road edges.

use serde::{Deserialize, Serialize};

use super::node::NodeId;
use super::segment::SearchSegment;
use crate::core::{AgentId, WorldPoint};

/// Unordered node pair, stored smaller id first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKey(NodeId, NodeId);

impl EdgeKey {
    /// Create a key; the order of `a` and `b` does not matter.
    #[inline]
    pub fn new(a: NodeId, b: NodeId) -> Self {
        if a <= b { EdgeKey(a, b) } else { EdgeKey(b, a) }
    }

    /// Smaller endpoint.
    #[inline]
    pub fn low(self) -> NodeId {
        self.0
    }

    /// Larger endpoint.
    #[inline]
    pub fn high(self) -> NodeId {
        self.1
    }

    /// Check if `node` is an endpoint.
    #[inline]
    pub fn touches(self, node: NodeId) -> bool {
        self.0 == node || self.1 == node
    }

    /// The endpoint that is not `node`.
    #[inline]
    pub fn other(self, node: NodeId) -> Option<NodeId> {
        if self.0 == node {
            Some(self.1)
        } else if self.1 == node {
            Some(self.0)
        } else {
            None
        }
    }
}

impl std::fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.0, self.1)
    }
}

/// Edge between two nodes with its search segment.
#[derive(Clone, Debug, PartialEq)]
pub struct RoadEdge {
    /// Endpoints.
    pub key: EdgeKey,
    /// Euclidean length.
    pub length: f32,
    /// Guards currently planning to traverse this edge.
    pub planned_by: Vec<AgentId>,
    /// Probability state; arm A runs towards `key.low()`, arm B towards `key.high()`.
    pub segment: SearchSegment,
    /// Cleared for edges touching a corner node; such segments never carry probability.
    pub searchable: bool,
}

impl RoadEdge {
    /// Create an edge between positioned endpoints.
    pub fn new(key: EdgeKey, low: WorldPoint, high: WorldPoint, now: f32) -> Self {
        Self {
            key,
            length: low.distance(&high),
            planned_by: Vec::new(),
            segment: SearchSegment::new(low, high, now),
            searchable: true,
        }
    }

    /// Check if an agent other than `agent` has claimed this edge.
    pub fn claimed_by_other(&self, agent: AgentId) -> bool {
        self.planned_by.iter().any(|&a| a != agent)
    }
}
