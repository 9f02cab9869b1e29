//! One node/edge collection of the road graph.
//!
//! A layer owns a dense node arena and an ordered edge table. Permanent
//! nodes occupy ids `0..permanent_count`; temporary nodes inserted by the
//! trajectory projector are appended after them and every change they cause
//! is journaled so that [`GraphLayer::clear_temporary_nodes`] can restore the
//! permanent graph exactly, neighbour order included.

use std::collections::BTreeMap;

use log::trace;

use super::edge::{EdgeKey, RoadEdge};
use super::node::{GraphNode, NodeAnnotation, NodeId, NodeType};
use super::segment::SearchSegment;
use crate::core::WorldPoint;
use crate::core::geometry::{cosine_between, project_onto_segment};
use crate::world::LineOfSight;

/// Annotated probability at or above which a node is treated as occupied.
pub const NEAR_CERTAIN: f32 = 0.99;

/// Perpendicular projection of a point onto a layer edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeProjection {
    /// Edge projected onto.
    pub edge: EdgeKey,
    /// Closest point on the edge.
    pub point: WorldPoint,
    /// Parameter along the edge from `edge.low()` (0) to `edge.high()` (1).
    pub t: f32,
    /// Distance from the query point.
    pub distance: f32,
}

/// Undo record for a temporary change.
#[derive(Clone, Debug)]
enum JournalEntry {
    Split {
        a: NodeId,
        b: NodeId,
        node: NodeId,
        original: RoadEdge,
    },
    Annotate {
        node: NodeId,
        previous: Option<NodeAnnotation>,
    },
}

/// Node arena plus edge table.
#[derive(Clone, Debug, Default)]
pub struct GraphLayer {
    nodes: Vec<GraphNode>,
    edges: BTreeMap<EdgeKey, RoadEdge>,
    permanent_count: usize,
    journal: Vec<JournalEntry>,
}

impl GraphLayer {
    /// Create an empty layer.
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Number of nodes, temporary nodes included.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of permanent nodes.
    #[inline]
    pub fn permanent_node_count(&self) -> usize {
        self.permanent_count
    }

    /// Number of edges.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Check if the layer has no nodes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check if temporary nodes or annotations are pending retraction.
    #[inline]
    pub fn has_temporary_changes(&self) -> bool {
        !self.journal.is_empty()
    }

    /// All nodes in id order.
    #[inline]
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Get a node by id.
    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.nodes.get(id.index())
    }

    /// Position of a node.
    #[inline]
    pub fn position(&self, id: NodeId) -> Option<WorldPoint> {
        self.node(id).map(|n| n.position)
    }

    /// Neighbours of a node (empty for unknown ids).
    pub fn neighbors(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map_or(&[], |n| n.neighbors())
    }

    /// Check if a node exists and may be traversed.
    pub fn is_traversable(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|n| n.is_traversable())
    }

    /// Iterate over edges in key order.
    pub fn edges(&self) -> impl Iterator<Item = &RoadEdge> {
        self.edges.values()
    }

    /// Iterate mutably over edges in key order.
    pub fn edges_mut(&mut self) -> impl Iterator<Item = &mut RoadEdge> {
        self.edges.values_mut()
    }

    /// Edge keys in order.
    pub fn edge_keys(&self) -> Vec<EdgeKey> {
        self.edges.keys().copied().collect()
    }

    /// Get the edge between two nodes.
    pub fn edge(&self, a: NodeId, b: NodeId) -> Option<&RoadEdge> {
        self.edges.get(&EdgeKey::new(a, b))
    }

    /// Get an edge by key.
    pub fn edge_by_key(&self, key: EdgeKey) -> Option<&RoadEdge> {
        self.edges.get(&key)
    }

    /// Get an edge mutably by key.
    pub fn edge_by_key_mut(&mut self, key: EdgeKey) -> Option<&mut RoadEdge> {
        self.edges.get_mut(&key)
    }

    /// Check whether `a` and `b` are connected.
    pub fn contains_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.edges.contains_key(&EdgeKey::new(a, b))
    }

    /// Length of the longest edge (0 for an edgeless layer).
    pub fn max_edge_length(&self) -> f32 {
        self.edges.values().map(|e| e.length).fold(0.0, f32::max)
    }

    /// Sum of all edge lengths.
    pub fn total_edge_length(&self) -> f32 {
        self.edges.values().map(|e| e.length).sum()
    }

    /// Searchable edges sharing an endpoint with `key`.
    pub fn edge_neighbors(&self, key: EdgeKey) -> Vec<EdgeKey> {
        let mut result = Vec::new();
        for end in [key.low(), key.high()] {
            if !self.is_traversable(end) {
                continue;
            }
            for &n in self.neighbors(end) {
                let other = EdgeKey::new(end, n);
                if other != key
                    && !result.contains(&other)
                    && self.edges.get(&other).is_some_and(|e| e.searchable)
                {
                    result.push(other);
                }
            }
        }
        result
    }

    /// Adjacency list over traversable nodes: `adj[i] = [(j, length), ...]`.
    pub fn weighted_adjacency(&self) -> Vec<Vec<(usize, f32)>> {
        let mut adjacency = vec![Vec::new(); self.nodes.len()];
        for edge in self.edges.values() {
            let (a, b) = (edge.key.low(), edge.key.high());
            if self.is_traversable(a) && self.is_traversable(b) {
                adjacency[a.index()].push((b.index(), edge.length));
                adjacency[b.index()].push((a.index(), edge.length));
            }
        }
        adjacency
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Add a permanent node. Pending temporary changes are retracted first.
    pub fn add_node(&mut self, position: WorldPoint, node_type: NodeType) -> NodeId {
        if self.has_temporary_changes() {
            self.clear_temporary_nodes();
        }
        let id = self.push_node(position, node_type);
        self.permanent_count = self.nodes.len();
        id
    }

    fn push_node(&mut self, position: WorldPoint, node_type: NodeType) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(GraphNode::new(id, position, node_type));
        id
    }

    /// Connect two existing nodes.
    ///
    /// Returns `false` for unknown ids, self-loops or existing edges.
    pub fn connect(&mut self, a: NodeId, b: NodeId) -> bool {
        if a == b || self.node(a).is_none() || self.node(b).is_none() || self.contains_edge(a, b) {
            return false;
        }
        self.nodes[a.index()].neighbors.push(b);
        self.nodes[b.index()].neighbors.push(a);
        let edge = self.make_edge(a, b);
        self.edges.insert(edge.key, edge);
        true
    }

    fn make_edge(&self, a: NodeId, b: NodeId) -> RoadEdge {
        let key = EdgeKey::new(a, b);
        let low = &self.nodes[key.low().index()];
        let high = &self.nodes[key.high().index()];
        let mut edge = RoadEdge::new(key, low.position, high.position, 0.0);
        edge.searchable = low.is_traversable() && high.is_traversable();
        edge
    }

    /// Remove the edge between two nodes in both directions.
    pub fn disconnect(&mut self, a: NodeId, b: NodeId) -> Option<RoadEdge> {
        let edge = self.edges.remove(&EdgeKey::new(a, b))?;
        self.nodes[a.index()].neighbors.retain(|&n| n != b);
        self.nodes[b.index()].neighbors.retain(|&n| n != a);
        Some(edge)
    }

    /// Split the edge `a`-`b` with a new node at `position`.
    ///
    /// The new node takes the place of `b` in `a`'s neighbour list and of `a`
    /// in `b`'s, and both halves inherit the old segment's probability.
    /// [`NodeType::Temporary`] nodes are journaled for retraction; other types
    /// become permanent. Returns `None` if the edge does not exist.
    pub fn insert_node_between(
        &mut self,
        a: NodeId,
        b: NodeId,
        position: WorldPoint,
        node_type: NodeType,
    ) -> Option<NodeId> {
        if !self.contains_edge(a, b) {
            return None;
        }
        let temporary = node_type == NodeType::Temporary;
        if !temporary && self.has_temporary_changes() {
            self.clear_temporary_nodes();
            if !self.contains_edge(a, b) {
                return None;
            }
        }

        let original = self.edges.remove(&EdgeKey::new(a, b))?;
        let node = self.push_node(position, node_type);
        replace_neighbor(&mut self.nodes[a.index()].neighbors, b, node);
        replace_neighbor(&mut self.nodes[b.index()].neighbors, a, node);
        self.nodes[node.index()].neighbors = vec![a, b];

        for end in [a, b] {
            let mut edge = self.make_edge(end, node);
            inherit_segment(&mut edge.segment, &original.segment);
            edge.searchable &= original.searchable;
            self.edges.insert(edge.key, edge);
        }

        if temporary {
            trace!("[RoadMap] Temporary node {} between {} and {}", node, a, b);
            self.journal.push(JournalEntry::Split {
                a,
                b,
                node,
                original,
            });
        } else {
            self.permanent_count = self.nodes.len();
        }
        Some(node)
    }

    /// Annotate a node with a projected occupancy.
    ///
    /// Annotations on permanent nodes are journaled and reverted by
    /// [`clear_temporary_nodes`](Self::clear_temporary_nodes).
    pub fn annotate(&mut self, id: NodeId, annotation: NodeAnnotation) -> bool {
        let Some(node) = self.nodes.get_mut(id.index()) else {
            return false;
        };
        if id.index() < self.permanent_count {
            self.journal.push(JournalEntry::Annotate {
                node: id,
                previous: node.annotation,
            });
        }
        node.annotation = Some(annotation);
        true
    }

    /// Retract every temporary node and annotation.
    ///
    /// Safe to call when nothing is pending. Returns the number of
    /// temporary nodes removed.
    pub fn clear_temporary_nodes(&mut self) -> usize {
        let removed = self.nodes.len() - self.permanent_count;
        while let Some(entry) = self.journal.pop() {
            match entry {
                JournalEntry::Split {
                    a,
                    b,
                    node,
                    original,
                } => {
                    self.edges.remove(&EdgeKey::new(a, node));
                    self.edges.remove(&EdgeKey::new(node, b));
                    replace_neighbor(&mut self.nodes[a.index()].neighbors, node, b);
                    replace_neighbor(&mut self.nodes[b.index()].neighbors, node, a);
                    self.edges.insert(original.key, original);
                }
                JournalEntry::Annotate { node, previous } => {
                    if let Some(n) = self.nodes.get_mut(node.index()) {
                        n.annotation = previous;
                    }
                }
            }
        }
        self.nodes.truncate(self.permanent_count);
        if removed > 0 {
            trace!("[RoadMap] Cleared {} temporary nodes", removed);
        }
        removed
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Nearest visible node of a type.
    ///
    /// `node_type = None` matches every traversable node; corner nodes are
    /// only returned when asked for explicitly. Nodes annotated as near
    /// certainly occupied are skipped, as are nodes farther than `radius`.
    pub fn closest_node<L: LineOfSight + ?Sized>(
        &self,
        point: WorldPoint,
        node_type: Option<NodeType>,
        radius: Option<f32>,
        sight: &L,
    ) -> Option<NodeId> {
        let radius_sq = radius.map(|r| r * r);
        self.nodes
            .iter()
            .filter(|n| match node_type {
                Some(t) => n.node_type == t,
                None => n.is_traversable(),
            })
            .filter(|n| n.probability() < NEAR_CERTAIN)
            .map(|n| (n, n.position.distance_squared(&point)))
            .filter(|&(_, d)| radius_sq.is_none_or(|r| d <= r))
            .filter(|(n, _)| sight.has_line_of_sight(point, n.position))
            .min_by(|x, y| x.1.total_cmp(&y.1))
            .map(|(n, _)| n.id)
    }

    /// Nearest visible perpendicular projection onto a searchable edge.
    ///
    /// With a `direction`, every edge whose distance is within
    /// `direction_tolerance` of the minimum competes on alignment instead:
    /// the edge whose orientation best matches the direction (in either
    /// sense) wins.
    pub fn closest_point_on_edges<L: LineOfSight + ?Sized>(
        &self,
        point: WorldPoint,
        direction: Option<WorldPoint>,
        direction_tolerance: f32,
        sight: &L,
    ) -> Option<EdgeProjection> {
        let candidates: Vec<EdgeProjection> = self
            .edges
            .values()
            .filter(|e| e.searchable)
            .filter_map(|e| {
                let a = self.nodes[e.key.low().index()].position;
                let b = self.nodes[e.key.high().index()].position;
                let proj = project_onto_segment(point, a, b);
                sight
                    .has_line_of_sight(point, proj.point)
                    .then_some(EdgeProjection {
                        edge: e.key,
                        point: proj.point,
                        t: proj.t,
                        distance: proj.distance,
                    })
            })
            .collect();

        let nearest = candidates
            .iter()
            .min_by(|x, y| x.distance.total_cmp(&y.distance))
            .copied()?;

        let Some(direction) = direction.filter(|d| d.length() > f32::EPSILON) else {
            return Some(nearest);
        };

        candidates
            .into_iter()
            .filter(|c| c.distance <= nearest.distance + direction_tolerance)
            .map(|c| {
                let axis = self.nodes[c.edge.high().index()].position
                    - self.nodes[c.edge.low().index()].position;
                (c, cosine_between(axis, direction).abs())
            })
            .max_by(|x, y| x.1.total_cmp(&y.1).then(y.0.distance.total_cmp(&x.0.distance)))
            .map(|(c, _)| c)
    }
}

fn replace_neighbor(list: &mut [NodeId], from: NodeId, to: NodeId) {
    if let Some(slot) = list.iter_mut().find(|n| **n == from) {
        *slot = to;
    }
}

fn inherit_segment(segment: &mut SearchSegment, from: &SearchSegment) {
    segment.set_probability(from.probability());
    if from.is_propagated() {
        segment.mark_propagated();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::OpenSight;

    /// 0 --- 1 --- 2 on the x axis, 3 above 1, a corner at 4.
    fn layer() -> GraphLayer {
        let mut layer = GraphLayer::new();
        let a = layer.add_node(WorldPoint::new(0.0, 0.0), NodeType::DeadEnd);
        let b = layer.add_node(WorldPoint::new(4.0, 0.0), NodeType::Regular);
        let c = layer.add_node(WorldPoint::new(8.0, 0.0), NodeType::DeadEnd);
        let d = layer.add_node(WorldPoint::new(4.0, 4.0), NodeType::DeadEnd);
        let corner = layer.add_node(WorldPoint::new(8.0, 4.0), NodeType::Corner);
        layer.connect(a, b);
        layer.connect(b, c);
        layer.connect(b, d);
        layer.connect(c, corner);
        layer
    }

    fn assert_symmetric(layer: &GraphLayer) {
        for node in layer.nodes() {
            for &n in node.neighbors() {
                assert!(layer.neighbors(n).contains(&node.id), "{} -> {}", node.id, n);
                assert!(layer.contains_edge(node.id, n));
            }
        }
        let degree_sum: usize = layer.nodes().iter().map(|n| n.degree()).sum();
        assert_eq!(degree_sum, 2 * layer.edge_count());
    }

    #[test]
    fn test_connect_is_symmetric() {
        let mut layer = layer();
        assert_symmetric(&layer);
        assert!(!layer.connect(NodeId(0), NodeId(1)));
        assert!(!layer.connect(NodeId(0), NodeId(0)));
        assert!(!layer.connect(NodeId(0), NodeId(42)));
        layer.disconnect(NodeId(1), NodeId(3));
        assert!(!layer.neighbors(NodeId(3)).contains(&NodeId(1)));
        assert!(!layer.neighbors(NodeId(1)).contains(&NodeId(3)));
        assert_symmetric(&layer);
    }

    #[test]
    fn test_corner_edges_not_searchable() {
        let layer = layer();
        assert!(!layer.edge(NodeId(2), NodeId(4)).unwrap().searchable);
        let neighbors = layer.edge_neighbors(EdgeKey::new(NodeId(1), NodeId(2)));
        assert_eq!(neighbors.len(), 2);
        assert!(!neighbors.iter().any(|k| k.touches(NodeId(4))));
    }

    #[test]
    fn test_temporary_split_and_clear() {
        let mut layer = layer();
        let before_nodes = layer.nodes().to_vec();
        let before_edges = layer.edge_keys();

        let t1 = layer
            .insert_node_between(NodeId(0), NodeId(1), WorldPoint::new(2.0, 0.0), NodeType::Temporary)
            .unwrap();
        let t2 = layer
            .insert_node_between(t1, NodeId(1), WorldPoint::new(3.0, 0.0), NodeType::Temporary)
            .unwrap();
        layer.annotate(
            NodeId(1),
            NodeAnnotation {
                agent: crate::core::AgentId(1),
                probability: 0.5,
            },
        );
        assert_eq!(layer.node_count(), 7);
        assert!(!layer.contains_edge(NodeId(0), NodeId(1)));
        assert!(layer.contains_edge(t2, NodeId(1)));
        assert_eq!(layer.neighbors(NodeId(1))[0], t2);
        assert_symmetric(&layer);

        assert_eq!(layer.clear_temporary_nodes(), 2);
        assert_eq!(layer.nodes(), &before_nodes[..]);
        assert_eq!(layer.edge_keys(), before_edges);

        assert_eq!(layer.clear_temporary_nodes(), 0);
        assert_eq!(layer.nodes(), &before_nodes[..]);
    }

    #[test]
    fn test_split_missing_edge() {
        let mut layer = layer();
        assert!(
            layer
                .insert_node_between(NodeId(0), NodeId(2), WorldPoint::ZERO, NodeType::Temporary)
                .is_none()
        );
    }

    #[test]
    fn test_permanent_add_clears_temporaries() {
        let mut layer = layer();
        layer.insert_node_between(NodeId(0), NodeId(1), WorldPoint::new(1.0, 0.0), NodeType::Temporary);
        let id = layer.add_node(WorldPoint::new(9.0, 9.0), NodeType::Regular);
        assert_eq!(id, NodeId(5));
        assert!(layer.contains_edge(NodeId(0), NodeId(1)));
        assert!(!layer.has_temporary_changes());
    }

    #[test]
    fn test_closest_node_filters() {
        let mut layer = layer();
        let p = WorldPoint::new(7.5, 3.0);
        assert_eq!(layer.closest_node(p, None, None, &OpenSight), Some(NodeId(2)));
        assert_eq!(
            layer.closest_node(p, Some(NodeType::Corner), None, &OpenSight),
            Some(NodeId(4))
        );
        assert_eq!(layer.closest_node(p, None, Some(1.0), &OpenSight), None);

        layer.annotate(
            NodeId(2),
            NodeAnnotation {
                agent: crate::core::AgentId(0),
                probability: 0.995,
            },
        );
        assert_ne!(layer.closest_node(p, None, None, &OpenSight), Some(NodeId(2)));
    }

    #[test]
    fn test_closest_point_directional() {
        let layer = layer();
        // Equidistant from edge 0-1 (horizontal) and 1-3 (vertical).
        let p = WorldPoint::new(3.0, 1.0);
        let vertical = layer
            .closest_point_on_edges(p, Some(WorldPoint::new(0.0, 1.0)), 0.05, &OpenSight)
            .unwrap();
        assert_eq!(vertical.edge, EdgeKey::new(NodeId(1), NodeId(3)));
        let horizontal = layer
            .closest_point_on_edges(p, Some(WorldPoint::new(1.0, 0.0)), 0.05, &OpenSight)
            .unwrap();
        assert_eq!(horizontal.edge, EdgeKey::new(NodeId(0), NodeId(1)));
        assert_eq!(horizontal.point, WorldPoint::new(3.0, 0.0));
    }
}
