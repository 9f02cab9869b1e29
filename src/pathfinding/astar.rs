//! A* search over a road graph layer.
//!
//! Supports:
//! - Euclidean edge costs with a squared or plain Euclidean heuristic
//! - A per-call risk ceiling pruning nodes annotated above it
//! - Best-effort partial paths when the goal is unreachable

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use super::smoothing::simplify_path;
use crate::core::WorldPoint;
use crate::core::geometry::path_length;
use crate::graph::{GraphLayer, NodeId};
use crate::world::LineOfSight;

/// Distance estimate from a node to the goal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    /// Squared straight-line distance. Cheap and greedy; paths may be
    /// slightly longer than optimal.
    #[default]
    SquaredEuclidean,
    /// Straight-line distance. Admissible, so paths are optimal.
    Euclidean,
}

impl Heuristic {
    #[inline]
    fn estimate(self, from: WorldPoint, to: WorldPoint) -> f32 {
        match self {
            Heuristic::SquaredEuclidean => from.distance_squared(&to),
            Heuristic::Euclidean => from.distance(&to),
        }
    }
}

/// A node in the open set.
#[derive(Clone, Copy, Debug)]
struct OpenNode {
    node: NodeId,
    g_cost: f32,
    f_cost: f32,
    /// Insertion order, breaks f-cost ties first-in first-out.
    sequence: u64,
}

impl Eq for OpenNode {}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.sequence == other.sequence
    }
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior
        other
            .f_cost
            .total_cmp(&self.f_cost)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AStarConfig {
    /// Heuristic used to order the open set.
    /// Default: SquaredEuclidean
    pub heuristic: Heuristic,

    /// Maximum number of node expansions before giving up.
    /// Default: 100000
    pub max_iterations: usize,

    /// Remove intermediate points that lie within this distance of the
    /// line joining their mutually visible neighbours. Zero disables.
    /// Default: 0.25
    pub simplify_tolerance: f32,
}

impl Default for AStarConfig {
    fn default() -> Self {
        Self {
            heuristic: Heuristic::SquaredEuclidean,
            max_iterations: 100_000,
            simplify_tolerance: 0.25,
        }
    }
}

impl AStarConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter for the heuristic.
    pub fn with_heuristic(mut self, heuristic: Heuristic) -> Self {
        self.heuristic = heuristic;
        self
    }

    /// Builder-style setter for the expansion limit.
    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Builder-style setter for the simplification tolerance.
    pub fn with_simplify_tolerance(mut self, tolerance: f32) -> Self {
        self.simplify_tolerance = tolerance;
        self
    }
}

/// Reason for path failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathFailure {
    /// Start or goal does not exist (or no node near the requested point).
    InvalidNode,
    /// Start or goal is a corner node.
    NotTraversable,
    /// Open set emptied before the goal was popped.
    NoPath,
    /// Maximum iterations exceeded.
    MaxIterationsExceeded,
}

/// Result of a path request.
///
/// A failed search still carries the best-effort path to the explored node
/// closest to the goal.
#[derive(Clone, Debug, Default)]
pub struct PathResult {
    /// Node ids from start to the reached node. Always the graph route,
    /// even when `points` come from the fallback planner.
    pub nodes: Vec<NodeId>,
    /// Simplified waypoints.
    pub points: Vec<WorldPoint>,
    /// Edge length along `nodes`, or the fallback polyline length when the
    /// fallback planner supplied `points`.
    pub cost: f32,
    /// Number of nodes expanded during search.
    pub nodes_expanded: usize,
    /// Whether the goal was reached.
    pub success: bool,
    /// Reason for failure (if any).
    pub failure_reason: Option<PathFailure>,
    /// Clock time at which the failure was recorded.
    pub failed_at: Option<f32>,
}

impl PathResult {
    /// Create a failed result with no path.
    pub fn failed(reason: PathFailure, nodes_expanded: usize) -> Self {
        Self {
            nodes_expanded,
            failure_reason: Some(reason),
            ..Default::default()
        }
    }

    /// Length of the waypoint polyline.
    pub fn length(&self) -> f32 {
        path_length(&self.points)
    }

    /// Check if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A* planner over one graph layer.
pub struct AStarPlanner<'a, L: ?Sized> {
    layer: &'a GraphLayer,
    sight: &'a L,
    config: AStarConfig,
}

impl<'a, L: LineOfSight + ?Sized> AStarPlanner<'a, L> {
    /// Create a new planner.
    pub fn new(layer: &'a GraphLayer, sight: &'a L, config: AStarConfig) -> Self {
        Self {
            layer,
            sight,
            config,
        }
    }

    /// Create with default configuration.
    pub fn with_defaults(layer: &'a GraphLayer, sight: &'a L) -> Self {
        Self::new(layer, sight, AStarConfig::default())
    }

    /// Find a path between two nodes.
    ///
    /// With `risk_ceiling`, nodes whose annotated probability exceeds it are
    /// never entered. The start node is exempt.
    pub fn find_path(&self, start: NodeId, goal: NodeId, risk_ceiling: Option<f32>) -> PathResult {
        trace!(
            "[AStar] find_path: start={} goal={} ceiling={:?}",
            start, goal, risk_ceiling
        );

        let (Some(start_node), Some(goal_node)) = (self.layer.node(start), self.layer.node(goal))
        else {
            debug!("[AStar] FAILED: InvalidNode - start or goal missing");
            return PathResult::failed(PathFailure::InvalidNode, 0);
        };
        if !start_node.is_traversable() || !goal_node.is_traversable() {
            debug!("[AStar] FAILED: NotTraversable - start or goal is a corner");
            return PathResult::failed(PathFailure::NotTraversable, 0);
        }
        let goal_position = goal_node.position;

        let mut open_set = BinaryHeap::new();
        let mut closed_set = HashSet::new();
        let mut came_from: HashMap<NodeId, NodeId> = HashMap::new();
        let mut g_scores: HashMap<NodeId, f32> = HashMap::new();
        let mut sequence = 0u64;

        let h_start = self.config.heuristic.estimate(start_node.position, goal_position);
        open_set.push(OpenNode {
            node: start,
            g_cost: 0.0,
            f_cost: h_start,
            sequence,
        });
        g_scores.insert(start, 0.0);

        // Explored node closest to the goal, for the partial path.
        let mut best = (start, h_start);
        let mut nodes_expanded = 0;

        while let Some(current) = open_set.pop() {
            if current.node == goal {
                return self.build_result(
                    &came_from,
                    start,
                    goal,
                    current.g_cost,
                    nodes_expanded,
                    None,
                );
            }

            if !closed_set.insert(current.node) {
                continue;
            }

            nodes_expanded += 1;
            if nodes_expanded > self.config.max_iterations {
                debug!("[AStar] FAILED: MaxIterationsExceeded ({} nodes)", nodes_expanded);
                return self.partial(
                    &came_from,
                    start,
                    best.0,
                    &g_scores,
                    nodes_expanded,
                    PathFailure::MaxIterationsExceeded,
                );
            }

            let Some(node) = self.layer.node(current.node) else {
                continue;
            };
            let h = self.config.heuristic.estimate(node.position, goal_position);
            if h < best.1 {
                best = (current.node, h);
            }

            for &neighbor_id in node.neighbors() {
                if closed_set.contains(&neighbor_id) {
                    continue;
                }
                let Some(neighbor) = self.layer.node(neighbor_id) else {
                    continue;
                };
                if !neighbor.is_traversable() {
                    continue;
                }
                if risk_ceiling.is_some_and(|ceiling| neighbor.probability() > ceiling) {
                    continue;
                }

                let tentative_g = current.g_cost + node.position.distance(&neighbor.position);
                let current_g = g_scores.get(&neighbor_id).copied().unwrap_or(f32::INFINITY);
                if tentative_g < current_g {
                    came_from.insert(neighbor_id, current.node);
                    g_scores.insert(neighbor_id, tentative_g);

                    sequence += 1;
                    let h = self.config.heuristic.estimate(neighbor.position, goal_position);
                    open_set.push(OpenNode {
                        node: neighbor_id,
                        g_cost: tentative_g,
                        f_cost: tentative_g + h,
                        sequence,
                    });
                }
            }
        }

        debug!(
            "[AStar] FAILED: NoPath after expanding {} nodes, partial path to {}",
            nodes_expanded, best.0
        );
        self.partial(
            &came_from,
            start,
            best.0,
            &g_scores,
            nodes_expanded,
            PathFailure::NoPath,
        )
    }

    fn partial(
        &self,
        came_from: &HashMap<NodeId, NodeId>,
        start: NodeId,
        reached: NodeId,
        g_scores: &HashMap<NodeId, f32>,
        nodes_expanded: usize,
        reason: PathFailure,
    ) -> PathResult {
        let cost = g_scores.get(&reached).copied().unwrap_or(0.0);
        self.build_result(came_from, start, reached, cost, nodes_expanded, Some(reason))
    }

    /// Walk parent links back from `end` and simplify.
    fn build_result(
        &self,
        came_from: &HashMap<NodeId, NodeId>,
        start: NodeId,
        end: NodeId,
        cost: f32,
        nodes_expanded: usize,
        failure: Option<PathFailure>,
    ) -> PathResult {
        let mut nodes = vec![end];
        let mut current = end;
        while current != start {
            match came_from.get(&current) {
                Some(&prev) => {
                    nodes.push(prev);
                    current = prev;
                }
                None => break,
            }
        }
        nodes.reverse();

        let raw: Vec<WorldPoint> = nodes
            .iter()
            .filter_map(|&id| self.layer.position(id))
            .collect();
        let points = simplify_path(&raw, self.config.simplify_tolerance, self.sight);

        if failure.is_none() {
            trace!(
                "[AStar] SUCCESS: {} nodes, {} waypoints, cost={:.2}, nodes_expanded={}",
                nodes.len(),
                points.len(),
                cost,
                nodes_expanded
            );
        }

        PathResult {
            nodes,
            points,
            cost,
            nodes_expanded,
            success: failure.is_none(),
            failure_reason: failure,
            failed_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AgentId;
    use crate::graph::{NodeAnnotation, NodeType};
    use crate::world::OpenSight;
    use approx::assert_relative_eq;

    /// 0 - 1 - 2 in a row, detour 0 - 3 - 4 - 2 above.
    fn detour_layer() -> GraphLayer {
        let mut layer = GraphLayer::new();
        let n0 = layer.add_node(WorldPoint::new(0.0, 0.0), NodeType::Regular);
        let n1 = layer.add_node(WorldPoint::new(2.0, 0.0), NodeType::Regular);
        let n2 = layer.add_node(WorldPoint::new(4.0, 0.0), NodeType::Regular);
        let n3 = layer.add_node(WorldPoint::new(0.0, 3.0), NodeType::Regular);
        let n4 = layer.add_node(WorldPoint::new(4.0, 3.0), NodeType::Regular);
        layer.connect(n0, n1);
        layer.connect(n1, n2);
        layer.connect(n0, n3);
        layer.connect(n3, n4);
        layer.connect(n4, n2);
        layer
    }

    #[test]
    fn test_direct_route() {
        let layer = detour_layer();
        let planner = AStarPlanner::with_defaults(&layer, &OpenSight);
        let result = planner.find_path(NodeId(0), NodeId(2), None);
        assert!(result.success);
        assert_eq!(result.nodes, vec![NodeId(0), NodeId(1), NodeId(2)]);
        assert_relative_eq!(result.cost, 4.0);
        // Collinear middle point is simplified away.
        assert_eq!(result.points.len(), 2);
    }

    #[test]
    fn test_risk_ceiling_forces_detour() {
        let mut layer = detour_layer();
        layer.annotate(
            NodeId(1),
            NodeAnnotation {
                agent: AgentId(0),
                probability: 0.8,
            },
        );
        let planner = AStarPlanner::with_defaults(&layer, &OpenSight);
        let result = planner.find_path(NodeId(0), NodeId(2), Some(0.5));
        assert!(result.success);
        assert!(!result.nodes.contains(&NodeId(1)));
        assert_relative_eq!(result.cost, 10.0);

        let unconstrained = planner.find_path(NodeId(0), NodeId(2), Some(0.9));
        assert!(unconstrained.nodes.contains(&NodeId(1)));
    }

    #[test]
    fn test_unreachable_returns_partial() {
        let mut layer = detour_layer();
        let island = layer.add_node(WorldPoint::new(10.0, 0.0), NodeType::Regular);
        let planner = AStarPlanner::with_defaults(&layer, &OpenSight);
        let result = planner.find_path(NodeId(0), island, None);
        assert!(!result.success);
        assert_eq!(result.failure_reason, Some(PathFailure::NoPath));
        assert_eq!(result.nodes.first(), Some(&NodeId(0)));
        // Nodes 2 and 4 are closest to the island; 2 is nearer.
        assert_eq!(result.nodes.last(), Some(&NodeId(2)));
    }

    #[test]
    fn test_missing_and_corner_nodes() {
        let mut layer = detour_layer();
        let corner = layer.add_node(WorldPoint::new(5.0, 5.0), NodeType::Corner);
        layer.connect(NodeId(4), corner);
        let planner = AStarPlanner::with_defaults(&layer, &OpenSight);
        let missing = planner.find_path(NodeId(0), NodeId(99), None);
        assert_eq!(missing.failure_reason, Some(PathFailure::InvalidNode));
        assert!(missing.is_empty());
        let blocked = planner.find_path(NodeId(0), corner, None);
        assert_eq!(blocked.failure_reason, Some(PathFailure::NotTraversable));
    }

    #[test]
    fn test_same_start_and_goal() {
        let layer = detour_layer();
        let planner = AStarPlanner::with_defaults(&layer, &OpenSight);
        let result = planner.find_path(NodeId(3), NodeId(3), None);
        assert!(result.success);
        assert_eq!(result.nodes, vec![NodeId(3)]);
        assert_eq!(result.cost, 0.0);
    }
}
