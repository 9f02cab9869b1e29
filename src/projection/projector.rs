//! Trajectory projector: forecasts guard positions along the road graph.
//!
//! For each guard the projector snaps to the nearest original-layer edge
//! (preferring edges aligned with the guard's heading), then walks the graph
//! breadth-first for `fov_radius + speed * look_ahead_time`, dropping a
//! temporary node every `step_size` and annotating junctions and dead ends.
//! Every edge is walked at most once, so both sides of a loop are covered;
//! a node reached again is not expanded a second time.
//!
//! ```text
//!   dead end ●──○──○──◉──○──○──○──● junction
//!            1.0   1.0 guard  0.7  0.3  0.0
//! ```

use std::collections::{HashSet, VecDeque};

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use super::config::{ProjectionConfig, ProjectionMode};
use crate::core::geometry::{cosine_between, round_to_tenth};
use crate::core::{AgentId, WorldPoint};
use crate::graph::{EdgeKey, EdgeProjection, Layer, NodeAnnotation, NodeId, NodeType, RoadGraph};
use crate::world::{FieldOfView, LineOfSight};

/// Distance below which a projection counts as sitting on a node.
const SNAP_EPSILON: f32 = 1e-3;

/// Pose and senses of a guard for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GuardState {
    pub agent: AgentId,
    pub position: WorldPoint,
    /// Heading in radians (CCW from +X).
    pub heading: f32,
    /// Walking speed in map units per second.
    pub speed: f32,
    /// Field-of-view radius.
    pub fov_radius: f32,
}

/// One forecast position, mirrored by a node annotation in the graph.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPosition {
    pub agent: AgentId,
    pub node: NodeId,
    pub position: WorldPoint,
    /// Graph distance walked from the guard.
    pub distance: f32,
    /// Occupancy risk in [0, 1].
    pub risk: f32,
    /// Reached through a sharp turn (angle-based mode only).
    pub after_turn: bool,
}

/// Breadth-first work item.
#[derive(Clone, Copy, Debug)]
struct PossiblePosition {
    node: NodeId,
    came_from: Option<NodeId>,
    distance: f32,
    risk: f32,
    risk_cap: f32,
    after_turn: bool,
}

/// Walk parameters shared by one guard's projection.
struct Walk<'g> {
    guard: &'g GuardState,
    max_distance: f32,
}

/// Nodes already queued and edges already walked for one guard.
struct Seen<'s> {
    nodes: &'s mut HashSet<NodeId>,
    edges: &'s mut HashSet<EdgeKey>,
}

/// Inserts temporary nodes for guards' possible future positions.
pub struct TrajectoryProjector<'a, L: ?Sized, F: ?Sized> {
    sight: &'a L,
    fov: &'a F,
    config: ProjectionConfig,
}

impl<'a, L, F> TrajectoryProjector<'a, L, F>
where
    L: LineOfSight + ?Sized,
    F: FieldOfView + ?Sized,
{
    /// Create a projector.
    pub fn new(sight: &'a L, fov: &'a F, config: ProjectionConfig) -> Self {
        Self { sight, fov, config }
    }

    /// Projector configuration.
    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Retract last tick's projection and project every guard anew.
    pub fn update(&self, graph: &mut RoadGraph, guards: &[GuardState]) -> Vec<ProjectedPosition> {
        graph.clear_temporary_nodes();

        let mut projected = Vec::new();
        for guard in guards {
            self.project_guard(graph, guard, &mut projected);
        }
        debug!(
            "[Projector] {} guards, {} projected positions, {} temporary nodes",
            guards.len(),
            projected.len(),
            graph.original().node_count() - graph.original().permanent_node_count()
        );
        projected
    }

    fn project_guard(
        &self,
        graph: &mut RoadGraph,
        guard: &GuardState,
        out: &mut Vec<ProjectedPosition>,
    ) {
        let walk = Walk {
            guard,
            max_distance: guard.fov_radius + guard.speed.max(0.0) * self.config.look_ahead_time,
        };
        let heading = WorldPoint::from_angle(guard.heading);
        let Some(projection) =
            graph.closest_point_on_edges(guard.position, Some(heading), Layer::Original, self.sight)
        else {
            debug!("[Projector] {} has no visible edge", guard.agent);
            return;
        };
        let Some(start) = anchor(graph, projection) else {
            return;
        };

        let risk = self.mark(graph, &walk, start, 0.0, 1.0, false, out);
        let mut queue = VecDeque::from([PossiblePosition {
            node: start,
            came_from: None,
            distance: 0.0,
            risk,
            risk_cap: 1.0,
            after_turn: false,
        }]);
        let mut visited = HashSet::from([start]);
        let mut walked = HashSet::new();
        let mut dequeues = 0;

        while let Some(current) = queue.pop_front() {
            dequeues += 1;
            if dequeues > self.config.max_dequeues {
                trace!(
                    "[Projector] {} stopped at {} dequeues",
                    guard.agent, self.config.max_dequeues
                );
                break;
            }

            let layer = graph.original();
            let Some(here) = layer.position(current.node) else {
                continue;
            };
            let incoming = current
                .came_from
                .and_then(|c| layer.position(c))
                .map(|p| here - p);
            let outgoing: Vec<(NodeId, WorldPoint)> = layer
                .neighbors(current.node)
                .iter()
                .copied()
                .filter(|&n| {
                    Some(n) != current.came_from && !walked.contains(&EdgeKey::new(current.node, n))
                })
                .filter_map(|n| {
                    let node = layer.node(n)?;
                    node.is_traversable().then_some((n, node.position))
                })
                .collect();
            let branching = outgoing.len().max(1) as f32;

            for (next, next_position) in outgoing {
                if walked.contains(&EdgeKey::new(current.node, next)) {
                    continue;
                }
                let mut cap = current.risk_cap;
                let mut after_turn = current.after_turn;
                if self.config.mode == ProjectionMode::AngleBased
                    && let Some(direction) = incoming
                    && cosine_between(direction, next_position - here) < self.config.corner_cosine
                {
                    cap = cap.min(self.config.corner_risk_fraction * current.risk / branching);
                    after_turn = true;
                }
                let start = PossiblePosition {
                    risk_cap: cap,
                    after_turn,
                    ..current
                };
                let mut seen = Seen {
                    nodes: &mut visited,
                    edges: &mut walked,
                };
                self.walk_edge(graph, &walk, start, next, &mut seen, &mut queue, out);
            }
        }
    }

    /// Walk from `from.node` towards `next`, splitting the edge every step.
    #[allow(clippy::too_many_arguments)]
    fn walk_edge(
        &self,
        graph: &mut RoadGraph,
        walk: &Walk<'_>,
        from: PossiblePosition,
        next: NodeId,
        seen: &mut Seen<'_>,
        queue: &mut VecDeque<PossiblePosition>,
        out: &mut Vec<ProjectedPosition>,
    ) {
        let Some(target) = graph.original().position(next) else {
            return;
        };
        let mut current = from.node;
        let mut walked = from.distance;

        loop {
            let budget = walk.max_distance - walked;
            if budget <= SNAP_EPSILON {
                return;
            }
            let Some(here) = graph.original().position(current) else {
                return;
            };
            let remaining = here.distance(&target);
            let step = self.config.step_size.min(budget);

            if remaining <= step + SNAP_EPSILON {
                walked += remaining;
                seen.edges.insert(EdgeKey::new(current, next));
                let node = graph.original().node(next);
                let marked = node.is_some_and(|n| n.is_temporary() || n.degree() != 2);
                let risk = if marked {
                    self.mark(graph, walk, next, walked, from.risk_cap, from.after_turn, out)
                } else {
                    self.risk(walk, target, walked).min(from.risk_cap)
                };
                if !seen.nodes.insert(next) {
                    return;
                }
                queue.push_back(PossiblePosition {
                    node: next,
                    came_from: Some(current),
                    distance: walked,
                    risk,
                    risk_cap: from.risk_cap,
                    after_turn: from.after_turn,
                });
                return;
            }

            let point = here.move_towards(&target, step);
            let Some(inserted) =
                graph.insert_node_between(Layer::Original, current, next, point, NodeType::Temporary)
            else {
                return;
            };
            walked += step;
            seen.edges.insert(EdgeKey::new(current, inserted));
            self.mark(graph, walk, inserted, walked, from.risk_cap, from.after_turn, out);
            current = inserted;
        }
    }

    /// Annotate a node with the guard's risk, keeping the maximum over guards.
    #[allow(clippy::too_many_arguments)]
    fn mark(
        &self,
        graph: &mut RoadGraph,
        walk: &Walk<'_>,
        node: NodeId,
        distance: f32,
        cap: f32,
        after_turn: bool,
        out: &mut Vec<ProjectedPosition>,
    ) -> f32 {
        let layer = graph.layer_mut(Layer::Original);
        let Some(existing) = layer.node(node) else {
            return 0.0;
        };
        let position = existing.position;
        let risk = self.risk(walk, position, distance).min(cap);

        let annotation = match existing.annotation {
            Some(previous) if previous.probability >= risk => previous,
            _ => NodeAnnotation {
                agent: walk.guard.agent,
                probability: risk,
            },
        };
        layer.annotate(node, annotation);

        out.push(ProjectedPosition {
            agent: walk.guard.agent,
            node,
            position,
            distance,
            risk,
            after_turn,
        });
        risk
    }

    /// 1 inside the field of view, else linear decay from the FOV radius to
    /// the projection distance, rounded to one decimal.
    fn risk(&self, walk: &Walk<'_>, position: WorldPoint, distance: f32) -> f32 {
        if self.fov.contains(walk.guard.agent, position) {
            return 1.0;
        }
        let radius = walk.guard.fov_radius;
        let span = walk.max_distance - radius;
        if span <= 0.0 {
            return 0.0;
        }
        round_to_tenth((1.0 - (distance - radius) / span).clamp(0.0, 1.0))
    }
}

/// Node to start walking from: an edge endpoint the projection sits on, or
/// a temporary node splitting the edge.
fn anchor(graph: &mut RoadGraph, projection: EdgeProjection) -> Option<NodeId> {
    let (a, b) = (projection.edge.low(), projection.edge.high());
    let layer = graph.original();
    for end in [a, b] {
        if layer
            .position(end)
            .is_some_and(|p| p.distance(&projection.point) < SNAP_EPSILON)
        {
            return Some(end);
        }
    }
    graph.insert_node_between(Layer::Original, a, b, projection.point, NodeType::Temporary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{RoadGraphConfig, RoadMap};
    use crate::world::{Blind, ConeFieldOfView, OpenSight, ViewCone};
    use approx::assert_relative_eq;

    fn graph(points: &[(f32, f32)]) -> RoadGraph {
        let mut map = RoadMap::new();
        for (i, &(x, y)) in points.iter().enumerate() {
            let node_type = if i == 0 || i == points.len() - 1 {
                NodeType::DeadEnd
            } else {
                NodeType::Regular
            };
            map.push_node(WorldPoint::new(x, y), node_type);
        }
        for i in 1..points.len() {
            map.push_edge(i - 1, i);
        }
        RoadGraph::from_road_map(&map, RoadGraphConfig::default())
    }

    fn guard(position: WorldPoint, speed: f32, fov_radius: f32) -> GuardState {
        GuardState {
            agent: AgentId(1),
            position,
            heading: 0.0,
            speed,
            fov_radius,
        }
    }

    fn risk_at(projected: &[ProjectedPosition], point: WorldPoint) -> Option<f32> {
        projected
            .iter()
            .find(|p| p.position.approx_eq(&point, 1e-3))
            .map(|p| p.risk)
    }

    #[test]
    fn test_linear_risk_along_corridor() {
        let mut graph = graph(&[(0.0, 0.0), (10.0, 0.0)]);
        let mut fov = ConeFieldOfView::new(OpenSight);
        fov.set_cone(
            AgentId(1),
            ViewCone::new(WorldPoint::new(1.0, 0.0), 0.0, 2.0, std::f32::consts::FRAC_PI_4),
        );
        let projector = TrajectoryProjector::new(&OpenSight, &fov, ProjectionConfig::default());
        // Projection distance 2 + 2 * 1.5 = 5.
        let projected = projector.update(&mut graph, &[guard(WorldPoint::new(1.0, 0.0), 2.0, 2.0)]);

        assert_eq!(risk_at(&projected, WorldPoint::new(2.0, 0.0)), Some(1.0));
        assert_eq!(risk_at(&projected, WorldPoint::new(3.0, 0.0)), Some(1.0));
        assert_relative_eq!(risk_at(&projected, WorldPoint::new(4.0, 0.0)).unwrap(), 0.7);
        assert_relative_eq!(risk_at(&projected, WorldPoint::new(5.0, 0.0)).unwrap(), 0.3);
        assert_relative_eq!(risk_at(&projected, WorldPoint::new(6.0, 0.0)).unwrap(), 0.0);
        assert_eq!(risk_at(&projected, WorldPoint::new(7.0, 0.0)), None);
        // Dead end behind the guard, inside the radius but outside the cone.
        assert_eq!(risk_at(&projected, WorldPoint::new(0.0, 0.0)), Some(1.0));

        // Guard anchor plus five steps.
        assert_eq!(graph.original().node_count(), 2 + 6);
        assert_eq!(graph.original().node(NodeId(0)).unwrap().probability(), 1.0);
    }

    #[test]
    fn test_update_retracts_previous_projection() {
        let mut graph = graph(&[(0.0, 0.0), (10.0, 0.0)]);
        let projector = TrajectoryProjector::new(&OpenSight, &Blind, ProjectionConfig::default());
        let g = guard(WorldPoint::new(1.0, 0.0), 2.0, 2.0);
        projector.update(&mut graph, &[g]);
        let first = graph.original().node_count();
        projector.update(&mut graph, &[g]);
        assert_eq!(graph.original().node_count(), first);

        graph.clear_temporary_nodes();
        assert_eq!(graph.original().node_count(), 2);
        assert_eq!(graph.original().edge_count(), 1);
        assert!(graph.original().nodes().iter().all(|n| n.annotation.is_none()));
    }

    #[test]
    fn test_angle_based_caps_risk_after_turn() {
        let points = [(0.0, 0.0), (4.0, 0.0), (4.0, 4.0)];
        let g = guard(WorldPoint::new(0.0, 0.0), 4.0, 1.0);

        let mut linear_graph = graph(&points);
        let linear = TrajectoryProjector::new(&OpenSight, &Blind, ProjectionConfig::default());
        let linear_positions = linear.update(&mut linear_graph, &[g]);
        assert_relative_eq!(risk_at(&linear_positions, WorldPoint::new(4.0, 1.0)).unwrap(), 0.3);

        let mut angle_graph = graph(&points);
        let angle = TrajectoryProjector::new(
            &OpenSight,
            &Blind,
            ProjectionConfig::default().with_mode(ProjectionMode::AngleBased),
        );
        let angle_positions = angle.update(&mut angle_graph, &[g]);
        let after = angle_positions
            .iter()
            .find(|p| p.position.approx_eq(&WorldPoint::new(4.0, 1.0), 1e-3))
            .unwrap();
        assert!(after.after_turn);
        // Half of the 0.5 risk at the turn, one branch.
        assert_relative_eq!(after.risk, 0.25);
    }

    #[test]
    fn test_cycle_closing_edge_is_walked() {
        // Square loop of side 4; both routes from (0, 0) meet at (4, 4).
        let mut map = RoadMap::new();
        for (x, y) in [(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)] {
            map.push_node(WorldPoint::new(x, y), NodeType::Regular);
        }
        for (a, b) in [(0, 1), (1, 2), (2, 3), (3, 0)] {
            map.push_edge(a, b);
        }
        let mut graph = RoadGraph::from_road_map(&map, RoadGraphConfig::default());
        let projector = TrajectoryProjector::new(&OpenSight, &Blind, ProjectionConfig::default());
        // Projection distance 2 + 4 * 1.5 = 8.
        let projected = projector.update(&mut graph, &[guard(WorldPoint::ZERO, 4.0, 2.0)]);

        for point in [(4.0, 1.0), (4.0, 2.0), (4.0, 3.0), (1.0, 4.0), (2.0, 4.0), (3.0, 4.0)] {
            let point = WorldPoint::new(point.0, point.1);
            assert!(risk_at(&projected, point).is_some(), "no position at {point:?}");
        }
        assert_relative_eq!(risk_at(&projected, WorldPoint::new(1.0, 4.0)).unwrap(), 0.5);
        // Anchor plus three temporaries on each of the four sides.
        assert_eq!(projected.len(), 1 + 12);
        assert_eq!(graph.original().node_count(), 4 + 12);
    }

    #[test]
    fn test_dequeue_cap() {
        // Star of short spokes around a hub.
        let mut map = RoadMap::new();
        let hub = map.push_node(WorldPoint::ZERO, NodeType::Regular);
        for i in 0..8 {
            let angle = i as f32 * std::f32::consts::FRAC_PI_4;
            let spoke = map.push_node(WorldPoint::from_angle(angle) * 0.5, NodeType::DeadEnd);
            map.push_edge(hub, spoke);
        }
        let mut graph = RoadGraph::from_road_map(&map, RoadGraphConfig::default());
        let config = ProjectionConfig::default().with_max_dequeues(1);
        let projector = TrajectoryProjector::new(&OpenSight, &Blind, config);
        let projected = projector.update(&mut graph, &[guard(WorldPoint::ZERO, 1.0, 1.0)]);
        // Only the hub is expanded: the hub plus its eight spokes.
        assert_eq!(projected.len(), 9);
    }

    #[test]
    fn test_guard_without_edges() {
        let mut graph = RoadGraph::from_road_map(&RoadMap::new(), RoadGraphConfig::default());
        let projector = TrajectoryProjector::new(&OpenSight, &Blind, ProjectionConfig::default());
        assert!(projector.update(&mut graph, &[guard(WorldPoint::ZERO, 1.0, 1.0)]).is_empty());
    }
}
