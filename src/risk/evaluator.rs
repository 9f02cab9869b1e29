//! Path risk evaluation against projected guard positions.
//!
//! A planned intruder path is judged against the nodes the trajectory
//! projector annotated on the original layer (its temporary nodes plus the
//! junctions, dead ends and anchors it reached):
//!
//! 1. Pick the risk point: a projected node within field-of-view range of,
//!    and visible from, the intruder or the nearest point of its path.
//! 2. Unsafe when that point's risk exceeds the threshold.
//! 3. Unsafe, and the goal invalidated, when a guard reaches the point by
//!    a shorter walk than the intruder.

use log::debug;
use serde::{Deserialize, Serialize};

use super::config::{RiskConfig, RiskPolicy};
use super::threshold::ThresholdContext;
use crate::core::geometry::project_onto_segment;
use crate::core::{AgentId, WorldPoint};
use crate::graph::{NodeId, RoadGraph};
use crate::projection::ProjectedPosition;
use crate::world::LineOfSight;

/// A projected guard position relevant to an intruder path.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskyPosition {
    pub node: NodeId,
    pub position: WorldPoint,
    /// Guard whose projection set the node's risk.
    pub agent: AgentId,
    pub risk: f32,
    /// Squared distance from the reference point.
    pub distance_sq: f32,
    /// Intruder position or nearest path point the node is seen from.
    pub reference: WorldPoint,
    /// Intruder walking distance to the node through the reference point.
    pub intruder_distance: f32,
}

/// Why a path was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum UnsafeReason {
    /// Peak risk exceeds the threshold.
    RiskAboveThreshold,
    /// A guard reaches the risk point first.
    GuardCloser { agent: AgentId, guard_distance: f32 },
}

/// Outcome of a risk check.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risky: Option<RiskyPosition>,
    pub threshold: f32,
    pub unsafe_reason: Option<UnsafeReason>,
}

impl RiskAssessment {
    pub fn is_safe(&self) -> bool {
        self.unsafe_reason.is_none()
    }

    /// The current goal must be dropped from the candidate set.
    pub fn invalidates_goal(&self) -> bool {
        matches!(self.unsafe_reason, Some(UnsafeReason::GuardCloser { .. }))
    }
}

/// Checks intruder paths against the current projection.
pub struct RiskEvaluator<'a, L: ?Sized> {
    sight: &'a L,
    config: RiskConfig,
}

impl<'a, L: LineOfSight + ?Sized> RiskEvaluator<'a, L> {
    pub fn new(sight: &'a L, config: RiskConfig) -> Self {
        Self { sight, config }
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Risk point for an intruder at `current` following `path`.
    ///
    /// Only projector-annotated nodes with nonzero risk within `fov_range`
    /// of a reference point they are visible from are considered.
    /// Annotations are retracted with the temporary nodes, so every
    /// annotation belongs to the current projection.
    pub fn find_risk(
        &self,
        graph: &RoadGraph,
        current: WorldPoint,
        path: &[WorldPoint],
        fov_range: f32,
    ) -> Option<RiskyPosition> {
        let range_sq = fov_range * fov_range;
        let candidates = graph.original().nodes().iter().filter_map(|node| {
            let annotation = node.annotation?;
            if annotation.probability <= 0.0 {
                return None;
            }
            let from_current = (current.distance_squared(&node.position) <= range_sq
                && self.sight.has_line_of_sight(current, node.position))
            .then_some((current, 0.0));
            let from_path = nearest_on_path(path, node.position).filter(|&(point, _)| {
                point.distance_squared(&node.position) <= range_sq
                    && self.sight.has_line_of_sight(point, node.position)
            });

            let (reference, walked) = match (from_current, from_path) {
                (Some(c), Some(p)) => {
                    if p.0.distance_squared(&node.position) < c.0.distance_squared(&node.position) {
                        p
                    } else {
                        c
                    }
                }
                (Some(c), None) => c,
                (None, Some(p)) => p,
                (None, None) => return None,
            };
            let distance_sq = reference.distance_squared(&node.position);
            Some(RiskyPosition {
                node: node.id,
                position: node.position,
                agent: annotation.agent,
                risk: annotation.probability,
                distance_sq,
                reference,
                intruder_distance: walked + distance_sq.sqrt(),
            })
        });

        match self.config.policy {
            RiskPolicy::MaxRisk => candidates.max_by(|a, b| {
                a.risk
                    .total_cmp(&b.risk)
                    .then(b.distance_sq.total_cmp(&a.distance_sq))
            }),
            RiskPolicy::ClosestRisk => candidates.min_by(|a, b| {
                a.distance_sq
                    .total_cmp(&b.distance_sq)
                    .then(b.risk.total_cmp(&a.risk))
            }),
        }
    }

    /// Full safety check of a planned path.
    ///
    /// `projected` is this tick's projector output; it supplies each
    /// guard's walking distance to the risk point.
    pub fn assess(
        &self,
        graph: &RoadGraph,
        current: WorldPoint,
        path: &[WorldPoint],
        fov_range: f32,
        projected: &[ProjectedPosition],
        context: &ThresholdContext,
    ) -> RiskAssessment {
        let threshold = self.config.threshold.threshold(&self.config, context);
        let risky = self.find_risk(graph, current, path, fov_range);

        let unsafe_reason = risky.and_then(|r| {
            if r.risk > threshold {
                return Some(UnsafeReason::RiskAboveThreshold);
            }
            projected
                .iter()
                .filter(|p| p.node == r.node && p.distance < r.intruder_distance)
                .min_by(|a, b| a.distance.total_cmp(&b.distance))
                .map(|p| UnsafeReason::GuardCloser {
                    agent: p.agent,
                    guard_distance: p.distance,
                })
        });

        if let (Some(r), Some(reason)) = (risky, unsafe_reason) {
            debug!(
                "[Risk] Unsafe path: {:?} at ({:.1},{:.1}) risk={:.1} threshold={:.2}",
                reason, r.position.x, r.position.y, r.risk, threshold
            );
        }

        RiskAssessment {
            risky,
            threshold,
            unsafe_reason,
        }
    }
}

/// Nearest point of a polyline to `target` and the walking distance to it.
fn nearest_on_path(path: &[WorldPoint], target: WorldPoint) -> Option<(WorldPoint, f32)> {
    match path {
        [] => None,
        [only] => Some((*only, 0.0)),
        _ => {
            let mut walked = 0.0;
            let mut best: Option<(WorldPoint, f32, f32)> = None;
            for pair in path.windows(2) {
                let projection = project_onto_segment(target, pair[0], pair[1]);
                let length = pair[0].distance(&pair[1]);
                if best.is_none_or(|(_, _, d)| projection.distance < d) {
                    best = Some((projection.point, walked + projection.t * length, projection.distance));
                }
                walked += length;
            }
            best.map(|(point, along, _)| (point, along))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeType, RoadGraphConfig, RoadMap};
    use crate::projection::{GuardState, ProjectionConfig, TrajectoryProjector};
    use crate::world::{Blind, OpenSight};

    fn projected_corridor() -> (RoadGraph, Vec<ProjectedPosition>) {
        let mut map = RoadMap::new();
        let a = map.push_node(WorldPoint::new(0.0, 0.0), NodeType::DeadEnd);
        let b = map.push_node(WorldPoint::new(10.0, 0.0), NodeType::DeadEnd);
        map.push_edge(a, b);
        let mut graph = RoadGraph::from_road_map(&map, RoadGraphConfig::default());

        // Facing -X from (8, 0): projected nodes at x = 7..3 with risks
        // 1.0, 1.0, 0.7, 0.3, 0.0.
        let guard = GuardState {
            agent: AgentId(1),
            position: WorldPoint::new(8.0, 0.0),
            heading: std::f32::consts::PI,
            speed: 2.0,
            fov_radius: 2.0,
        };
        let projector = TrajectoryProjector::new(&OpenSight, &Blind, ProjectionConfig::default());
        let projected = projector.update(&mut graph, &[guard]);
        (graph, projected)
    }

    #[test]
    fn test_max_risk_above_threshold() {
        let (graph, projected) = projected_corridor();
        let evaluator = RiskEvaluator::new(&OpenSight, RiskConfig::default());
        let path = [WorldPoint::new(0.0, 0.0), WorldPoint::new(2.0, 0.0)];
        let assessment = evaluator.assess(
            &graph,
            path[0],
            &path,
            4.5,
            &projected,
            &ThresholdContext::default(),
        );
        let risky = assessment.risky.unwrap();
        assert!(risky.position.approx_eq(&WorldPoint::new(6.0, 0.0), 1e-3));
        assert_eq!(risky.risk, 1.0);
        assert_eq!(assessment.unsafe_reason, Some(UnsafeReason::RiskAboveThreshold));
        assert!(!assessment.invalidates_goal());
    }

    #[test]
    fn test_closest_risk_guard_closer_invalidates_goal() {
        let (graph, projected) = projected_corridor();
        let config = RiskConfig::default().with_policy(RiskPolicy::ClosestRisk);
        let evaluator = RiskEvaluator::new(&OpenSight, config);
        // Path turns away; the nearest path point to (4, 0) is (4, 3).
        let path = [
            WorldPoint::new(0.0, 0.0),
            WorldPoint::new(0.0, 3.0),
            WorldPoint::new(4.0, 3.0),
        ];
        let assessment = evaluator.assess(
            &graph,
            path[0],
            &path,
            4.0,
            &projected,
            &ThresholdContext::default(),
        );
        let risky = assessment.risky.unwrap();
        assert!(risky.position.approx_eq(&WorldPoint::new(4.0, 0.0), 1e-3));
        assert!(risky.reference.approx_eq(&WorldPoint::new(4.0, 3.0), 1e-3));
        assert!(assessment.invalidates_goal());
        match assessment.unsafe_reason {
            Some(UnsafeReason::GuardCloser { agent, .. }) => assert_eq!(agent, AgentId(1)),
            other => panic!("unexpected verdict {other:?}"),
        }
    }

    #[test]
    fn test_safe_when_nothing_in_range() {
        let (graph, projected) = projected_corridor();
        let evaluator = RiskEvaluator::new(&OpenSight, RiskConfig::default());
        let path = [WorldPoint::new(0.0, 0.0)];
        let assessment = evaluator.assess(
            &graph,
            path[0],
            &path,
            1.0,
            &projected,
            &ThresholdContext::default(),
        );
        assert!(assessment.risky.is_none());
        assert!(assessment.is_safe());
    }

    #[test]
    fn test_risk_on_permanent_junction_nodes() {
        // Hub with three short spokes: the guard's projection lands only on
        // the hub and the spoke ends, never on a temporary node.
        let mut map = RoadMap::new();
        let hub = map.push_node(WorldPoint::ZERO, NodeType::Regular);
        for angle in [0.0, std::f32::consts::FRAC_PI_2, std::f32::consts::PI] {
            let spoke = map.push_node(WorldPoint::from_angle(angle) * 0.8, NodeType::DeadEnd);
            map.push_edge(hub, spoke);
        }
        let mut graph = RoadGraph::from_road_map(&map, RoadGraphConfig::default());
        let guard = GuardState {
            agent: AgentId(1),
            position: WorldPoint::ZERO,
            heading: 0.0,
            speed: 1.0,
            fov_radius: 2.0,
        };
        let projector = TrajectoryProjector::new(&OpenSight, &Blind, ProjectionConfig::default());
        let projected = projector.update(&mut graph, &[guard]);
        assert_eq!(projected.len(), 4);
        assert!(graph.original().nodes().iter().all(|n| !n.is_temporary()));

        let evaluator = RiskEvaluator::new(&OpenSight, RiskConfig::default());
        let path = [WorldPoint::new(0.8, 0.0), WorldPoint::new(0.0, 0.8)];
        let assessment = evaluator.assess(
            &graph,
            path[0],
            &path,
            3.0,
            &projected,
            &ThresholdContext::default(),
        );
        let risky = assessment.risky.unwrap();
        assert_eq!(risky.risk, 1.0);
        assert_eq!(assessment.unsafe_reason, Some(UnsafeReason::RiskAboveThreshold));
        assert!(!assessment.is_safe());
    }

    #[test]
    fn test_nearest_on_path() {
        let path = [WorldPoint::new(0.0, 0.0), WorldPoint::new(4.0, 0.0), WorldPoint::new(4.0, 4.0)];
        let (point, along) = nearest_on_path(&path, WorldPoint::new(6.0, 2.0)).unwrap();
        assert!(point.approx_eq(&WorldPoint::new(4.0, 2.0), 1e-5));
        assert!((along - 6.0).abs() < 1e-5);
        assert!(nearest_on_path(&[], WorldPoint::ZERO).is_none());
    }
}
