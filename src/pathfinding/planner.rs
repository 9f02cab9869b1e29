//! Point-to-point path requests over the road graph.

use log::debug;

use super::astar::{AStarConfig, AStarPlanner, PathFailure, PathResult};
use crate::core::WorldPoint;
use crate::core::geometry::path_length;
use crate::graph::{Layer, RoadGraph};
use crate::world::{Clock, FallbackPlanner, LineOfSight};

/// Resolves world points to graph nodes, runs A* and applies the fallback.
///
/// All collaborators are borrowed for the duration of the request so the
/// finder can be rebuilt cheaply each tick.
pub struct PathFinder<'a, L: ?Sized, C: ?Sized, F: ?Sized> {
    graph: &'a RoadGraph,
    sight: &'a L,
    clock: &'a C,
    fallback: &'a F,
    config: AStarConfig,
}

impl<'a, L, C, F> PathFinder<'a, L, C, F>
where
    L: LineOfSight + ?Sized,
    C: Clock + ?Sized,
    F: FallbackPlanner + ?Sized,
{
    /// Create a new path finder.
    pub fn new(
        graph: &'a RoadGraph,
        sight: &'a L,
        clock: &'a C,
        fallback: &'a F,
        config: AStarConfig,
    ) -> Self {
        Self {
            graph,
            sight,
            clock,
            fallback,
            config,
        }
    }

    /// Plan from `from` to `to` through `layer`.
    ///
    /// Endpoints snap to the nearest visible traversable node. When the graph
    /// path degenerates to two points or fewer, the continuous-space
    /// fallback replaces its waypoints and cost; `nodes` keeps the graph
    /// route. Failures are stamped with the clock time so
    /// callers can back off from unreachable goals.
    pub fn find_path(
        &self,
        from: WorldPoint,
        to: WorldPoint,
        layer: Layer,
        risk_ceiling: Option<f32>,
    ) -> PathResult {
        let start = self.graph.closest_node(from, None, None, layer, self.sight);
        let goal = self.graph.closest_node(to, None, None, layer, self.sight);
        let (Some(start), Some(goal)) = (start, goal) else {
            debug!("[AStar] No graph node visible from start or goal");
            let mut result = PathResult::failed(PathFailure::InvalidNode, 0);
            result.failed_at = Some(self.clock.elapsed());
            return result;
        };

        let planner = AStarPlanner::new(self.graph.layer(layer), self.sight, self.config.clone());
        let mut result = planner.find_path(start, goal, risk_ceiling);

        if result.success && result.points.len() <= 2 {
            result.points = self.fallback.shortest_path(from, to);
            result.cost = path_length(&result.points);
        }
        if !result.success {
            result.failed_at = Some(self.clock.elapsed());
        }
        result
    }
}
