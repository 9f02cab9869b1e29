//! Search segment model: per-tick belief update over the divided layer.

use log::{debug, trace};

use super::config::{SearchConfig, UpdatePolicy};
use super::policy::{Diffusion, ProbabilityUpdate, Propagation, TickContext};
use super::scoring::{SegmentScore, best_segment};
use crate::core::{AgentId, WorldPoint};
use crate::graph::{EdgeKey, GraphLayer, Layer, RoadGraph};
use crate::world::{Clock, FieldOfView, LineOfSight};

/// Belief model over where the hidden agent may be.
///
/// Every tick runs, in order:
/// 1. the configured [`ProbabilityUpdate`] rule,
/// 2. arm expansion of every segment,
/// 3. field-of-view clearing for every registered searcher.
pub struct SearchModel {
    config: SearchConfig,
    policy: Box<dyn ProbabilityUpdate>,
    searchers: Vec<AgentId>,
    ticks: u64,
}

impl SearchModel {
    /// Create a model for `graph` using the policy named in `config`.
    pub fn new(graph: &RoadGraph, config: SearchConfig) -> Self {
        let policy: Box<dyn ProbabilityUpdate> = match config.policy {
            UpdatePolicy::Propagation => Box::new(Propagation::for_layer(graph.divided(), &config)),
            UpdatePolicy::Diffusion => Box::new(Diffusion::new(config.diffusion_factor)),
        };
        Self::with_policy(config, policy)
    }

    /// Create a model with a custom update rule.
    pub fn with_policy(config: SearchConfig, policy: Box<dyn ProbabilityUpdate>) -> Self {
        debug!("[Search] Using {} update", policy.name());
        Self {
            config,
            policy,
            searchers: Vec::new(),
            ticks: 0,
        }
    }

    /// Model configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Name of the active update rule.
    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Number of ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Register an agent whose field of view clears segments.
    pub fn add_searcher(&mut self, agent: AgentId) {
        if !self.searchers.contains(&agent) {
            self.searchers.push(agent);
        }
    }

    /// Unregister a searcher.
    pub fn remove_searcher(&mut self, agent: AgentId) {
        self.searchers.retain(|&a| a != agent);
    }

    /// Registered searchers.
    pub fn searchers(&self) -> &[AgentId] {
        &self.searchers
    }

    /// Recompute cached graph measures after the graph was rebuilt.
    pub fn rebuild(&mut self, graph: &RoadGraph) {
        self.policy.rebuild(graph.divided());
    }

    /// Advance the model by `dt` seconds.
    pub fn tick<F, C>(&mut self, graph: &mut RoadGraph, fov: &F, clock: &C, dt: f32)
    where
        F: FieldOfView + ?Sized,
        C: Clock + ?Sized,
    {
        let layer = graph.divided_mut();
        if layer.has_temporary_changes() {
            debug!("[Search] Retracting temporary nodes left in the divided layer");
            layer.clear_temporary_nodes();
        }

        let tick = TickContext {
            dt: dt.max(0.0),
            now: clock.elapsed(),
        };

        self.policy.update(layer, &tick);
        self.expand_arms(layer, tick.dt);
        let observed = self.clear_observed(layer, fov, tick.now);

        self.ticks += 1;
        trace!(
            "[Search] Tick {}: {} segments observed, max p={:.3}",
            self.ticks,
            observed,
            max_probability(layer)
        );
    }

    fn expand_arms(&self, layer: &mut GraphLayer, dt: f32) {
        let step = self.config.expansion_speed * dt;
        for edge in layer.edges_mut().filter(|e| e.searchable) {
            edge.segment.expand(
                step,
                self.config.arrival_slowdown,
                self.config.min_speed_factor,
            );
        }
    }

    /// Zero every segment a searcher can see; release the rest.
    fn clear_observed<F: FieldOfView + ?Sized>(
        &self,
        layer: &mut GraphLayer,
        fov: &F,
        now: f32,
    ) -> usize {
        let step = self.config.fov_sample_step;
        let mut observed = 0;
        for edge in layer.edges_mut().filter(|e| e.searchable) {
            let seen = !self.searchers.is_empty()
                && edge.segment.sample_points(step).into_iter().any(|p| {
                    self.searchers.iter().any(|&agent| fov.contains(agent, p))
                });
            if seen {
                edge.segment.observe(now);
                observed += 1;
            } else {
                edge.segment.release(now);
            }
        }
        observed
    }

    /// Seed the segment nearest to a last-known position.
    ///
    /// Arms collapse onto the projection of `point` and the segment is
    /// marked as seeded. Returns the seeded edge.
    pub fn seed_at_point<L: LineOfSight + ?Sized>(
        &mut self,
        graph: &mut RoadGraph,
        point: WorldPoint,
        probability: f32,
        sight: &L,
    ) -> Option<EdgeKey> {
        let projection = graph.closest_point_on_edges(point, None, Layer::Divided, sight)?;
        let edge = graph.divided_mut().edge_by_key_mut(projection.edge)?;
        edge.segment.seed(projection.point, probability);
        debug!(
            "[Search] Seeded {} at ({:.2},{:.2}) p={:.2}",
            projection.edge, projection.point.x, projection.point.y, probability
        );
        Some(projection.edge)
    }

    /// Seed a specific divided-layer edge at its midpoint.
    pub fn seed_edge(&mut self, graph: &mut RoadGraph, key: EdgeKey, probability: f32) -> bool {
        match graph.divided_mut().edge_by_key_mut(key) {
            Some(edge) if edge.searchable => {
                let (a, b) = edge.segment.endpoints();
                edge.segment.seed(a.lerp(&b, 0.5), probability);
                true
            }
            _ => false,
        }
    }

    /// Zero every segment.
    pub fn reset(&mut self, graph: &mut RoadGraph) {
        for edge in graph.divided_mut().edges_mut() {
            edge.segment.reset();
        }
        self.ticks = 0;
    }

    /// Highest-scoring segment for `agent` at `from`.
    pub fn best_segment(
        &self,
        graph: &RoadGraph,
        from: WorldPoint,
        agent: AgentId,
        now: f32,
    ) -> Option<SegmentScore> {
        best_segment(graph.divided(), from, agent, now, &self.config.scoring)
    }
}

/// Largest segment probability of a layer.
pub fn max_probability(layer: &GraphLayer) -> f32 {
    layer
        .edges()
        .map(|e| e.segment.probability())
        .fold(0.0, f32::max)
}
