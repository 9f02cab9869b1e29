//! Probability update rules.
//!
//! Both rules plug into [`SearchModel`](super::SearchModel) through the
//! [`ProbabilityUpdate`] trait; the model owns the shared arm-expansion and
//! field-of-view clearing steps.

use std::collections::BTreeMap;

use log::trace;

use super::config::SearchConfig;
use crate::core::WorldPoint;
use crate::graph::{EdgeKey, GraphLayer};
use crate::pathfinding::longest_shortest_path;

/// Timing of the current tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickContext {
    /// Seconds since the previous tick.
    pub dt: f32,
    /// Clock time of this tick.
    pub now: f32,
}

/// One probability update step over the divided layer.
pub trait ProbabilityUpdate {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Recompute any cached graph measures after the layer changed shape.
    fn rebuild(&mut self, _layer: &GraphLayer) {}

    /// Apply the rule to every searchable segment.
    fn update(&mut self, layer: &mut GraphLayer, tick: &TickContext);
}

/// Decay applied per propagation hop: `(L - 1.5 * E) / L` where `L` is the
/// longest shortest path and `E` the longest searchable edge.
pub fn propagation_decay(layer: &GraphLayer) -> f32 {
    let longest = longest_shortest_path(&layer.weighted_adjacency());
    if longest <= 0.0 {
        return 0.0;
    }
    let max_edge = layer
        .edges()
        .filter(|e| e.searchable)
        .map(|e| e.length)
        .fold(0.0, f32::max);
    ((longest - 1.5 * max_edge) / longest).clamp(0.0, 1.0)
}

// ============================================================================
// Propagation
// ============================================================================

/// Seeds neighbours of fully expanded segments with a decayed probability
/// and slowly raises unseeded segments that border nonzero ones.
#[derive(Clone, Debug)]
pub struct Propagation {
    decay: f32,
    epsilon: f32,
    increment_rate: f32,
}

impl Propagation {
    /// Create with an explicit decay factor.
    pub fn new(decay: f32, epsilon: f32, increment_rate: f32) -> Self {
        Self {
            decay,
            epsilon,
            increment_rate,
        }
    }

    /// Create with the decay derived from the layer's geometry.
    pub fn for_layer(layer: &GraphLayer, config: &SearchConfig) -> Self {
        Self::new(
            propagation_decay(layer),
            config.propagation_epsilon,
            config.increment_rate,
        )
    }

    /// Current per-hop decay factor.
    pub fn decay(&self) -> f32 {
        self.decay
    }

    /// Seeds to plant: neighbour edge -> (shared node position, probability).
    fn collect_seeds(&self, layer: &GraphLayer) -> BTreeMap<EdgeKey, (WorldPoint, f32)> {
        let mut seeds: BTreeMap<EdgeKey, (WorldPoint, f32)> = BTreeMap::new();
        for edge in layer.edges() {
            let source = &edge.segment;
            if !edge.searchable || !source.is_propagated() || !source.is_expanded() {
                continue;
            }
            let probability = source.probability() * self.decay;
            if probability < self.epsilon {
                continue;
            }

            for key in layer.edge_neighbors(edge.key) {
                let Some(neighbor) = layer.edge_by_key(key) else {
                    continue;
                };
                let target = &neighbor.segment;
                if target.is_propagated()
                    || target.is_observed()
                    || target.probability() > source.probability()
                {
                    continue;
                }
                let shared = if key.touches(edge.key.low()) {
                    edge.key.low()
                } else {
                    edge.key.high()
                };
                let Some(at) = layer.position(shared) else {
                    continue;
                };
                seeds
                    .entry(key)
                    .and_modify(|s| {
                        if probability > s.1 {
                            *s = (at, probability);
                        }
                    })
                    .or_insert((at, probability));
            }
        }
        seeds
    }
}

impl ProbabilityUpdate for Propagation {
    fn name(&self) -> &'static str {
        "propagation"
    }

    fn rebuild(&mut self, layer: &GraphLayer) {
        self.decay = propagation_decay(layer);
    }

    fn update(&mut self, layer: &mut GraphLayer, tick: &TickContext) {
        // Seed from a consistent view of the previous tick.
        let seeds = self.collect_seeds(layer);
        if !seeds.is_empty() {
            trace!("[Search] Propagating into {} segments", seeds.len());
        }
        for (key, (at, probability)) in seeds {
            if let Some(edge) = layer.edge_by_key_mut(key) {
                let p = edge.segment.probability().max(probability);
                edge.segment.seed(at, p);
            }
        }

        let increment = self.increment_rate * tick.dt;
        if increment <= 0.0 {
            return;
        }
        let growing: Vec<EdgeKey> = layer
            .edges()
            .filter(|e| {
                e.searchable
                    && !e.segment.is_propagated()
                    && !e.segment.is_observed()
                    && e.segment.age(tick.now) > 0.0
            })
            .filter(|e| {
                layer.edge_neighbors(e.key).iter().any(|&k| {
                    layer
                        .edge_by_key(k)
                        .is_some_and(|n| n.segment.probability() > 0.0)
                })
            })
            .map(|e| e.key)
            .collect();
        for key in growing {
            if let Some(edge) = layer.edge_by_key_mut(key) {
                let p = edge.segment.probability() + increment;
                edge.segment.set_probability(p);
            }
        }
    }
}

// ============================================================================
// Diffusion
// ============================================================================

/// `p' = (1 - f) p + f / n * sum(neighbours)`, then scaled so the maximum is 1.
#[derive(Clone, Debug)]
pub struct Diffusion {
    factor: f32,
}

impl Diffusion {
    /// Create with a diffusion factor in [0, 1].
    pub fn new(factor: f32) -> Self {
        Self {
            factor: factor.clamp(0.0, 1.0),
        }
    }

    /// Diffusion factor.
    pub fn factor(&self) -> f32 {
        self.factor
    }
}

impl ProbabilityUpdate for Diffusion {
    fn name(&self) -> &'static str {
        "diffusion"
    }

    fn update(&mut self, layer: &mut GraphLayer, _tick: &TickContext) {
        let previous: BTreeMap<EdgeKey, f32> = layer
            .edges()
            .filter(|e| e.searchable)
            .map(|e| (e.key, e.segment.probability()))
            .collect();

        let mut next: BTreeMap<EdgeKey, f32> = BTreeMap::new();
        for (&key, &own) in &previous {
            let observed = layer
                .edge_by_key(key)
                .is_some_and(|e| e.segment.is_observed());
            if observed {
                next.insert(key, 0.0);
                continue;
            }
            let neighbors = layer.edge_neighbors(key);
            let value = if neighbors.is_empty() {
                own
            } else {
                let sum: f32 = neighbors
                    .iter()
                    .map(|k| previous.get(k).copied().unwrap_or(0.0))
                    .sum();
                (1.0 - self.factor) * own + self.factor / neighbors.len() as f32 * sum
            };
            next.insert(key, value);
        }

        let max = next.values().copied().fold(0.0, f32::max);
        for (key, value) in next {
            if let Some(edge) = layer.edge_by_key_mut(key) {
                let normalized = if max > 0.0 { value / max } else { value };
                edge.segment.set_probability(normalized);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{NodeId, NodeType};
    use approx::assert_relative_eq;

    /// Straight path of `edges` edges, each `length` long.
    fn path_layer(edges: usize, length: f32) -> GraphLayer {
        let mut layer = GraphLayer::new();
        let mut previous = layer.add_node(WorldPoint::ZERO, NodeType::DeadEnd);
        for i in 1..=edges {
            let id = layer.add_node(WorldPoint::new(i as f32 * length, 0.0), NodeType::Regular);
            layer.connect(previous, id);
            previous = id;
        }
        layer
    }

    #[test]
    fn test_decay_factor() {
        let layer = path_layer(5, 2.0);
        assert_relative_eq!(propagation_decay(&layer), 0.7, epsilon = 1e-5);
        assert_eq!(propagation_decay(&GraphLayer::new()), 0.0);
    }

    #[test]
    fn test_propagation_respects_stronger_neighbor() {
        let mut layer = path_layer(3, 2.0);
        let source = EdgeKey::new(NodeId(1), NodeId(2));
        let left = EdgeKey::new(NodeId(0), NodeId(1));
        let right = EdgeKey::new(NodeId(2), NodeId(3));
        {
            let edge = layer.edge_by_key_mut(source).unwrap();
            edge.segment.seed(WorldPoint::new(3.0, 0.0), 0.5);
            // Fully expanded immediately.
            edge.segment.expand(10.0, 1.0, 1.0);
        }
        layer
            .edge_by_key_mut(right)
            .unwrap()
            .segment
            .set_probability(0.8);

        let mut rule = Propagation::new(0.5, 0.01, 0.0);
        rule.update(&mut layer, &TickContext { dt: 0.1, now: 1.0 });

        let left_segment = &layer.edge_by_key(left).unwrap().segment;
        assert_relative_eq!(left_segment.probability(), 0.25);
        assert!(left_segment.is_propagated());
        // Arms collapsed at the shared node.
        assert_eq!(left_segment.arms().0, WorldPoint::new(2.0, 0.0));
        assert_relative_eq!(layer.edge_by_key(right).unwrap().segment.probability(), 0.8);
        assert!(!layer.edge_by_key(right).unwrap().segment.is_propagated());
    }

    #[test]
    fn test_propagation_epsilon() {
        let mut layer = path_layer(2, 2.0);
        let source = EdgeKey::new(NodeId(0), NodeId(1));
        layer.edge_by_key_mut(source).unwrap().segment.seed(WorldPoint::ZERO, 0.015);
        layer
            .edge_by_key_mut(source)
            .unwrap()
            .segment
            .expand(10.0, 1.0, 1.0);
        let mut rule = Propagation::new(0.5, 0.01, 0.0);
        rule.update(&mut layer, &TickContext { dt: 0.1, now: 1.0 });
        let other = layer.edge(NodeId(1), NodeId(2)).unwrap();
        assert_eq!(other.segment.probability(), 0.0);
    }

    #[test]
    fn test_unseeded_growth_next_to_probability() {
        let mut layer = path_layer(3, 2.0);
        layer
            .edge_by_key_mut(EdgeKey::new(NodeId(0), NodeId(1)))
            .unwrap()
            .segment
            .set_probability(0.5);
        let mut rule = Propagation::new(0.0, 0.01, 0.1);
        rule.update(&mut layer, &TickContext { dt: 1.0, now: 2.0 });
        let middle = layer.edge(NodeId(1), NodeId(2)).unwrap().segment.probability();
        let far = layer.edge(NodeId(2), NodeId(3)).unwrap().segment.probability();
        assert_relative_eq!(middle, 0.1);
        assert_eq!(far, 0.0);
    }

    #[test]
    fn test_diffusion_normalizes_to_one() {
        let mut layer = path_layer(3, 1.0);
        layer
            .edge_by_key_mut(EdgeKey::new(NodeId(0), NodeId(1)))
            .unwrap()
            .segment
            .set_probability(0.4);
        let mut rule = Diffusion::new(0.5);
        rule.update(&mut layer, &TickContext { dt: 0.1, now: 0.1 });
        let max = layer
            .edges()
            .map(|e| e.segment.probability())
            .fold(0.0, f32::max);
        assert_relative_eq!(max, 1.0);
        assert!(layer.edges().all(|e| (0.0..=1.0).contains(&e.segment.probability())));
    }
}
