//! Road graph: the original road map plus its edge-subdivided copy.

use std::collections::BTreeMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::edge::EdgeKey;
use super::layer::{EdgeProjection, GraphLayer};
use super::node::{NodeId, NodeType};
use super::road_map::RoadMap;
use super::snapshot::GraphSnapshot;
use crate::core::{AgentId, WorldPoint};
use crate::world::LineOfSight;

/// Which node set an operation applies to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    /// Nodes and edges as extracted or loaded.
    #[default]
    Original,
    /// Long edges split into short search segments.
    Divided,
}

/// Configuration for building a [`RoadGraph`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadGraphConfig {
    /// Edges longer than this are split into equal sub-edges in the divided layer.
    /// Default: 1.0
    pub max_segment_length: f32,

    /// Distance slack within which directional edge queries prefer alignment.
    /// Default: 0.25
    pub direction_tolerance: f32,
}

impl Default for RoadGraphConfig {
    fn default() -> Self {
        Self {
            max_segment_length: 1.0,
            direction_tolerance: 0.25,
        }
    }
}

impl RoadGraphConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter for the subdivision length.
    pub fn with_max_segment_length(mut self, length: f32) -> Self {
        self.max_segment_length = length;
        self
    }

    /// Builder-style setter for the directional tie-break slack.
    pub fn with_direction_tolerance(mut self, tolerance: f32) -> Self {
        self.direction_tolerance = tolerance;
        self
    }
}

/// Owns both graph layers.
///
/// Original node `i` is node `i` in the divided layer too; subdivision
/// nodes are appended after the original ones.
#[derive(Clone, Debug)]
pub struct RoadGraph {
    original: GraphLayer,
    divided: GraphLayer,
    /// Divided sub-edges of every original edge, in walking order.
    chains: BTreeMap<EdgeKey, Vec<EdgeKey>>,
    config: RoadGraphConfig,
}

impl RoadGraph {
    /// Create an empty graph.
    pub fn new(config: RoadGraphConfig) -> Self {
        Self {
            original: GraphLayer::new(),
            divided: GraphLayer::new(),
            chains: BTreeMap::new(),
            config,
        }
    }

    /// Build both layers from a road-map table.
    pub fn from_road_map(map: &RoadMap, config: RoadGraphConfig) -> Self {
        let mut graph = Self::new(config);
        for node in &map.nodes {
            graph.original.add_node(node.position, node.node_type);
        }
        for &(a, b) in &map.edges {
            if !graph.original.connect(NodeId::from_index(a), NodeId::from_index(b)) {
                warn!("[RoadMap] Skipping invalid or duplicate edge {}-{}", a, b);
            }
        }
        graph.rebuild_divided();
        debug!(
            "[RoadMap] Built graph: {} nodes / {} edges original, {} nodes / {} edges divided",
            graph.original.node_count(),
            graph.original.edge_count(),
            graph.divided.node_count(),
            graph.divided.edge_count()
        );
        graph
    }

    /// Export the permanent original layer as a road-map table.
    pub fn to_road_map(&self) -> RoadMap {
        let mut permanent_layer;
        let layer = if self.original.has_temporary_changes() {
            permanent_layer = self.original.clone();
            permanent_layer.clear_temporary_nodes();
            &permanent_layer
        } else {
            &self.original
        };

        let mut map = RoadMap::new();
        for node in layer.nodes() {
            map.push_node(node.position, node.node_type);
        }
        for edge in layer.edges() {
            map.push_edge(edge.key.low().index(), edge.key.high().index());
        }
        map
    }

    /// Recreate the divided layer from the original one.
    fn rebuild_divided(&mut self) {
        let mut divided = GraphLayer::new();
        let mut chains = BTreeMap::new();
        let permanent = self.original.permanent_node_count();
        for node in &self.original.nodes()[..permanent] {
            divided.add_node(node.position, node.node_type);
        }

        for edge in self.original.edges() {
            let (a, b) = (edge.key.low(), edge.key.high());
            let (pa, pb) = (self.original.nodes()[a.index()].position, self.original.nodes()[b.index()].position);

            let interior = if edge.searchable {
                subdivide(pa, pb, self.config.max_segment_length)
            } else {
                Vec::new()
            };

            let mut chain = Vec::with_capacity(interior.len() + 1);
            let mut previous = a;
            for point in interior {
                let id = divided.add_node(point, NodeType::Regular);
                divided.connect(previous, id);
                chain.push(EdgeKey::new(previous, id));
                previous = id;
            }
            divided.connect(previous, b);
            chain.push(EdgeKey::new(previous, b));
            chains.insert(edge.key, chain);
        }

        self.divided = divided;
        self.chains = chains;
    }

    // ========================================================================
    // Layers
    // ========================================================================

    /// Get a layer.
    #[inline]
    pub fn layer(&self, layer: Layer) -> &GraphLayer {
        match layer {
            Layer::Original => &self.original,
            Layer::Divided => &self.divided,
        }
    }

    /// Get a layer mutably.
    #[inline]
    pub fn layer_mut(&mut self, layer: Layer) -> &mut GraphLayer {
        match layer {
            Layer::Original => &mut self.original,
            Layer::Divided => &mut self.divided,
        }
    }

    /// Original (as loaded) layer.
    #[inline]
    pub fn original(&self) -> &GraphLayer {
        &self.original
    }

    /// Subdivided layer carrying the search segments.
    #[inline]
    pub fn divided(&self) -> &GraphLayer {
        &self.divided
    }

    /// Subdivided layer, mutably.
    #[inline]
    pub fn divided_mut(&mut self) -> &mut GraphLayer {
        &mut self.divided
    }

    /// Graph configuration.
    #[inline]
    pub fn config(&self) -> &RoadGraphConfig {
        &self.config
    }

    /// Check if the graph has no nodes (extraction found nothing walkable).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }

    /// Divided sub-edges of an original edge.
    pub fn chain(&self, original: EdgeKey) -> Option<&[EdgeKey]> {
        self.chains.get(&original).map(Vec::as_slice)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Nearest visible node; see [`GraphLayer::closest_node`].
    pub fn closest_node<L: LineOfSight + ?Sized>(
        &self,
        point: WorldPoint,
        node_type: Option<NodeType>,
        radius: Option<f32>,
        layer: Layer,
        sight: &L,
    ) -> Option<NodeId> {
        self.layer(layer).closest_node(point, node_type, radius, sight)
    }

    /// Nearest visible edge projection; see [`GraphLayer::closest_point_on_edges`].
    pub fn closest_point_on_edges<L: LineOfSight + ?Sized>(
        &self,
        point: WorldPoint,
        direction: Option<WorldPoint>,
        layer: Layer,
        sight: &L,
    ) -> Option<EdgeProjection> {
        self.layer(layer).closest_point_on_edges(
            point,
            direction,
            self.config.direction_tolerance,
            sight,
        )
    }

    /// Split an edge of a layer; see [`GraphLayer::insert_node_between`].
    ///
    /// A permanent split of an original edge rebuilds the divided layer,
    /// keeping the search state of sub-edges whose original edge is
    /// unchanged. A permanent split of a divided edge updates its chain.
    pub fn insert_node_between(
        &mut self,
        layer: Layer,
        a: NodeId,
        b: NodeId,
        position: WorldPoint,
        node_type: NodeType,
    ) -> Option<NodeId> {
        let inserted = self
            .layer_mut(layer)
            .insert_node_between(a, b, position, node_type)?;
        if node_type == NodeType::Temporary {
            return Some(inserted);
        }

        match layer {
            Layer::Original => {
                let previous = std::mem::take(&mut self.divided);
                let previous_chains = std::mem::take(&mut self.chains);
                self.rebuild_divided();
                self.carry_over(&previous, &previous_chains);
                debug!(
                    "[RoadMap] Permanent node {} split {}-{}, divided layer rebuilt ({} nodes)",
                    inserted,
                    a,
                    b,
                    self.divided.node_count()
                );
            }
            Layer::Divided => {
                let key = EdgeKey::new(a, b);
                for (original, chain) in self.chains.iter_mut() {
                    let Some(i) = chain.iter().position(|&k| k == key) else {
                        continue;
                    };
                    let entry = match i {
                        0 => original.low(),
                        _ if chain[i - 1].touches(a) => a,
                        _ => b,
                    };
                    let exit = if entry == a { b } else { a };
                    chain[i] = EdgeKey::new(entry, inserted);
                    chain.insert(i + 1, EdgeKey::new(inserted, exit));
                    break;
                }
            }
        }
        Some(inserted)
    }

    /// Copy claims and search state onto a rebuilt divided layer, for every
    /// original edge whose chain kept its length.
    fn carry_over(
        &mut self,
        previous: &GraphLayer,
        previous_chains: &BTreeMap<EdgeKey, Vec<EdgeKey>>,
    ) {
        for (original, old_chain) in previous_chains {
            let Some(new_chain) = self.chains.get(original) else {
                continue;
            };
            if new_chain.len() != old_chain.len() {
                continue;
            }
            for (&old, &new) in old_chain.iter().zip(new_chain) {
                let (Some(from), Some(to)) =
                    (previous.edge_by_key(old), self.divided.edge_by_key_mut(new))
                else {
                    continue;
                };
                to.planned_by = from.planned_by.clone();
                to.segment = from.segment.clone();
            }
        }
    }

    /// Retract temporary nodes and annotations from both layers.
    pub fn clear_temporary_nodes(&mut self) -> usize {
        self.original.clear_temporary_nodes() + self.divided.clear_temporary_nodes()
    }

    // ========================================================================
    // Path claims
    // ========================================================================

    /// Record that `agent` plans to walk `path` (node ids of `layer`).
    ///
    /// Claims on original edges are mirrored onto their divided sub-edges.
    /// Earlier claims by the same agent are released first.
    pub fn claim_path(&mut self, agent: AgentId, layer: Layer, path: &[NodeId]) {
        self.release_claims(agent);
        for pair in path.windows(2) {
            let key = EdgeKey::new(pair[0], pair[1]);
            let Some(edge) = self.layer_mut(layer).edge_by_key_mut(key) else {
                continue;
            };
            edge.planned_by.push(agent);
            if layer == Layer::Original {
                let chain = self.chains.get(&key).cloned().unwrap_or_default();
                for sub in chain {
                    if let Some(e) = self.divided.edge_by_key_mut(sub) {
                        e.planned_by.push(agent);
                    }
                }
            }
        }
    }

    /// Drop every claim held by `agent`.
    pub fn release_claims(&mut self, agent: AgentId) {
        for edge in self.original.edges_mut().chain(self.divided.edges_mut()) {
            edge.planned_by.retain(|&a| a != agent);
        }
    }

    /// Read-only snapshot of a layer for visualisation.
    pub fn snapshot(&self, layer: Layer) -> GraphSnapshot {
        GraphSnapshot::capture(self.layer(layer))
    }
}

/// Interior points splitting `a`-`b` into equal pieces no longer than `max_length`.
pub fn subdivide(a: WorldPoint, b: WorldPoint, max_length: f32) -> Vec<WorldPoint> {
    let length = a.distance(&b);
    if max_length <= 0.0 || length <= max_length {
        return Vec::new();
    }
    let pieces = (length / max_length).ceil() as usize;
    (1..pieces)
        .map(|i| a.lerp(&b, i as f32 / pieces as f32))
        .collect()
}
