//! Road map extraction pipeline.

use log::{debug, info, warn};

use super::config::SkeletonConfig;
use super::corners::{attach_corners, reflex_corners};
use super::raster::{DistanceField, WalkableRaster};
use super::ridge::RidgeMap;
use super::simplify::SkeletonGraph;
use crate::graph::RoadMap;
use crate::world::{LineOfSight, Walkable};

/// Medial-axis road map extractor.
///
/// ```text
/// walkable region → raster → distance field → ridge cells → node graph
///     → slim → prune collinear → coarsen → drop transitive edges
///     → bridge islands → tag dead ends → corner nodes
/// ```
#[derive(Clone, Debug, Default)]
pub struct SkeletonExtractor {
    config: SkeletonConfig,
}

impl SkeletonExtractor {
    pub fn new(config: SkeletonConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SkeletonConfig {
        &self.config
    }

    /// Extract a road map. An empty map is returned when nothing is walkable.
    pub fn extract<W>(&self, world: &W) -> RoadMap
    where
        W: Walkable + LineOfSight + ?Sized,
    {
        let raster = WalkableRaster::from_world(world, self.config.resolution);
        if raster.walkable_count() == 0 {
            warn!("[Skeleton] No walkable cells; road map is empty");
            return RoadMap::new();
        }

        let field = DistanceField::compute(&raster);
        let ridge = RidgeMap::detect(&raster, &field);
        debug!(
            "[Skeleton] {}x{} raster, {} walkable cells, max clearance {} cells, {} ridge cells",
            raster.width(),
            raster.height(),
            raster.walkable_count(),
            field.max(),
            ridge.len()
        );

        let mut graph = SkeletonGraph::from_ridge(&raster, &ridge);
        let initial = graph.alive_count();
        let pruned = graph.prune_collinear(self.config.collinear_tolerance);
        let coarsened = graph.coarsen(self.config.coarsen_distance);
        let transitive = graph.remove_transitive_edges();
        let bridges = graph.reconnect_islands(&raster, world);
        graph.tag_dead_ends();
        debug!(
            "[Skeleton] {} nodes: {} pruned, {} merged, {} transitive edges, {} bridges",
            initial, pruned, coarsened, transitive, bridges
        );

        let corners = if self.config.add_corner_nodes {
            let positions = reflex_corners(world, self.config.corner_offset);
            attach_corners(&mut graph, &positions, world, self.config.corner_snap_distance)
        } else {
            0
        };

        let map = graph.to_road_map();
        info!(
            "[Skeleton] Extracted road map: {} nodes ({} corners), {} edges",
            map.node_count(),
            corners,
            map.edge_count()
        );
        map
    }
}
