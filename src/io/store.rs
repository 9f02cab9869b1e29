//! Road map file store with regeneration on failure.

use std::path::{Path, PathBuf};

use log::{info, warn};

use super::roadmap_format::{RoadMapError, load_road_map, save_road_map};
use crate::graph::RoadMap;
use crate::skeleton::{SkeletonConfig, SkeletonExtractor};
use crate::world::{LineOfSight, Walkable};

/// Road map persisted at a fixed path.
#[derive(Clone, Debug)]
pub struct RoadMapStore {
    path: PathBuf,
}

impl RoadMapStore {
    /// Create a store for `path`. Nothing is read until [`load`](Self::load).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File backing this store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the road map.
    pub fn load(&self) -> Result<RoadMap, RoadMapError> {
        load_road_map(&self.path)
    }

    /// Save the road map, replacing the file.
    pub fn save(&self, map: &RoadMap) -> Result<(), RoadMapError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        save_road_map(map, &self.path)
    }

    /// Load the road map, or extract it from `world` when the file is
    /// missing or malformed.
    ///
    /// A regenerated map is written back; a failed write is logged and
    /// the map is still returned.
    pub fn load_or_extract<W>(&self, world: &W, config: &SkeletonConfig) -> RoadMap
    where
        W: Walkable + LineOfSight + ?Sized,
    {
        match self.load() {
            Ok(map) => {
                info!(
                    "[RoadMap] Loaded {} nodes, {} edges from {}",
                    map.node_count(),
                    map.edge_count(),
                    self.path.display()
                );
                map
            }
            Err(e) => {
                warn!(
                    "[RoadMap] Could not load {} ({}), regenerating",
                    self.path.display(),
                    e
                );
                let map = SkeletonExtractor::new(config.clone()).extract(world);
                if let Err(e) = self.save(&map) {
                    warn!("[RoadMap] Failed to save {}: {}", self.path.display(), e);
                }
                map
            }
        }
    }
}
