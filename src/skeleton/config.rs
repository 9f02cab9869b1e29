//! Configuration for road map extraction.

use serde::{Deserialize, Serialize};

/// Skeleton extraction parameters.
///
/// All distances are in map units and scale with `resolution`, the
/// sampling cell size (one node diameter).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SkeletonConfig {
    /// Raster cell size.
    /// Default: 0.5
    pub resolution: f32,

    /// Degree-2 nodes closer than this to the line joining their
    /// neighbors are removed.
    /// Default: 0.3
    pub collinear_tolerance: f32,

    /// Connected same-type nodes closer than this are merged.
    /// Default: 0.8
    pub coarsen_distance: f32,

    /// Distance of corner nodes from their wall vertex.
    /// Default: 0.5
    pub corner_offset: f32,

    /// Corner nodes attach to an existing node instead of splitting an
    /// edge when the projection lands this close to it.
    /// Default: 0.25
    pub corner_snap_distance: f32,

    /// Add corner nodes at reflex wall vertices.
    /// Default: true
    pub add_corner_nodes: bool,
}

impl Default for SkeletonConfig {
    fn default() -> Self {
        Self {
            resolution: 0.5,
            collinear_tolerance: 0.3,
            coarsen_distance: 0.8,
            corner_offset: 0.5,
            corner_snap_distance: 0.25,
            add_corner_nodes: true,
        }
    }
}

impl SkeletonConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter for the raster resolution.
    pub fn with_resolution(mut self, resolution: f32) -> Self {
        self.resolution = resolution;
        self
    }

    /// Builder-style setter for the collinearity tolerance.
    pub fn with_collinear_tolerance(mut self, tolerance: f32) -> Self {
        self.collinear_tolerance = tolerance;
        self
    }

    /// Builder-style setter for the coarsening distance.
    pub fn with_coarsen_distance(mut self, distance: f32) -> Self {
        self.coarsen_distance = distance;
        self
    }

    /// Builder-style setter for corner node generation.
    pub fn with_corner_nodes(mut self, enabled: bool) -> Self {
        self.add_corner_nodes = enabled;
        self
    }
}
