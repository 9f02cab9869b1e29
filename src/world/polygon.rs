//! Polygonal map: an outer boundary with polygonal obstacles.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{LineOfSight, Walkable};
use crate::core::geometry::{point_in_polygon, polygon_edges, segments_intersect};
use crate::core::{Bounds, WorldPoint};

/// Errors loading a polygon map description.
#[derive(Error, Debug)]
pub enum PolygonMapError {
    /// File could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A polygon has fewer than three vertices.
    #[error("Degenerate polygon {index}: {vertices} vertices")]
    Degenerate {
        /// Polygon index (0 = boundary, holes from 1).
        index: usize,
        /// Number of vertices found.
        vertices: usize,
    },
}

/// Walkable region bounded by `boundary` with `holes` cut out of it.
///
/// ```yaml
/// boundary: [{x: 0, y: 0}, {x: 10, y: 0}, {x: 10, y: 6}, {x: 0, y: 6}]
/// holes:
///   - [{x: 4, y: 0}, {x: 5, y: 0}, {x: 5, y: 4}, {x: 4, y: 4}]
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolygonMap {
    /// Outer wall ring.
    pub boundary: Vec<WorldPoint>,
    /// Obstacle rings inside the boundary.
    #[serde(default)]
    pub holes: Vec<Vec<WorldPoint>>,
}

impl PolygonMap {
    /// Create a map from a boundary ring and obstacle rings.
    pub fn new(boundary: Vec<WorldPoint>, holes: Vec<Vec<WorldPoint>>) -> Self {
        Self { boundary, holes }
    }

    /// Axis-aligned rectangular room from the origin.
    pub fn rectangle(width: f32, height: f32) -> Self {
        Self::new(rect_ring(0.0, 0.0, width, height), Vec::new())
    }

    /// Add a rectangular obstacle.
    pub fn with_rect_hole(mut self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        self.holes.push(rect_ring(min_x, min_y, max_x, max_y));
        self
    }

    /// Load from a YAML file.
    pub fn load(path: &Path) -> Result<Self, PolygonMapError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, PolygonMapError> {
        let map: PolygonMap =
            serde_yaml::from_str(yaml).map_err(|e| PolygonMapError::Parse(e.to_string()))?;
        map.validate()?;
        Ok(map)
    }

    fn validate(&self) -> Result<(), PolygonMapError> {
        for (index, ring) in std::iter::once(&self.boundary).chain(&self.holes).enumerate() {
            if ring.len() < 3 {
                return Err(PolygonMapError::Degenerate {
                    index,
                    vertices: ring.len(),
                });
            }
        }
        Ok(())
    }

    fn rings(&self) -> impl Iterator<Item = &Vec<WorldPoint>> {
        std::iter::once(&self.boundary).chain(&self.holes)
    }
}

fn rect_ring(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Vec<WorldPoint> {
    vec![
        WorldPoint::new(min_x, min_y),
        WorldPoint::new(max_x, min_y),
        WorldPoint::new(max_x, max_y),
        WorldPoint::new(min_x, max_y),
    ]
}

impl Walkable for PolygonMap {
    fn is_walkable(&self, point: WorldPoint) -> bool {
        point_in_polygon(point, &self.boundary)
            && !self.holes.iter().any(|h| point_in_polygon(point, h))
    }

    fn bounds(&self) -> Bounds {
        Bounds::from_points(&self.boundary)
    }

    fn wall_polygons(&self) -> Vec<Vec<WorldPoint>> {
        self.rings().cloned().collect()
    }
}

impl LineOfSight for PolygonMap {
    fn has_line_of_sight(&self, a: WorldPoint, b: WorldPoint) -> bool {
        if !self.is_walkable(a) || !self.is_walkable(b) {
            return false;
        }
        let crosses_wall = self
            .rings()
            .flat_map(|ring| polygon_edges(ring))
            .any(|(p, q)| segments_intersect(a, b, p, q));
        !crosses_wall && self.is_walkable(a.lerp(&b, 0.5))
    }
}
