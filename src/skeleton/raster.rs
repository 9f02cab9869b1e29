//! Walkable-region raster and its Chebyshev distance transform.

use std::collections::VecDeque;

use crate::core::{GridCoord, WorldPoint};
use crate::world::Walkable;

/// Row-major walkable mask over the world bounds.
///
/// Cell (x, y) covers `origin + (x, y) * resolution` to
/// `origin + (x + 1, y + 1) * resolution` and is sampled at its center.
#[derive(Clone, Debug)]
pub struct WalkableRaster {
    walkable: Vec<bool>,
    width: usize,
    height: usize,
    resolution: f32,
    origin: WorldPoint,
}

impl WalkableRaster {
    /// Sample `world` at every cell center.
    pub fn from_world<W: Walkable + ?Sized>(world: &W, resolution: f32) -> Self {
        let bounds = world.bounds();
        if bounds.is_empty() || resolution <= 0.0 {
            return Self::empty(resolution);
        }
        let width = (bounds.width() / resolution).ceil() as usize;
        let height = (bounds.height() / resolution).ceil() as usize;
        let mut raster = Self {
            walkable: vec![false; width * height],
            width,
            height,
            resolution,
            origin: bounds.min,
        };
        for i in 0..raster.walkable.len() {
            let center = raster.grid_to_world(raster.index_to_coord(i));
            raster.walkable[i] = world.is_walkable(center);
        }
        raster
    }

    /// Fully walkable raster of unit cells from the origin.
    #[cfg(test)]
    pub(crate) fn filled(width: usize, height: usize) -> Self {
        Self {
            walkable: vec![true; width * height],
            width,
            height,
            resolution: 1.0,
            origin: WorldPoint::ZERO,
        }
    }

    fn empty(resolution: f32) -> Self {
        Self {
            walkable: Vec::new(),
            width: 0,
            height: 0,
            resolution,
            origin: WorldPoint::ZERO,
        }
    }

    /// Grid width in cells
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in cells
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn resolution(&self) -> f32 {
        self.resolution
    }

    /// Total number of cells
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.walkable.len()
    }

    pub fn walkable_count(&self) -> usize {
        self.walkable.iter().filter(|&&w| w).count()
    }

    /// Out-of-grid cells are not walkable.
    #[inline]
    pub fn is_walkable(&self, coord: GridCoord) -> bool {
        self.coord_to_index(coord).is_some_and(|i| self.walkable[i])
    }

    /// Convert world coordinates to grid coordinates
    #[inline]
    pub fn world_to_grid(&self, point: WorldPoint) -> GridCoord {
        let x = ((point.x - self.origin.x) / self.resolution).floor() as i32;
        let y = ((point.y - self.origin.y) / self.resolution).floor() as i32;
        GridCoord::new(x, y)
    }

    /// Convert grid coordinates to world coordinates (cell center)
    #[inline]
    pub fn grid_to_world(&self, coord: GridCoord) -> WorldPoint {
        WorldPoint::new(
            self.origin.x + (coord.x as f32 + 0.5) * self.resolution,
            self.origin.y + (coord.y as f32 + 0.5) * self.resolution,
        )
    }

    /// Convert grid coordinates to flat array index
    #[inline]
    pub fn coord_to_index(&self, coord: GridCoord) -> Option<usize> {
        let inside = coord.x >= 0
            && coord.y >= 0
            && (coord.x as usize) < self.width
            && (coord.y as usize) < self.height;
        inside.then(|| coord.y as usize * self.width + coord.x as usize)
    }

    /// Convert flat array index to grid coordinates
    #[inline]
    pub fn index_to_coord(&self, index: usize) -> GridCoord {
        GridCoord::new((index % self.width) as i32, (index / self.width) as i32)
    }
}

/// Chebyshev distance (in cells) from each walkable cell to the nearest
/// unwalkable or out-of-grid cell. Unwalkable cells hold 0.
#[derive(Clone, Debug)]
pub struct DistanceField {
    distances: Vec<u32>,
    width: usize,
    height: usize,
    max: u32,
}

impl DistanceField {
    /// Multi-source breadth-first transform seeded from cells touching a wall.
    pub fn compute(raster: &WalkableRaster) -> Self {
        let mut distances = vec![0u32; raster.cell_count()];
        let mut queue = VecDeque::new();

        for (i, distance) in distances.iter_mut().enumerate() {
            let coord = raster.index_to_coord(i);
            if raster.is_walkable(coord)
                && coord.neighbors_8().iter().any(|&n| !raster.is_walkable(n))
            {
                *distance = 1;
                queue.push_back(coord);
            }
        }

        while let Some(coord) = queue.pop_front() {
            let Some(index) = raster.coord_to_index(coord) else {
                continue;
            };
            let next = distances[index] + 1;
            for neighbor in coord.neighbors_8() {
                if let Some(j) = raster.coord_to_index(neighbor) {
                    if raster.walkable[j] && distances[j] == 0 {
                        distances[j] = next;
                        queue.push_back(neighbor);
                    }
                }
            }
        }

        let max = distances.iter().copied().max().unwrap_or(0);
        Self {
            distances,
            width: raster.width,
            height: raster.height,
            max,
        }
    }

    /// Field with given row-major values.
    #[cfg(test)]
    pub(crate) fn from_values(distances: Vec<u32>, width: usize, height: usize) -> Self {
        let max = distances.iter().copied().max().unwrap_or(0);
        Self {
            distances,
            width,
            height,
            max,
        }
    }

    /// Distance at `coord`; 0 outside the grid.
    #[inline]
    pub fn get(&self, coord: GridCoord) -> u32 {
        let inside = coord.x >= 0
            && coord.y >= 0
            && (coord.x as usize) < self.width
            && (coord.y as usize) < self.height;
        if inside {
            self.distances[coord.y as usize * self.width + coord.x as usize]
        } else {
            0
        }
    }

    /// Largest distance in the field.
    pub fn max(&self) -> u32 {
        self.max
    }

    /// Distance scaled to [0, 1] by the field maximum.
    pub fn normalized(&self, coord: GridCoord) -> f32 {
        if self.max == 0 {
            0.0
        } else {
            self.get(coord) as f32 / self.max as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::PolygonMap;

    #[test]
    fn test_raster_dimensions() {
        let raster = WalkableRaster::from_world(&PolygonMap::rectangle(10.0, 4.0), 0.5);
        assert_eq!(raster.width(), 20);
        assert_eq!(raster.height(), 8);
        assert_eq!(raster.walkable_count(), 160);
        assert_eq!(raster.world_to_grid(WorldPoint::new(1.2, 0.7)), GridCoord::new(2, 1));
        assert_eq!(raster.grid_to_world(GridCoord::new(2, 1)), WorldPoint::new(1.25, 0.75));
    }

    #[test]
    fn test_chebyshev_distances() {
        let raster = WalkableRaster::from_world(&PolygonMap::rectangle(10.0, 4.0), 0.5);
        let field = DistanceField::compute(&raster);
        assert_eq!(field.get(GridCoord::new(0, 0)), 1);
        assert_eq!(field.get(GridCoord::new(1, 1)), 2);
        assert_eq!(field.get(GridCoord::new(10, 3)), 4);
        assert_eq!(field.get(GridCoord::new(-1, 0)), 0);
        assert_eq!(field.max(), 4);
        assert_eq!(field.normalized(GridCoord::new(10, 4)), 1.0);
    }

    #[test]
    fn test_hole_cells_are_zero() {
        let map = PolygonMap::rectangle(10.0, 6.0).with_rect_hole(4.0, 2.0, 6.0, 4.0);
        let raster = WalkableRaster::from_world(&map, 0.5);
        let field = DistanceField::compute(&raster);
        let inside_hole = raster.world_to_grid(WorldPoint::new(5.0, 3.0));
        assert!(!raster.is_walkable(inside_hole));
        assert_eq!(field.get(inside_hole), 0);
    }
}
