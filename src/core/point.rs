//! Point and coordinate types for road maps and rasterized walkable regions.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// Grid coordinates (integer cell indices) used by the skeleton raster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    /// X coordinate (column index)
    pub x: i32,
    /// Y coordinate (row index)
    pub y: i32,
}

impl GridCoord {
    /// Create a new grid coordinate
    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance (max of x and y distance) - used for 8-connected grids
    #[inline]
    pub fn chebyshev_distance(&self, other: &GridCoord) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Check whether `other` is one of the 8 surrounding cells.
    #[inline]
    pub fn is_adjacent_8(&self, other: &GridCoord) -> bool {
        *self != *other && self.chebyshev_distance(other) == 1
    }

    /// Get the 8 neighbors in ring order, starting north and going clockwise.
    ///
    /// Ring order matters for saddle detection, which scans the ring for
    /// contiguous arcs.
    #[inline]
    pub fn neighbors_8(&self) -> [GridCoord; 8] {
        [
            GridCoord::new(self.x, self.y + 1),     // N
            GridCoord::new(self.x + 1, self.y + 1), // NE
            GridCoord::new(self.x + 1, self.y),     // E
            GridCoord::new(self.x + 1, self.y - 1), // SE
            GridCoord::new(self.x, self.y - 1),     // S
            GridCoord::new(self.x - 1, self.y - 1), // SW
            GridCoord::new(self.x - 1, self.y),     // W
            GridCoord::new(self.x - 1, self.y + 1), // NW
        ]
    }

    /// The 12-cell ring surrounding the 2x2 block whose lower-left cell is `self`.
    ///
    /// Clockwise from the cell above the block's top-left corner.
    pub fn ring_12(&self) -> [GridCoord; 12] {
        let (x, y) = (self.x, self.y);
        [
            GridCoord::new(x, y + 2),
            GridCoord::new(x + 1, y + 2),
            GridCoord::new(x + 2, y + 2),
            GridCoord::new(x + 2, y + 1),
            GridCoord::new(x + 2, y),
            GridCoord::new(x + 2, y - 1),
            GridCoord::new(x + 1, y - 1),
            GridCoord::new(x, y - 1),
            GridCoord::new(x - 1, y - 1),
            GridCoord::new(x - 1, y),
            GridCoord::new(x - 1, y + 1),
            GridCoord::new(x - 1, y + 2),
        ]
    }
}

impl Add for GridCoord {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        GridCoord::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for GridCoord {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        GridCoord::new(self.x - other.x, self.y - other.y)
    }
}

/// World coordinates in map-local units.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPoint {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl WorldPoint {
    /// Create a new world point
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Zero point (origin)
    pub const ZERO: WorldPoint = WorldPoint { x: 0.0, y: 0.0 };

    /// Euclidean distance to another point
    #[inline]
    pub fn distance(&self, other: &WorldPoint) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Squared distance (faster, avoids sqrt)
    #[inline]
    pub fn distance_squared(&self, other: &WorldPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Angle from this point to another (radians, CCW from +X)
    #[inline]
    pub fn angle_to(&self, other: &WorldPoint) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dy.atan2(dx)
    }

    /// Unit vector for a heading angle.
    #[inline]
    pub fn from_angle(angle: f32) -> WorldPoint {
        WorldPoint::new(angle.cos(), angle.sin())
    }

    /// Length (magnitude) of this point as a vector from origin
    #[inline]
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Normalize to unit length
    #[inline]
    pub fn normalize(&self) -> WorldPoint {
        let len = self.length();
        if len > 0.0 {
            WorldPoint::new(self.x / len, self.y / len)
        } else {
            *self
        }
    }

    /// Dot product with another point (as vectors)
    #[inline]
    pub fn dot(&self, other: &WorldPoint) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Cross product (z-component of 3D cross product)
    #[inline]
    pub fn cross(&self, other: &WorldPoint) -> f32 {
        self.x * other.y - self.y * other.x
    }

    /// Linear interpolation towards `other` (t=0 is self, t=1 is other).
    #[inline]
    pub fn lerp(&self, other: &WorldPoint, t: f32) -> WorldPoint {
        WorldPoint::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    /// Move towards `target` by at most `step`, never overshooting.
    #[inline]
    pub fn move_towards(&self, target: &WorldPoint, step: f32) -> WorldPoint {
        let remaining = self.distance(target);
        if remaining <= step || remaining <= f32::EPSILON {
            *target
        } else {
            self.lerp(target, step / remaining)
        }
    }

    /// Check if two points coincide within `tolerance`.
    #[inline]
    pub fn approx_eq(&self, other: &WorldPoint, tolerance: f32) -> bool {
        self.distance_squared(other) <= tolerance * tolerance
    }
}

impl Add for WorldPoint {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        WorldPoint::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for WorldPoint {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        WorldPoint::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f32> for WorldPoint {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: f32) -> Self {
        WorldPoint::new(self.x * scalar, self.y * scalar)
    }
}
