//! Axis-aligned bounding box for spatial operations.
//!
//! [`Bounds`] describes the rectangle that the skeleton extractor rasterizes
//! and that SVG export fits its view box to.

use serde::{Deserialize, Serialize};

use super::point::WorldPoint;

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum corner (smallest x and y values).
    pub min: WorldPoint,
    /// Maximum corner (largest x and y values).
    pub max: WorldPoint,
}

impl Bounds {
    /// Create a new bounding box from min and max corners.
    #[inline]
    pub const fn new(min: WorldPoint, max: WorldPoint) -> Self {
        Self { min, max }
    }

    /// Create an empty (invalid) bounding box.
    ///
    /// The empty bounds has min > max, so it will expand to fit any point.
    #[inline]
    pub fn empty() -> Self {
        Self {
            min: WorldPoint::new(f32::INFINITY, f32::INFINITY),
            max: WorldPoint::new(f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    /// Bounds of a point set (empty bounds for an empty set).
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a WorldPoint>) -> Self {
        let mut bounds = Self::empty();
        for p in points {
            bounds.expand_to_include(*p);
        }
        bounds
    }

    /// Check if the bounds are empty (invalid).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Width of the bounding box (x extent).
    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Height of the bounding box (y extent).
    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Center of the bounding box.
    #[inline]
    pub fn center(&self) -> WorldPoint {
        WorldPoint::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
        )
    }

    /// Check if a point is inside the bounding box.
    #[inline]
    pub fn contains(&self, point: WorldPoint) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Grow the bounds to include a point.
    #[inline]
    pub fn expand_to_include(&mut self, point: WorldPoint) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
    }

    /// Return a copy grown by `margin` on every side.
    #[inline]
    pub fn expanded(&self, margin: f32) -> Self {
        Self {
            min: WorldPoint::new(self.min.x - margin, self.min.y - margin),
            max: WorldPoint::new(self.max.x + margin, self.max.y + margin),
        }
    }
}
