//! Collaborator interfaces consumed by the search engine.
//!
//! The engine never owns the map geometry, the agents' senses or the
//! simulation clock. The surrounding simulation implements these traits
//! and passes them into each component explicitly:
//!
//! | Trait | Used by |
//! |-------|---------|
//! | [`Walkable`] | Skeleton extraction |
//! | [`LineOfSight`] | Graph queries, path simplification, island reconnection, risk checks |
//! | [`FieldOfView`] | Search segment clearing, trajectory projection |
//! | [`Clock`] | Observation timestamps, path failure back-off |
//! | [`FallbackPlanner`] | Degenerate two-point graph paths |
//!
//! Reference implementations ([`PolygonMap`], [`ManualClock`],
//! [`ConeFieldOfView`], [`StraightLineFallback`]) are provided for tests and
//! the command-line tool.

mod clock;
mod fov;
mod polygon;

pub use clock::ManualClock;
pub use fov::{ConeFieldOfView, ViewCone};
pub use polygon::{PolygonMap, PolygonMapError};

use crate::core::{AgentId, Bounds, WorldPoint};

/// Walkable-region predicate and wall boundary query.
pub trait Walkable {
    /// Check whether a point lies in the map's walkable interior.
    fn is_walkable(&self, point: WorldPoint) -> bool;

    /// Rectangle enclosing the whole walkable region.
    fn bounds(&self) -> Bounds;

    /// Wall polygons (outer boundary and obstacles) as closed vertex rings.
    fn wall_polygons(&self) -> Vec<Vec<WorldPoint>>;
}

/// Line-of-sight test between two points.
pub trait LineOfSight {
    /// Check whether the straight segment `a`-`b` is unobstructed.
    fn has_line_of_sight(&self, a: WorldPoint, b: WorldPoint) -> bool;
}

/// Per-agent field-of-view test.
pub trait FieldOfView {
    /// Check whether `point` is currently visible to `agent`.
    fn contains(&self, agent: AgentId, point: WorldPoint) -> bool;
}

/// Monotonic simulation clock.
pub trait Clock {
    /// Elapsed simulation time in seconds.
    fn elapsed(&self) -> f32;
}

/// Geometry-only shortest path used when a graph path degenerates.
pub trait FallbackPlanner {
    /// Plan a path from `a` to `b` through continuous space.
    fn shortest_path(&self, a: WorldPoint, b: WorldPoint) -> Vec<WorldPoint>;
}

/// Fallback that walks straight from start to goal.
#[derive(Clone, Copy, Debug, Default)]
pub struct StraightLineFallback;

impl FallbackPlanner for StraightLineFallback {
    fn shortest_path(&self, a: WorldPoint, b: WorldPoint) -> Vec<WorldPoint> {
        vec![a, b]
    }
}

/// Line of sight that is never blocked (open field).
#[derive(Clone, Copy, Debug, Default)]
pub struct OpenSight;

impl LineOfSight for OpenSight {
    fn has_line_of_sight(&self, _a: WorldPoint, _b: WorldPoint) -> bool {
        true
    }
}

/// Field of view in which nobody sees anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct Blind;

impl FieldOfView for Blind {
    fn contains(&self, _agent: AgentId, _point: WorldPoint) -> bool {
        false
    }
}

impl<T: LineOfSight + ?Sized> LineOfSight for &T {
    fn has_line_of_sight(&self, a: WorldPoint, b: WorldPoint) -> bool {
        (**self).has_line_of_sight(a, b)
    }
}

impl<T: FieldOfView + ?Sized> FieldOfView for &T {
    fn contains(&self, agent: AgentId, point: WorldPoint) -> bool {
        (**self).contains(agent, point)
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn elapsed(&self) -> f32 {
        (**self).elapsed()
    }
}
