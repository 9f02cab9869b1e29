//! Core types for the anveshan search engine.
//!
//! This module provides the fundamental types used throughout the library:
//! - [`GridCoord`] and [`WorldPoint`]: Coordinate types
//! - [`Bounds`]: Axis-aligned map extent
//! - [`geometry`]: Segment projection, intersection and polygon helpers
//! - [`AgentId`]: Identifier for guards and intruders

mod bounds;
pub mod geometry;
mod point;

pub use bounds::Bounds;
pub use point::{GridCoord, WorldPoint};

use serde::{Deserialize, Serialize};

/// Identifier of a simulated agent (guard or intruder).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u32);

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "agent#{}", self.0)
    }
}
