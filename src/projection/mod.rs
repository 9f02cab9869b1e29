//! Guard trajectory projection.
//!
//! Each tick the [`TrajectoryProjector`] retracts the previous forecast and
//! inserts temporary nodes on the original layer where guards may be within
//! the look-ahead window. Node annotations carry the occupancy risk that the
//! risk evaluator and the risk-ceiling A* read back.

mod config;
mod projector;

pub use config::{ProjectionConfig, ProjectionMode};
pub use projector::{GuardState, ProjectedPosition, TrajectoryProjector};
