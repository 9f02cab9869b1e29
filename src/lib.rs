//! # Anveshan: Graph-Based Probabilistic Search
//!
//! A search engine for agents that patrol and hunt inside a 2-D map. The map's
//! walkable space is reduced to a sparse road graph; belief about where a
//! hidden agent may be is spread over the graph's edges, and guards choose
//! where to look and where it is safe to go from that belief.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use anveshan::graph::{RoadGraph, RoadGraphConfig};
//! use anveshan::search::{SearchConfig, SearchModel};
//! use anveshan::skeleton::SkeletonExtractor;
//! use anveshan::world::{Blind, ManualClock, PolygonMap};
//!
//! let world = PolygonMap::rectangle(10.0, 6.0).with_rect_hole(4.5, 0.0, 5.5, 2.5);
//! let road_map = SkeletonExtractor::default().extract(&world);
//! let mut graph = RoadGraph::from_road_map(&road_map, RoadGraphConfig::default());
//!
//! let mut model = SearchModel::new(&graph, SearchConfig::default());
//! let clock = ManualClock::new();
//! model.seed_at_point(&mut graph, anveshan::WorldPoint::new(2.0, 3.0), 1.0, &world);
//! for _ in 0..10 {
//!     clock.advance(0.1);
//!     model.tick(&mut graph, &Blind, &clock, 0.1);
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: Points, bounds, geometry helpers, agent ids
//! - [`world`]: Collaborator traits (walkability, line of sight, field of
//!   view, clock) and reference implementations
//! - [`config`]: Unified YAML configuration
//! - [`skeleton`]: Road map extraction from a walkability predicate
//! - [`graph`]: Two-layer road graph with search segments and temporary nodes
//! - [`pathfinding`]: A*, path smoothing, Dijkstra helpers
//! - [`search`]: Per-tick belief update (propagation or diffusion)
//! - [`projection`]: Guard trajectory projection into temporary risk nodes
//! - [`risk`]: Path risk assessment and thresholds
//! - [`decision`]: Goal selection under competing utilities
//! - [`analysis`]: Graph-wide metrics (radius, diameter, cycles)
//! - [`io`]: Road map files and SVG snapshots
//!
//! ## Data Flow
//!
//! ```text
//!   Walkable world ──► SkeletonExtractor ──► RoadMap ──► RoadGraph
//!                                              ▲          │  original ──► A*, projection, risk
//!                              RoadMapStore ───┘          │  divided  ──► SearchModel::tick
//!                                                         ▼
//!                                                  GraphSnapshot ──► SVG
//! ```

pub mod analysis;
pub mod config;
pub mod core;
pub mod decision;
pub mod error;
pub mod graph;
pub mod io;
pub mod pathfinding;
pub mod projection;
pub mod risk;
pub mod search;
pub mod skeleton;
pub mod world;

pub use crate::config::{AnveshanConfig, ConfigLoadError};
pub use crate::core::{AgentId, Bounds, GridCoord, WorldPoint};
pub use crate::error::{AnveshanError, Result};
pub use crate::graph::{
    EdgeKey, GraphLayer, GraphSnapshot, Layer, NodeId, NodeType, RoadGraph, RoadGraphConfig,
    RoadMap,
};
pub use crate::io::RoadMapStore;
pub use crate::pathfinding::{AStarConfig, AStarPlanner, PathFinder, PathResult};
pub use crate::projection::{GuardState, TrajectoryProjector};
pub use crate::risk::{RiskAssessment, RiskEvaluator};
pub use crate::search::{SearchConfig, SearchModel};
pub use crate::skeleton::{SkeletonConfig, SkeletonExtractor};
