//! Path planning over the road graph.
//!
//! - **A* Search** ([`AStarPlanner`]): node-to-node search on one layer with
//!   an optional risk ceiling and best-effort partial paths
//! - **Path Finder** ([`PathFinder`]): point-to-point requests with node
//!   snapping, continuous-space fallback and failure timestamps
//! - **Smoothing**: line-of-sight waypoint reduction
//! - **Dijkstra**: all-distances helper for graph-wide metrics
//!
//! ```rust,ignore
//! use anveshan::pathfinding::{AStarConfig, AStarPlanner};
//!
//! let planner = AStarPlanner::new(graph.original(), &map, AStarConfig::default());
//! let result = planner.find_path(start, goal, Some(0.5));
//! if result.success {
//!     println!("Path found with {} waypoints", result.points.len());
//! }
//! ```

pub mod astar;
pub mod dijkstra;
pub mod planner;
pub mod smoothing;

pub use astar::{AStarConfig, AStarPlanner, Heuristic, PathFailure, PathResult};
pub use dijkstra::{dijkstra_distances, longest_shortest_path};
pub use planner::PathFinder;
pub use smoothing::{shortcut_path, simplify_path};
