//! Unified configuration loading for Anveshan.
//!
//! Loads every component configuration from a single YAML file. Missing
//! sections and fields fall back to their defaults.
//!
//! ```rust,ignore
//! use anveshan::config::AnveshanConfig;
//!
//! // Load from default path (configs/anveshan.yaml)
//! let config = AnveshanConfig::load_default()?;
//!
//! let graph = RoadGraph::from_road_map(&map, config.to_road_graph_config());
//! let model = SearchModel::new(&graph, config.to_search_config());
//! ```
//!
//! ## Configuration Sections
//!
//! | Section | Runtime type |
//! |---------|--------------|
//! | `skeleton` | [`SkeletonConfig`](crate::skeleton::SkeletonConfig) |
//! | `graph` | [`RoadGraphConfig`](crate::graph::RoadGraphConfig) |
//! | `pathfinding` | [`AStarConfig`](crate::pathfinding::AStarConfig) |
//! | `search` | [`SearchConfig`](crate::search::SearchConfig) |
//! | `projection` | [`ProjectionConfig`](crate::projection::ProjectionConfig) |
//! | `risk` | [`RiskConfig`](crate::risk::RiskConfig) |
//! | `decision` | [`DecisionConfig`](crate::decision::DecisionConfig) |
//! | `persistence` | [`PersistenceSection`] |
//!
//! ## Example YAML
//!
//! ```yaml
//! graph:
//!   max_segment_length: 1.0
//! search:
//!   policy: diffusion
//!   diffusion_factor: 0.05
//! risk:
//!   policy: closest_risk
//!   threshold: binary
//! persistence:
//!   roadmap_path: maps/level1.roadmap
//! ```

mod anveshan;
mod defaults;
mod error;
mod persistence;

pub use anveshan::AnveshanConfig;
pub use error::ConfigLoadError;
pub use persistence::PersistenceSection;
