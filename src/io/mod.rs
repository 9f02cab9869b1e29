//! Persistence and export.
//!
//! - [`roadmap_format`]: plain-text road map files (`x,y,type` node table,
//!   `-,-` sentinel, 1-based edge pairs)
//! - [`RoadMapStore`]: load a road map, regenerating it from the world when
//!   the file is missing or malformed
//! - [`svg`]: SVG rendering of graph snapshots

pub mod roadmap_format;
mod store;
pub mod svg;

pub use roadmap_format::{
    RoadMapError, load_road_map, parse_road_map, read_road_map, save_road_map, write_road_map,
};
pub use store::RoadMapStore;
pub use svg::{render_snapshot, save_svg};
