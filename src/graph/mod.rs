//! Road graph data model.
//!
//! The road graph is a sparse topological graph approximating navigable
//! space. It is held in two layers:
//!
//! - **Original**: nodes and edges as extracted by the skeleton extractor or
//!   loaded from a road-map file. Path finding and trajectory projection
//!   run here.
//! - **Divided**: the same graph with long edges split into short pieces.
//!   Every edge owns a [`SearchSegment`] and the search model runs here.
//!
//! Temporary nodes (projected guard positions) are inserted by splitting
//! edges and retracted with [`RoadGraph::clear_temporary_nodes`].

mod edge;
mod layer;
mod node;
mod road_graph;
mod road_map;
mod segment;
mod snapshot;

pub use edge::{EdgeKey, RoadEdge};
pub use layer::{EdgeProjection, GraphLayer, NEAR_CERTAIN};
pub use node::{GraphNode, NodeAnnotation, NodeId, NodeType};
pub use road_graph::{Layer, RoadGraph, RoadGraphConfig, subdivide};
pub use road_map::{RoadMap, RoadMapNode};
pub use segment::SearchSegment;
pub use snapshot::{EdgeSnapshot, GraphSnapshot, NodeSnapshot};
