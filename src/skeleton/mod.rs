//! Road map extraction from a walkable region.
//!
//! The walkable region is rasterized at one node diameter per cell. The
//! Chebyshev distance transform of that raster peaks along the medial axis;
//! its local maxima, plus the saddles joining them, become a dense graph
//! which is then simplified into a sparse road map. Reflex wall vertices
//! get corner nodes for perimeter risk.

mod config;
mod corners;
mod extractor;
mod raster;
mod ridge;
mod simplify;

pub use config::SkeletonConfig;
pub use extractor::SkeletonExtractor;
pub use raster::{DistanceField, WalkableRaster};
pub use ridge::{RidgeKind, RidgeMap};
