//! Error types for Anveshan

use thiserror::Error;

use crate::config::ConfigLoadError;
use crate::io::RoadMapError;
use crate::world::PolygonMapError;

/// Anveshan error type
#[derive(Error, Debug)]
pub enum AnveshanError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigLoadError),

    #[error("Road map error: {0}")]
    RoadMap(#[from] RoadMapError),

    #[error("World map error: {0}")]
    WorldLoad(#[from] PolygonMapError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Road graph is empty")]
    EmptyGraph,
}

pub type Result<T> = std::result::Result<T, AnveshanError>;
