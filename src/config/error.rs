//! Configuration loading errors.

use thiserror::Error;

/// Error loading configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigLoadError {
    /// I/O error
    #[error("IO error: {0}")]
    Io(String),
    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),
}
