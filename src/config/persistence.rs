//! Persistence configuration section.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Persistence settings section
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersistenceSection {
    /// Road map file read at startup and rewritten after regeneration
    #[serde(default = "defaults::roadmap_path")]
    pub roadmap_path: String,

    /// Re-extract the road map when the file is missing or malformed
    #[serde(default = "defaults::enabled")]
    pub regenerate_on_error: bool,

    /// Directory for SVG graph snapshots
    #[serde(default = "defaults::snapshot_dir")]
    pub snapshot_dir: String,
}

impl Default for PersistenceSection {
    fn default() -> Self {
        Self {
            roadmap_path: defaults::roadmap_path(),
            regenerate_on_error: true,
            snapshot_dir: defaults::snapshot_dir(),
        }
    }
}

impl PersistenceSection {
    /// Road map path as a `PathBuf`.
    pub fn roadmap_path(&self) -> PathBuf {
        PathBuf::from(&self.roadmap_path)
    }

    /// Snapshot directory as a `PathBuf`.
    pub fn snapshot_dir(&self) -> PathBuf {
        PathBuf::from(&self.snapshot_dir)
    }
}
