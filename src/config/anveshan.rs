//! Main AnveshanConfig and conversion methods.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::decision::DecisionConfig;
use crate::graph::RoadGraphConfig;
use crate::pathfinding::AStarConfig;
use crate::projection::ProjectionConfig;
use crate::risk::RiskConfig;
use crate::search::SearchConfig;
use crate::skeleton::SkeletonConfig;

use super::error::ConfigLoadError;
use super::persistence::PersistenceSection;

/// Default config file location, relative to the working directory.
const DEFAULT_PATH: &str = "configs/anveshan.yaml";

/// Full Anveshan configuration loaded from YAML
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct AnveshanConfig {
    /// Skeleton extraction settings
    #[serde(default)]
    pub skeleton: SkeletonConfig,

    /// Road graph subdivision and query settings
    #[serde(default)]
    pub graph: RoadGraphConfig,

    /// A* settings
    #[serde(default)]
    pub pathfinding: AStarConfig,

    /// Search segment model settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Trajectory projection settings
    #[serde(default)]
    pub projection: ProjectionConfig,

    /// Risk evaluation settings
    #[serde(default)]
    pub risk: RiskConfig,

    /// Goal selection settings
    #[serde(default)]
    pub decision: DecisionConfig,

    /// Persistence settings
    #[serde(default)]
    pub persistence: PersistenceSection,
}

impl AnveshanConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigLoadError::Io(e.to_string()))?;
        Self::from_yaml(&contents)
    }

    /// Load from default config path (configs/anveshan.yaml)
    pub fn load_default() -> Result<Self, ConfigLoadError> {
        let path = Path::new(DEFAULT_PATH);
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigLoadError::Parse(e.to_string()))
    }

    /// Serialize to a YAML string
    pub fn to_yaml(&self) -> Result<String, ConfigLoadError> {
        serde_yaml::to_string(self).map_err(|e| ConfigLoadError::Parse(e.to_string()))
    }

    /// Convert to SkeletonConfig
    pub fn to_skeleton_config(&self) -> SkeletonConfig {
        self.skeleton.clone()
    }

    /// Convert to RoadGraphConfig
    pub fn to_road_graph_config(&self) -> RoadGraphConfig {
        self.graph.clone()
    }

    /// Convert to AStarConfig
    pub fn to_astar_config(&self) -> AStarConfig {
        self.pathfinding.clone()
    }

    /// Convert to SearchConfig
    pub fn to_search_config(&self) -> SearchConfig {
        self.search.clone()
    }

    /// Convert to ProjectionConfig
    pub fn to_projection_config(&self) -> ProjectionConfig {
        self.projection.clone()
    }

    /// Convert to RiskConfig
    pub fn to_risk_config(&self) -> RiskConfig {
        self.risk.clone()
    }

    /// Convert to DecisionConfig
    pub fn to_decision_config(&self) -> DecisionConfig {
        self.decision.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::{RiskPolicy, ThresholdStrategy};
    use crate::search::UpdatePolicy;

    #[test]
    fn test_empty_yaml_gives_defaults() {
        let config = AnveshanConfig::from_yaml("{}").unwrap();
        assert_eq!(config.graph.max_segment_length, 1.0);
        assert_eq!(config.search.policy, UpdatePolicy::Propagation);
        assert_eq!(config.persistence.roadmap_path, "roadmap.txt");
        assert!(config.persistence.regenerate_on_error);
    }

    #[test]
    fn test_partial_sections() {
        let yaml = "
search:
  policy: diffusion
  diffusion_factor: 0.1
risk:
  policy: closest_risk
  threshold: binary
persistence:
  roadmap_path: maps/level1.roadmap
";
        let config = AnveshanConfig::from_yaml(yaml).unwrap();
        let search = config.to_search_config();
        assert_eq!(search.policy, UpdatePolicy::Diffusion);
        assert_eq!(search.diffusion_factor, 0.1);
        // Untouched fields keep defaults
        assert_eq!(search.expansion_speed, 1.0);
        assert_eq!(config.risk.policy, RiskPolicy::ClosestRisk);
        assert_eq!(config.risk.threshold, ThresholdStrategy::Binary);
        assert_eq!(config.risk.max_attempts, 10);
        assert_eq!(
            config.persistence.roadmap_path(),
            std::path::PathBuf::from("maps/level1.roadmap")
        );
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = AnveshanConfig::default();
        let yaml = config.to_yaml().unwrap();
        let parsed = AnveshanConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed.projection.max_dequeues, config.projection.max_dequeues);
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            AnveshanConfig::from_yaml("search: [1, 2"),
            Err(ConfigLoadError::Parse(_))
        ));
        assert!(matches!(
            AnveshanConfig::load(Path::new("/nonexistent/anveshan.yaml")),
            Err(ConfigLoadError::Io(_))
        ));
    }
}
