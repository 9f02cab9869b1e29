//! Goal selection configuration.

use serde::{Deserialize, Serialize};

/// Secondary ordering applied after ascending risk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionCriterion {
    /// Highest goal-directedness first.
    #[default]
    GoalUtility,
    /// Highest weighted combination of all utilities first.
    Weighted,
    /// Lowest cost first.
    CostOnly,
    /// Highest occlusion first.
    OcclusionOnly,
    /// Farthest from guards first.
    GuardDistanceOnly,
    /// One of the above, drawn uniformly per selection.
    Random,
}

impl SelectionCriterion {
    /// Criteria `Random` draws from.
    pub const DETERMINISTIC: [SelectionCriterion; 5] = [
        Self::GoalUtility,
        Self::Weighted,
        Self::CostOnly,
        Self::OcclusionOnly,
        Self::GuardDistanceOnly,
    ];
}

/// Weights of the `Weighted` criterion. Cost is subtracted.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct UtilityWeights {
    /// Default: 1.0
    pub goal: f32,
    /// Default: 0.5
    pub cover: f32,
    /// Default: 0.5
    pub cost: f32,
    /// Default: 0.5
    pub guard_proximity: f32,
    /// Default: 0.5
    pub occlusion: f32,
}

impl Default for UtilityWeights {
    fn default() -> Self {
        Self {
            goal: 1.0,
            cover: 0.5,
            cost: 0.5,
            guard_proximity: 0.5,
            occlusion: 0.5,
        }
    }
}

/// Decision maker configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Secondary sort criterion.
    /// Default: GoalUtility
    pub criterion: SelectionCriterion,

    /// Weights for the weighted criterion.
    pub weights: UtilityWeights,

    /// Seconds a goal is skipped after a failed path request.
    /// Default: 0.0 (retry immediately)
    pub retry_backoff: f32,
}

impl DecisionConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter for the secondary criterion.
    pub fn with_criterion(mut self, criterion: SelectionCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Builder-style setter for the utility weights.
    pub fn with_weights(mut self, weights: UtilityWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Builder-style setter for the failure back-off.
    pub fn with_retry_backoff(mut self, seconds: f32) -> Self {
        self.retry_backoff = seconds;
        self
    }
}
