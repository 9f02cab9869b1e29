//! Risk evaluation configuration.

use serde::{Deserialize, Serialize};

/// Which projected position represents a path's risk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskPolicy {
    /// Highest-risk visible temporary node in range.
    #[default]
    MaxRisk,
    /// Nearest visible temporary node in range (squared distance).
    ClosestRisk,
}

/// How the acceptable risk threshold is derived.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdStrategy {
    /// A constant threshold.
    #[default]
    Fixed,
    /// The risk at the intruder's current position.
    CurrentRisk,
    /// Grows with failed attempts: `attempts / max_attempts`.
    AttemptsNormalized,
    /// Low threshold until `binary_switch_after` attempts, then high.
    Binary,
}

/// Risk evaluator configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Risk point selection policy.
    /// Default: MaxRisk
    pub policy: RiskPolicy,

    /// Threshold derivation strategy.
    /// Default: Fixed
    pub threshold: ThresholdStrategy,

    /// Threshold used by the fixed strategy.
    /// Default: 0.5
    pub fixed_threshold: f32,

    /// Attempts at which the normalized threshold reaches 1.
    /// Default: 10
    pub max_attempts: u32,

    /// Binary strategy threshold before the switch.
    /// Default: 0.2
    pub binary_low: f32,

    /// Binary strategy threshold after the switch.
    /// Default: 0.8
    pub binary_high: f32,

    /// Attempts before the binary strategy switches to its high threshold.
    /// Default: 3
    pub binary_switch_after: u32,

    /// Ticks between periodic risk re-checks.
    /// Default: 10
    pub recheck_interval_ticks: u32,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            policy: RiskPolicy::MaxRisk,
            threshold: ThresholdStrategy::Fixed,
            fixed_threshold: 0.5,
            max_attempts: 10,
            binary_low: 0.2,
            binary_high: 0.8,
            binary_switch_after: 3,
            recheck_interval_ticks: 10,
        }
    }
}

impl RiskConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter for the selection policy.
    pub fn with_policy(mut self, policy: RiskPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Builder-style setter for the threshold strategy.
    pub fn with_threshold(mut self, threshold: ThresholdStrategy) -> Self {
        self.threshold = threshold;
        self
    }

    /// Builder-style setter for the fixed threshold.
    pub fn with_fixed_threshold(mut self, threshold: f32) -> Self {
        self.fixed_threshold = threshold;
        self
    }

    /// Builder-style setter for the re-check interval.
    pub fn with_recheck_interval(mut self, ticks: u32) -> Self {
        self.recheck_interval_ticks = ticks;
        self
    }
}
