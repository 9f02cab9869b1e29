//! Configuration for the search segment model.

use serde::{Deserialize, Serialize};

/// Which probability update rule drives the model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePolicy {
    /// Seed neighbours from fully expanded segments with a decay factor.
    #[default]
    Propagation,
    /// Blend each segment with the mean of its neighbours, then renormalise.
    Diffusion,
}

/// Weights of the best-search-segment score.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Weight of the segment probability.
    /// Default: 1.0
    pub probability: f32,

    /// Weight of the normalised time since last observation.
    /// Default: 0.3
    pub age: f32,

    /// Weight of closeness to the requesting guard.
    /// Default: 0.3
    pub distance: f32,

    /// Subtracted when another guard already plans to traverse the segment.
    /// Default: 0.5
    pub claim_penalty: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            probability: 1.0,
            age: 0.3,
            distance: 0.3,
            claim_penalty: 0.5,
        }
    }
}

/// Search segment model configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Probability update rule.
    /// Default: Propagation
    pub policy: UpdatePolicy,

    /// Arm expansion speed (map units per second).
    /// Default: 1.0
    pub expansion_speed: f32,

    /// Per-tick speed multiplier once the first arm has arrived.
    /// Default: 0.9
    pub arrival_slowdown: f32,

    /// Lower bound of the arm speed multiplier.
    /// Default: 0.1
    pub min_speed_factor: f32,

    /// Propagation never seeds probabilities below this.
    /// Default: 0.01
    pub propagation_epsilon: f32,

    /// Growth rate of unseeded segments next to nonzero ones (per second).
    /// Default: 0.02
    pub increment_rate: f32,

    /// Share of a segment's probability exchanged with its neighbours each tick.
    /// Default: 0.05
    pub diffusion_factor: f32,

    /// Spacing of field-of-view samples along each segment.
    /// Default: 0.25
    pub fov_sample_step: f32,

    /// Best-segment scoring weights.
    pub scoring: ScoringWeights,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            policy: UpdatePolicy::Propagation,
            expansion_speed: 1.0,
            arrival_slowdown: 0.9,
            min_speed_factor: 0.1,
            propagation_epsilon: 0.01,
            increment_rate: 0.02,
            diffusion_factor: 0.05,
            fov_sample_step: 0.25,
            scoring: ScoringWeights::default(),
        }
    }
}

impl SearchConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter for the update policy.
    pub fn with_policy(mut self, policy: UpdatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Builder-style setter for the arm expansion speed.
    pub fn with_expansion_speed(mut self, speed: f32) -> Self {
        self.expansion_speed = speed;
        self
    }

    /// Builder-style setter for the diffusion factor.
    pub fn with_diffusion_factor(mut self, factor: f32) -> Self {
        self.diffusion_factor = factor;
        self
    }

    /// Builder-style setter for the unseeded growth rate.
    pub fn with_increment_rate(mut self, rate: f32) -> Self {
        self.increment_rate = rate;
        self
    }

    /// Builder-style setter for the scoring weights.
    pub fn with_scoring(mut self, scoring: ScoringWeights) -> Self {
        self.scoring = scoring;
        self
    }
}
