//! Configuration for trajectory projection.

use serde::{Deserialize, Serialize};

/// How risk is assigned beyond the field of view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionMode {
    /// Risk decays linearly with walked distance.
    #[default]
    Linear,
    /// Like `Linear`, but sharp turns split and scale down the risk.
    AngleBased,
}

/// Trajectory projector configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Risk assignment mode.
    /// Default: Linear
    pub mode: ProjectionMode,

    /// Spacing of temporary nodes along walked edges.
    /// Default: 1.0
    pub step_size: f32,

    /// Seconds of travel added to the field-of-view radius.
    /// Default: 1.5
    pub look_ahead_time: f32,

    /// Hard cap on breadth-first dequeues per guard.
    /// Default: 100
    pub max_dequeues: usize,

    /// Turns whose cosine falls below this count as sharp (angle-based mode).
    /// Default: 0.9
    pub corner_cosine: f32,

    /// Share of the incoming risk kept past a sharp turn (angle-based mode).
    /// Default: 0.5
    pub corner_risk_fraction: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            mode: ProjectionMode::Linear,
            step_size: 1.0,
            look_ahead_time: 1.5,
            max_dequeues: 100,
            corner_cosine: 0.9,
            corner_risk_fraction: 0.5,
        }
    }
}

impl ProjectionConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter for the risk mode.
    pub fn with_mode(mut self, mode: ProjectionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builder-style setter for the temporary node spacing.
    pub fn with_step_size(mut self, step: f32) -> Self {
        self.step_size = step;
        self
    }

    /// Builder-style setter for the look-ahead time.
    pub fn with_look_ahead_time(mut self, seconds: f32) -> Self {
        self.look_ahead_time = seconds;
        self
    }

    /// Builder-style setter for the dequeue cap.
    pub fn with_max_dequeues(mut self, cap: usize) -> Self {
        self.max_dequeues = cap;
        self
    }
}
