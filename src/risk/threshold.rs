//! Acceptable-risk threshold strategies.

use super::config::{RiskConfig, ThresholdStrategy};

/// Intruder state the threshold may depend on.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ThresholdContext {
    /// Risk at the intruder's current position.
    pub current_risk: f32,
    /// Goal attempts made so far.
    pub attempts: u32,
}

impl ThresholdStrategy {
    /// Threshold above which a path's peak risk makes it unsafe.
    pub fn threshold(self, config: &RiskConfig, context: &ThresholdContext) -> f32 {
        match self {
            Self::Fixed => config.fixed_threshold,
            Self::CurrentRisk => context.current_risk,
            Self::AttemptsNormalized => {
                if config.max_attempts == 0 {
                    1.0
                } else {
                    (context.attempts as f32 / config.max_attempts as f32).min(1.0)
                }
            }
            Self::Binary => {
                if context.attempts >= config.binary_switch_after {
                    config.binary_high
                } else {
                    config.binary_low
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn context(current_risk: f32, attempts: u32) -> ThresholdContext {
        ThresholdContext {
            current_risk,
            attempts,
        }
    }

    #[test]
    fn test_fixed_and_current() {
        let config = RiskConfig::default().with_fixed_threshold(0.4);
        assert_eq!(ThresholdStrategy::Fixed.threshold(&config, &context(0.9, 5)), 0.4);
        assert_eq!(ThresholdStrategy::CurrentRisk.threshold(&config, &context(0.9, 5)), 0.9);
    }

    #[test]
    fn test_attempts_normalized() {
        let config = RiskConfig::default();
        let strategy = ThresholdStrategy::AttemptsNormalized;
        assert_relative_eq!(strategy.threshold(&config, &context(0.0, 0)), 0.0);
        assert_relative_eq!(strategy.threshold(&config, &context(0.0, 5)), 0.5);
        assert_relative_eq!(strategy.threshold(&config, &context(0.0, 50)), 1.0);
    }

    #[test]
    fn test_binary_switch() {
        let config = RiskConfig::default();
        let strategy = ThresholdStrategy::Binary;
        assert_eq!(strategy.threshold(&config, &context(0.0, 2)), 0.2);
        assert_eq!(strategy.threshold(&config, &context(0.0, 3)), 0.8);
    }
}
