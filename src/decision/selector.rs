//! Risk-first goal selection.

use std::cmp::Ordering;

use log::{debug, trace};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::config::{DecisionConfig, SelectionCriterion, UtilityWeights};
use crate::core::WorldPoint;

/// Task utilities of a goal; all but `cost` are better when higher.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalUtilities {
    /// Progress towards the intruder's objective.
    pub goal: f32,
    /// Cover available at the goal.
    pub cover: f32,
    /// Travel cost to reach the goal.
    pub cost: f32,
    /// Distance from the nearest guard.
    pub guard_proximity: f32,
    /// How hidden the goal is from guards' views.
    pub occlusion: f32,
}

impl GoalUtilities {
    fn weighted(&self, weights: &UtilityWeights) -> f32 {
        weights.goal * self.goal + weights.cover * self.cover - weights.cost * self.cost
            + weights.guard_proximity * self.guard_proximity
            + weights.occlusion * self.occlusion
    }
}

/// A candidate goal position.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GoalCandidate {
    pub position: WorldPoint,
    /// Occupancy risk at the goal.
    pub risk: f32,
    pub utilities: GoalUtilities,
    pub visited: bool,
    /// Clock time of the last failed path request to this goal.
    pub last_failed_at: Option<f32>,
}

impl GoalCandidate {
    pub fn new(position: WorldPoint, risk: f32, utilities: GoalUtilities) -> Self {
        Self {
            position,
            risk,
            utilities,
            visited: false,
            last_failed_at: None,
        }
    }
}

/// Picks the intruder's next goal from a candidate set.
#[derive(Clone, Debug, Default)]
pub struct DecisionMaker {
    config: DecisionConfig,
}

impl DecisionMaker {
    pub fn new(config: DecisionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecisionConfig {
        &self.config
    }

    /// Select with the thread-local generator.
    pub fn select(&self, candidates: &mut [GoalCandidate], now: f32) -> Option<GoalCandidate> {
        self.select_with(candidates, now, &mut rand::rng())
    }

    /// Sort `candidates` by ascending risk, then the configured criterion,
    /// and return the first unvisited one not backing off from a failure.
    pub fn select_with<R: Rng + ?Sized>(
        &self,
        candidates: &mut [GoalCandidate],
        now: f32,
        rng: &mut R,
    ) -> Option<GoalCandidate> {
        let criterion = match self.config.criterion {
            SelectionCriterion::Random => {
                let options = SelectionCriterion::DETERMINISTIC;
                options[rng.random_range(0..options.len())]
            }
            fixed => fixed,
        };
        trace!("[Decision] Sorting {} candidates by {:?}", candidates.len(), criterion);

        let weights = &self.config.weights;
        candidates.sort_by(|a, b| {
            a.risk
                .total_cmp(&b.risk)
                .then_with(|| compare(criterion, weights, a, b))
        });

        let chosen = candidates
            .iter()
            .find(|c| !c.visited && !self.backing_off(c, now))
            .copied();
        if chosen.is_none() {
            debug!("[Decision] All {} candidates exhausted", candidates.len());
        }
        chosen
    }

    fn backing_off(&self, candidate: &GoalCandidate, now: f32) -> bool {
        candidate
            .last_failed_at
            .is_some_and(|t| now - t < self.config.retry_backoff)
    }

    /// Mark the candidate at `position` as visited.
    pub fn mark_visited(candidates: &mut [GoalCandidate], position: WorldPoint) -> bool {
        match find(candidates, position) {
            Some(c) => {
                c.visited = true;
                true
            }
            None => false,
        }
    }

    /// Record a failed path request to the candidate at `position`.
    pub fn mark_failed(candidates: &mut [GoalCandidate], position: WorldPoint, now: f32) -> bool {
        match find(candidates, position) {
            Some(c) => {
                c.last_failed_at = Some(now);
                true
            }
            None => false,
        }
    }

    /// Drop an invalidated goal from the candidate set.
    pub fn invalidate(candidates: &mut Vec<GoalCandidate>, position: WorldPoint) -> bool {
        let before = candidates.len();
        candidates.retain(|c| !c.position.approx_eq(&position, GOAL_TOLERANCE));
        before != candidates.len()
    }
}

const GOAL_TOLERANCE: f32 = 1e-3;

fn find(candidates: &mut [GoalCandidate], position: WorldPoint) -> Option<&mut GoalCandidate> {
    candidates
        .iter_mut()
        .find(|c| c.position.approx_eq(&position, GOAL_TOLERANCE))
}

/// Secondary ordering; `Less` sorts first.
fn compare(
    criterion: SelectionCriterion,
    weights: &UtilityWeights,
    a: &GoalCandidate,
    b: &GoalCandidate,
) -> Ordering {
    let (ua, ub) = (&a.utilities, &b.utilities);
    match criterion {
        SelectionCriterion::GoalUtility => ub.goal.total_cmp(&ua.goal),
        SelectionCriterion::Weighted => ub.weighted(weights).total_cmp(&ua.weighted(weights)),
        SelectionCriterion::CostOnly => ua.cost.total_cmp(&ub.cost),
        SelectionCriterion::OcclusionOnly => ub.occlusion.total_cmp(&ua.occlusion),
        SelectionCriterion::GuardDistanceOnly => {
            ub.guard_proximity.total_cmp(&ua.guard_proximity)
        }
        SelectionCriterion::Random => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn candidate(x: f32, risk: f32, goal: f32, cost: f32) -> GoalCandidate {
        GoalCandidate::new(
            WorldPoint::new(x, 0.0),
            risk,
            GoalUtilities {
                goal,
                cost,
                ..Default::default()
            },
        )
    }

    fn candidates() -> Vec<GoalCandidate> {
        vec![
            candidate(1.0, 0.5, 0.9, 1.0),
            candidate(2.0, 0.0, 0.2, 5.0),
            candidate(3.0, 0.0, 0.8, 9.0),
        ]
    }

    #[test]
    fn test_risk_first_then_goal_utility() {
        let maker = DecisionMaker::default();
        let mut goals = candidates();
        let chosen = maker.select(&mut goals, 0.0).unwrap();
        assert_eq!(chosen.position.x, 3.0);
        assert_eq!(goals[2].position.x, 1.0);
    }

    #[test]
    fn test_cost_only_ascending() {
        let maker = DecisionMaker::new(DecisionConfig::default().with_criterion(SelectionCriterion::CostOnly));
        let chosen = maker.select(&mut candidates(), 0.0).unwrap();
        assert_eq!(chosen.position.x, 2.0);
    }

    #[test]
    fn test_visited_skipped_and_exhaustion() {
        let maker = DecisionMaker::default();
        let mut goals = candidates();
        for x in [1.0, 2.0, 3.0] {
            assert!(DecisionMaker::mark_visited(&mut goals, WorldPoint::new(x, 0.0)));
            let chosen = maker.select(&mut goals, 0.0);
            if x < 3.0 {
                assert!(chosen.is_some());
            } else {
                assert!(chosen.is_none());
            }
        }
    }

    #[test]
    fn test_failed_goal_backs_off() {
        let maker = DecisionMaker::new(DecisionConfig::default().with_retry_backoff(5.0));
        let mut goals = candidates();
        DecisionMaker::mark_failed(&mut goals, WorldPoint::new(3.0, 0.0), 10.0);
        assert_eq!(maker.select(&mut goals, 12.0).unwrap().position.x, 2.0);
        assert_eq!(maker.select(&mut goals, 15.0).unwrap().position.x, 3.0);
    }

    #[test]
    fn test_invalidate_removes_goal() {
        let mut goals = candidates();
        assert!(DecisionMaker::invalidate(&mut goals, WorldPoint::new(2.0, 0.0)));
        assert_eq!(goals.len(), 2);
        assert!(!DecisionMaker::invalidate(&mut goals, WorldPoint::new(2.0, 0.0)));
    }

    #[test]
    fn test_random_criterion_keeps_risk_order() {
        let maker = DecisionMaker::new(DecisionConfig::default().with_criterion(SelectionCriterion::Random));
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let chosen = maker.select_with(&mut candidates(), 0.0, &mut rng).unwrap();
            assert_eq!(chosen.risk, 0.0);
        }
    }
}
