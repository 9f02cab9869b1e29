//! Intruder goal selection.
//!
//! Candidates are ordered by ascending risk first; ties are broken by a
//! configurable utility criterion. Visited goals are skipped, goals whose
//! last path request failed are skipped for a back-off period, and goals a
//! risk check invalidated are removed outright.

mod config;
mod selector;

pub use config::{DecisionConfig, SelectionCriterion, UtilityWeights};
pub use selector::{DecisionMaker, GoalCandidate, GoalUtilities};
