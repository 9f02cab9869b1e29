//! Best-search-segment selection.

use serde::{Deserialize, Serialize};

use super::config::ScoringWeights;
use crate::core::{AgentId, WorldPoint};
use crate::graph::{EdgeKey, GraphLayer};

/// A scored search target.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentScore {
    /// Segment edge in the divided layer.
    pub edge: EdgeKey,
    /// Point to head for (between the segment's arms).
    pub target: WorldPoint,
    /// Combined score; higher is better.
    pub score: f32,
}

/// Pick the segment `agent` standing at `from` should search next.
///
/// The score is `w_p * p + w_age * age / max_age + w_d * (1 - d / max_d)`,
/// minus the claim penalty for segments another guard plans to traverse.
/// Observed and corner segments are never chosen.
pub fn best_segment(
    layer: &GraphLayer,
    from: WorldPoint,
    agent: AgentId,
    now: f32,
    weights: &ScoringWeights,
) -> Option<SegmentScore> {
    let candidates: Vec<_> = layer
        .edges()
        .filter(|e| e.searchable && !e.segment.is_observed())
        .map(|e| {
            let target = e.segment.center();
            (e, target, e.segment.age(now), from.distance(&target))
        })
        .collect();

    let max_age = candidates.iter().map(|c| c.2).fold(0.0, f32::max);
    let max_distance = candidates.iter().map(|c| c.3).fold(0.0, f32::max);

    candidates
        .into_iter()
        .map(|(edge, target, age, distance)| {
            let age_term = if max_age > 0.0 { age / max_age } else { 0.0 };
            let distance_term = if max_distance > 0.0 {
                1.0 - distance / max_distance
            } else {
                1.0
            };
            let mut score = weights.probability * edge.segment.probability()
                + weights.age * age_term
                + weights.distance * distance_term;
            if edge.claimed_by_other(agent) {
                score -= weights.claim_penalty;
            }
            SegmentScore {
                edge: edge.key,
                target,
                score,
            }
        })
        .max_by(|a, b| a.score.total_cmp(&b.score))
}
