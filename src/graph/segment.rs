//! Probability-carrying search segment owned by every road edge.
//!
//! A segment has two arms. Arm A travels towards the edge's first endpoint,
//! arm B towards the second. Seeding collapses both arms onto one point of
//! the edge; each tick they expand outward until both reach their endpoints,
//! at which point the segment is "expanded" and may seed its neighbours.
//!
//! ```text
//!  A ●─────────◄━━━━━━━━━━━━━━►─────────● B
//!              arm_a   seed   arm_b
//! ```

use serde::{Deserialize, Serialize};

use crate::core::WorldPoint;
use crate::core::geometry::project_onto_segment;

/// Distance under which an arm counts as arrived.
const ARRIVAL_EPSILON: f32 = 1e-4;

/// Belief that the hidden agent occupies one edge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchSegment {
    start: WorldPoint,
    end: WorldPoint,
    arm_a: WorldPoint,
    arm_b: WorldPoint,
    probability: f32,
    timestamp: f32,
    is_propagated: bool,
    is_observed: bool,
    speed_factor: f32,
}

impl SearchSegment {
    /// Create a fully expanded, zero-probability segment over `start`-`end`.
    pub fn new(start: WorldPoint, end: WorldPoint, now: f32) -> Self {
        Self {
            start,
            end,
            arm_a: start,
            arm_b: end,
            probability: 0.0,
            timestamp: now,
            is_propagated: false,
            is_observed: false,
            speed_factor: 1.0,
        }
    }

    /// Probability in [0, 1].
    #[inline]
    pub fn probability(&self) -> f32 {
        self.probability
    }

    /// Set the probability, clamped to [0, 1] (NaN becomes 0).
    #[inline]
    pub fn set_probability(&mut self, probability: f32) {
        self.probability = if probability.is_nan() {
            0.0
        } else {
            probability.clamp(0.0, 1.0)
        };
    }

    /// Time of the last observation change.
    #[inline]
    pub fn timestamp(&self) -> f32 {
        self.timestamp
    }

    /// Time since the segment was last seen or released from view.
    #[inline]
    pub fn age(&self, now: f32) -> f32 {
        (now - self.timestamp).max(0.0)
    }

    /// Whether this segment has been seeded (by a neighbour or explicitly).
    #[inline]
    pub fn is_propagated(&self) -> bool {
        self.is_propagated
    }

    /// Whether a searching agent currently sees this segment.
    #[inline]
    pub fn is_observed(&self) -> bool {
        self.is_observed
    }

    /// Current arm positions (towards start, towards end).
    #[inline]
    pub fn arms(&self) -> (WorldPoint, WorldPoint) {
        (self.arm_a, self.arm_b)
    }

    /// Endpoints the arms travel to.
    #[inline]
    pub fn endpoints(&self) -> (WorldPoint, WorldPoint) {
        (self.start, self.end)
    }

    /// Current expansion speed multiplier.
    #[inline]
    pub fn speed_factor(&self) -> f32 {
        self.speed_factor
    }

    /// Length of the underlying edge.
    #[inline]
    pub fn length(&self) -> f32 {
        self.start.distance(&self.end)
    }

    /// Midpoint between the two arms.
    #[inline]
    pub fn center(&self) -> WorldPoint {
        self.arm_a.lerp(&self.arm_b, 0.5)
    }

    /// Check if arm A reached the start endpoint.
    #[inline]
    pub fn arm_a_arrived(&self) -> bool {
        self.arm_a.approx_eq(&self.start, ARRIVAL_EPSILON)
    }

    /// Check if arm B reached the end endpoint.
    #[inline]
    pub fn arm_b_arrived(&self) -> bool {
        self.arm_b.approx_eq(&self.end, ARRIVAL_EPSILON)
    }

    /// Both arms sit on their endpoints.
    #[inline]
    pub fn is_expanded(&self) -> bool {
        self.arm_a_arrived() && self.arm_b_arrived()
    }

    /// Collapse both arms onto the projection of `point` and mark seeded.
    pub fn seed(&mut self, point: WorldPoint, probability: f32) {
        let on_edge = project_onto_segment(point, self.start, self.end).point;
        self.arm_a = on_edge;
        self.arm_b = on_edge;
        self.speed_factor = 1.0;
        self.is_propagated = true;
        self.set_probability(probability);
    }

    /// Mark the segment seeded without moving its arms.
    pub fn mark_propagated(&mut self) {
        self.is_propagated = true;
    }

    /// Advance both arms by `step`.
    ///
    /// While exactly one arm has arrived, the speed factor decays by
    /// `slowdown` every call, never below `min_factor`.
    pub fn expand(&mut self, step: f32, slowdown: f32, min_factor: f32) {
        if step <= 0.0 || self.is_expanded() {
            return;
        }

        let distance = step * self.speed_factor;
        self.arm_a = self.arm_a.move_towards(&self.start, distance);
        self.arm_b = self.arm_b.move_towards(&self.end, distance);

        if self.arm_a_arrived() != self.arm_b_arrived() {
            self.speed_factor = (self.speed_factor * slowdown).max(min_factor);
        }
    }

    /// Clear the segment because an agent sees it.
    pub fn observe(&mut self, now: f32) {
        self.probability = 0.0;
        self.is_observed = true;
        self.is_propagated = false;
        self.timestamp = now;
    }

    /// Leave observation; the age restarts at `now`.
    pub fn release(&mut self, now: f32) {
        if self.is_observed {
            self.is_observed = false;
            self.timestamp = now;
        }
    }

    /// Zero probability and forget seeding without touching observation state.
    pub fn reset(&mut self) {
        self.probability = 0.0;
        self.is_propagated = false;
        self.speed_factor = 1.0;
        self.arm_a = self.start;
        self.arm_b = self.end;
    }

    /// Points along the whole edge spaced at most `step` apart, endpoints included.
    pub fn sample_points(&self, step: f32) -> Vec<WorldPoint> {
        let length = self.length();
        let count = if step > 0.0 {
            ((length / step).ceil() as usize).max(1)
        } else {
            1
        };
        (0..=count)
            .map(|i| self.start.lerp(&self.end, i as f32 / count as f32))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment() -> SearchSegment {
        SearchSegment::new(WorldPoint::new(0.0, 0.0), WorldPoint::new(4.0, 0.0), 0.0)
    }

    #[test]
    fn test_new_segment_is_expanded_and_empty() {
        let s = segment();
        assert!(s.is_expanded());
        assert_eq!(s.probability(), 0.0);
        assert!(!s.is_propagated());
    }

    #[test]
    fn test_probability_clamped() {
        let mut s = segment();
        s.set_probability(1.7);
        assert_eq!(s.probability(), 1.0);
        s.set_probability(-0.3);
        assert_eq!(s.probability(), 0.0);
        s.set_probability(f32::NAN);
        assert_eq!(s.probability(), 0.0);
    }

    #[test]
    fn test_seed_projects_onto_edge() {
        let mut s = segment();
        s.seed(WorldPoint::new(1.0, 3.0), 0.9);
        let (a, b) = s.arms();
        assert_eq!(a, WorldPoint::new(1.0, 0.0));
        assert_eq!(a, b);
        assert!(s.is_propagated());
        assert!(!s.is_expanded());
    }

    #[test]
    fn test_expand_never_overshoots() {
        let mut s = segment();
        s.seed(WorldPoint::new(1.0, 0.0), 1.0);
        for _ in 0..100 {
            s.expand(0.7, 0.5, 0.25);
            let (a, b) = s.arms();
            assert!(a.x >= 0.0 && a.x <= 4.0);
            assert!(b.x >= 0.0 && b.x <= 4.0);
        }
        assert!(s.is_expanded());
    }

    #[test]
    fn test_speed_decays_after_first_arrival() {
        let mut s = segment();
        s.seed(WorldPoint::new(0.5, 0.0), 1.0);
        s.expand(1.0, 0.5, 0.25);
        assert!(s.arm_a_arrived());
        assert!(!s.arm_b_arrived());
        assert_eq!(s.speed_factor(), 0.5);
        s.expand(1.0, 0.5, 0.25);
        s.expand(1.0, 0.5, 0.25);
        assert_eq!(s.speed_factor(), 0.25);
    }

    #[test]
    fn test_observe_and_release() {
        let mut s = segment();
        s.seed(WorldPoint::new(2.0, 0.0), 0.8);
        s.observe(3.0);
        assert_eq!(s.probability(), 0.0);
        assert!(s.is_observed());
        assert!(!s.is_propagated());
        s.release(4.0);
        assert!(!s.is_observed());
        assert_eq!(s.timestamp(), 4.0);
        s.release(5.0);
        assert_eq!(s.timestamp(), 4.0);
    }

    #[test]
    fn test_sample_points_cover_edge() {
        let s = segment();
        let pts = s.sample_points(1.5);
        assert_eq!(pts.first().copied(), Some(WorldPoint::new(0.0, 0.0)));
        assert_eq!(pts.last().copied(), Some(WorldPoint::new(4.0, 0.0)));
        assert_eq!(pts.len(), 4);
    }
}
