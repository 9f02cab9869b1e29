//! Search segment model.
//!
//! Every edge of the divided road graph carries a [`SearchSegment`] holding
//! the belief that the hidden agent is on that edge. [`SearchModel::tick`]
//! spreads that belief over time with one of two interchangeable rules and
//! clears whatever the searching agents can currently see.
//!
//! | Rule | Behaviour |
//! |------|-----------|
//! | [`Propagation`] | Expanded segments seed neighbours at `p * (L - 1.5E) / L`; unseeded neighbours of nonzero segments grow slowly |
//! | [`Diffusion`] | `p' = (1 - f) p + f * mean(neighbours)`, renormalised to a maximum of 1 |
//!
//! [`SearchSegment`]: crate::graph::SearchSegment

mod config;
mod model;
mod policy;
mod scoring;

pub use config::{ScoringWeights, SearchConfig, UpdatePolicy};
pub use model::{SearchModel, max_probability};
pub use policy::{Diffusion, ProbabilityUpdate, Propagation, TickContext, propagation_decay};
pub use scoring::{SegmentScore, best_segment};
