//! Risk evaluation for intruder paths.
//!
//! Reads the occupancy risk the trajectory projector annotated on the road
//! graph and decides whether a planned path is still acceptable. Periodic
//! re-checks are driven by a plain tick counter ([`RecheckSchedule`]).

mod config;
mod evaluator;
mod schedule;
mod threshold;

pub use config::{RiskConfig, RiskPolicy, ThresholdStrategy};
pub use evaluator::{RiskAssessment, RiskEvaluator, RiskyPosition, UnsafeReason};
pub use schedule::RecheckSchedule;
pub use threshold::ThresholdContext;
