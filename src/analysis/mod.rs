//! Diagnostic graph measures (not used by the live search loop).

mod properties;

pub use properties::{DEFAULT_MAX_CYCLES, GraphProperties};
