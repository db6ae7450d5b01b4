//! Coordination outcomes, phases and metrics

pub mod metrics;
pub mod outcome;
pub mod result;
