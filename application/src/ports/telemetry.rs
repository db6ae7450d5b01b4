//! Port for coordination telemetry.
//!
//! Every coordination outcome is pushed here together with a snapshot of
//! the rolling metrics taken right after the outcome was counted.

use pact_domain::{CoordinationMetrics, CoordinationResult};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinationSample {
    pub coordination_id: String,
    pub result: CoordinationResult,
    pub processing_time_ms: f64,
    pub energy_score: Option<f64>,
    pub metrics: CoordinationMetrics,
}

pub trait TelemetrySink: Send + Sync {
    fn record_coordination(&self, sample: &CoordinationSample);
}

/// No-op implementation for tests and when telemetry is disabled.
pub struct NoTelemetry;

impl TelemetrySink for NoTelemetry {
    fn record_coordination(&self, _sample: &CoordinationSample) {}
}
