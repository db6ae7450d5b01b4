//! Coordination telemetry as structured log events.

use pact_application::ports::telemetry::{CoordinationSample, TelemetrySink};
use tracing::info;

/// Emits one `tracing` event per coordination outcome under the
/// `pact::telemetry` target, so it can be filtered or routed separately.
pub struct TracingTelemetrySink;

impl TelemetrySink for TracingTelemetrySink {
    fn record_coordination(&self, sample: &CoordinationSample) {
        info!(
            target: "pact::telemetry",
            coordination_id = %sample.coordination_id,
            result = sample.result.as_str(),
            processing_time_ms = sample.processing_time_ms,
            energy_score = sample.energy_score.unwrap_or(f64::NAN),
            total = sample.metrics.total_coordinations,
            success_rate = sample.metrics.success_rate(),
            "coordination recorded"
        );
    }
}
