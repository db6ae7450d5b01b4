//! Output formatter trait

use pact_application::{
    AdaptationOutcome, Alert, FailureResponse, HealthReport, PerformanceMetrics,
};
use pact_domain::CoordinationOutcome;

/// Renders command results for the terminal.
pub trait OutputFormatter: Send + Sync {
    fn format_coordination(&self, outcome: &CoordinationOutcome) -> String;

    fn format_failures(&self, responses: &[FailureResponse]) -> String;

    fn format_adaptation(&self, outcome: &AdaptationOutcome) -> String;

    fn format_health(&self, report: &HealthReport) -> String;

    fn format_metrics(&self, metrics: &PerformanceMetrics) -> String;

    /// One alert, as a single line (or a single JSON document)
    fn format_alert(&self, alert: &Alert) -> String;
}
