//! JSON output formatter

use super::formatter::OutputFormatter;
use pact_application::{
    AdaptationOutcome, Alert, FailureResponse, HealthReport, PerformanceMetrics,
};
use pact_domain::CoordinationOutcome;
use serde::Serialize;

/// Formats results as pretty-printed JSON; alerts as one compact line each.
pub struct JsonFormatter;

impl JsonFormatter {
    fn pretty<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_coordination(&self, outcome: &CoordinationOutcome) -> String {
        Self::pretty(outcome)
    }

    fn format_failures(&self, responses: &[FailureResponse]) -> String {
        Self::pretty(responses)
    }

    fn format_adaptation(&self, outcome: &AdaptationOutcome) -> String {
        Self::pretty(outcome)
    }

    fn format_health(&self, report: &HealthReport) -> String {
        Self::pretty(report)
    }

    fn format_metrics(&self, metrics: &PerformanceMetrics) -> String {
        Self::pretty(metrics)
    }

    fn format_alert(&self, alert: &Alert) -> String {
        serde_json::to_string(alert).unwrap_or_else(|_| "{}".to_string())
    }
}
