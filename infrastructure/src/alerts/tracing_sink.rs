//! Alerts as structured log lines.

use pact_application::ports::notification::{Alert, AlertSeverity, NotificationSink};
use tracing::{error, info, warn};

/// Writes each alert to the `tracing` subscriber at a level matching its
/// severity.
pub struct TracingAlertSink;

impl NotificationSink for TracingAlertSink {
    fn notify(&self, alert: Alert) {
        let kind = alert.as_str();
        let summary = alert.summary();
        match alert.severity() {
            AlertSeverity::Critical => error!(alert = kind, "{}", summary),
            AlertSeverity::Warning => warn!(alert = kind, "{}", summary),
            AlertSeverity::Info => info!(alert = kind, "{}", summary),
        }
    }
}

/// Delivers every alert to each inner sink in order.
pub struct FanoutAlertSink {
    sinks: Vec<std::sync::Arc<dyn NotificationSink>>,
}

impl FanoutAlertSink {
    pub fn new(sinks: Vec<std::sync::Arc<dyn NotificationSink>>) -> Self {
        Self { sinks }
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl NotificationSink for FanoutAlertSink {
    fn notify(&self, alert: Alert) {
        for sink in &self.sinks {
            sink.notify(alert.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::BroadcastAlertSink;
    use pact_domain::{AgentId, MissionId};
    use std::sync::Arc;

    #[test]
    fn test_fanout_reaches_every_sink() {
        let bus = BroadcastAlertSink::new(4);
        let mut receiver = bus.subscribe();
        let fanout = FanoutAlertSink::new(vec![Arc::new(TracingAlertSink), Arc::new(bus)]);
        assert_eq!(fanout.len(), 2);

        fanout.notify(Alert::ReassignmentEscalation {
            mission_id: MissionId::new("M1"),
            failed_agent_id: AgentId::new("D1"),
            reason: "no replacement candidates".to_string(),
        });

        assert_eq!(
            receiver.try_recv().unwrap().as_str(),
            "REASSIGNMENT_ESCALATION"
        );
    }
}
