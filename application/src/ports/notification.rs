//! Port for operator alerts.
//!
//! Alerts are fire-and-forget: a slow or failing sink must never hold up
//! failure handling, so [`NotificationSink::notify`] is synchronous and
//! infallible.

use chrono::{DateTime, Utc};
use pact_domain::{
    AdaptationAction, AdaptationStrategy, AgentId, HierarchyIssue, IntentId, MissionId,
};
use serde::Serialize;

/// How urgently an operator should look at an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &str {
        match self {
            AlertSeverity::Info => "info",
            AlertSeverity::Warning => "warning",
            AlertSeverity::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Alert {
    CommunicationFailure {
        agent_id: AgentId,
        mission_id: MissionId,
        detected_at: DateTime<Utc>,
    },
    ReassignmentComplete {
        mission_id: MissionId,
        failed_agent_id: AgentId,
        replacement_agents: Vec<AgentId>,
        confidence_score: f64,
    },
    ReassignmentEscalation {
        mission_id: MissionId,
        failed_agent_id: AgentId,
        reason: String,
    },
    ReassignmentFailed {
        mission_id: MissionId,
        failed_agent_id: AgentId,
        error: String,
    },
    AdaptationStarted {
        trigger_event: String,
        strategy: AdaptationStrategy,
        mission_id: Option<MissionId>,
    },
    AdaptationStep {
        trigger_event: String,
        step: u8,
        action: AdaptationAction,
        description: String,
    },
    AdaptationComplete {
        trigger_event: String,
        affected_intents: usize,
    },
    DeadlineViolation {
        intent_id: IntentId,
        intent_name: String,
        deadline: DateTime<Utc>,
    },
    HierarchyInconsistent { issues: Vec<String> },
}

impl Alert {
    pub fn as_str(&self) -> &str {
        match self {
            Alert::CommunicationFailure { .. } => "COMMUNICATION_FAILURE",
            Alert::ReassignmentComplete { .. } => "REASSIGNMENT_COMPLETE",
            Alert::ReassignmentEscalation { .. } => "REASSIGNMENT_ESCALATION",
            Alert::ReassignmentFailed { .. } => "REASSIGNMENT_FAILED",
            Alert::AdaptationStarted { .. } => "ADAPTATION_STARTED",
            Alert::AdaptationStep { .. } => "ADAPTATION_STEP",
            Alert::AdaptationComplete { .. } => "ADAPTATION_COMPLETE",
            Alert::DeadlineViolation { .. } => "DEADLINE_VIOLATION",
            Alert::HierarchyInconsistent { .. } => "HIERARCHY_INCONSISTENT",
        }
    }

    pub fn severity(&self) -> AlertSeverity {
        match self {
            Alert::ReassignmentEscalation { .. } | Alert::ReassignmentFailed { .. } => {
                AlertSeverity::Critical
            }
            Alert::CommunicationFailure { .. }
            | Alert::DeadlineViolation { .. }
            | Alert::HierarchyInconsistent { .. } => AlertSeverity::Warning,
            Alert::ReassignmentComplete { .. }
            | Alert::AdaptationStarted { .. }
            | Alert::AdaptationStep { .. }
            | Alert::AdaptationComplete { .. } => AlertSeverity::Info,
        }
    }

    /// One-line human summary.
    pub fn summary(&self) -> String {
        match self {
            Alert::CommunicationFailure {
                agent_id,
                mission_id,
                ..
            } => format!("Lost contact with {agent_id} on mission {mission_id}"),
            Alert::ReassignmentComplete {
                mission_id,
                failed_agent_id,
                replacement_agents,
                confidence_score,
            } => format!(
                "Mission {mission_id}: replaced {failed_agent_id} with {} (confidence {confidence_score:.2})",
                join_ids(replacement_agents)
            ),
            Alert::ReassignmentEscalation {
                mission_id,
                failed_agent_id,
                reason,
            } => format!("Mission {mission_id}: cannot replace {failed_agent_id}: {reason}"),
            Alert::ReassignmentFailed {
                mission_id,
                failed_agent_id,
                error,
            } => format!("Mission {mission_id}: reassignment for {failed_agent_id} failed: {error}"),
            Alert::AdaptationStarted {
                trigger_event,
                strategy,
                ..
            } => format!("Adapting intents ({strategy}) after {trigger_event}"),
            Alert::AdaptationStep {
                step,
                action,
                description,
                ..
            } => format!("Step {step} {action}: {description}"),
            Alert::AdaptationComplete {
                trigger_event,
                affected_intents,
            } => format!("Adaptation for {trigger_event} complete ({affected_intents} intents)"),
            Alert::DeadlineViolation {
                intent_id,
                intent_name,
                ..
            } => format!("Intent {intent_id} ({intent_name}) exceeded its deadline"),
            Alert::HierarchyInconsistent { issues } => {
                format!("Intent hierarchy has {} consistency issue(s)", issues.len())
            }
        }
    }

    pub fn hierarchy_inconsistent(issues: &[HierarchyIssue]) -> Self {
        Alert::HierarchyInconsistent {
            issues: issues.iter().map(ToString::to_string).collect(),
        }
    }
}

fn join_ids(ids: &[AgentId]) -> String {
    ids.iter()
        .map(AgentId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Port for delivering alerts to operators.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, alert: Alert);
}

/// No-op implementation for tests and when alerting is disabled.
pub struct NoNotification;

impl NotificationSink for NoNotification {
    fn notify(&self, _alert: Alert) {}
}

/// Sink that keeps every alert, for use-case tests.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingNotification {
    alerts: std::sync::Mutex<Vec<Alert>>,
}

#[cfg(test)]
impl RecordingNotification {
    pub(crate) fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().unwrap().clone()
    }

    pub(crate) fn kinds(&self) -> Vec<String> {
        self.alerts().iter().map(|a| a.as_str().to_string()).collect()
    }
}

#[cfg(test)]
impl NotificationSink for RecordingNotification {
    fn notify(&self, alert: Alert) {
        self.alerts.lock().unwrap().push(alert);
    }
}
