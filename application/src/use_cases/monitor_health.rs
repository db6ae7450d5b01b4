//! Intent Health Monitor.
//!
//! Periodically fails active intents that have outlived their deadline and
//! checks the hierarchy's structure, alerting on both.

use crate::context::MissionControl;
use crate::ports::notification::Alert;
use chrono::{DateTime, Utc};
use pact_domain::{HierarchyHealth, HierarchyIssue, IntentId};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Result of one health sweep.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub overdue: Vec<IntentId>,
    pub issues: Vec<HierarchyIssue>,
    pub health: HierarchyHealth,
}

impl HealthReport {
    pub fn is_clean(&self) -> bool {
        self.overdue.is_empty() && self.issues.is_empty()
    }
}

#[derive(Clone)]
pub struct IntentHealthMonitor {
    control: Arc<MissionControl>,
}

impl IntentHealthMonitor {
    pub fn new(control: Arc<MissionControl>) -> Self {
        Self { control }
    }

    pub async fn sweep(&self, now: DateTime<Utc>) -> HealthReport {
        let (overdue, issues, health, violations) = {
            let mut hierarchy = self.control.hierarchy().lock().await;
            let overdue = hierarchy.fail_overdue(now);
            let violations: Vec<Alert> = overdue
                .iter()
                .filter_map(|id| hierarchy.get(id))
                .filter_map(|node| {
                    node.deadline.map(|deadline| Alert::DeadlineViolation {
                        intent_id: node.id.clone(),
                        intent_name: node.name.clone(),
                        deadline,
                    })
                })
                .collect();
            (
                overdue,
                hierarchy.validate_consistency(),
                hierarchy.health(),
                violations,
            )
        };

        for alert in violations {
            warn!("{}", alert.summary());
            self.control.notify(alert);
        }
        if !issues.is_empty() {
            warn!("Intent hierarchy has {} consistency issue(s)", issues.len());
            self.control.notify(Alert::hierarchy_inconsistent(&issues));
        }

        HealthReport {
            overdue,
            issues,
            health,
        }
    }

    /// Sweep until `cancel` fires. A panicked sweep backs off, then resumes.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
        let params = self.control.params().clone();
        if !params.health_enabled {
            info!("Intent health monitor disabled");
            return;
        }
        info!(
            "Intent health monitor started (every {:?})",
            params.health_interval
        );

        loop {
            let monitor = self.clone();
            let pause = match tokio::spawn(async move { monitor.sweep(Utc::now()).await }).await {
                Ok(_) => params.health_interval,
                Err(e) => {
                    error!("Intent health sweep aborted: {}", e);
                    params.health_backoff
                }
            };

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(pause) => {}
            }
        }

        info!("Intent health monitor stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControlParams;
    use crate::ports::notification::RecordingNotification;
    use pact_domain::{IntentNode, IntentStatus, IntentType};
    use std::time::Duration;

    async fn setup(params: ControlParams) -> (Arc<MissionControl>, Arc<RecordingNotification>) {
        let alerts = Arc::new(RecordingNotification::default());
        let control = Arc::new(MissionControl::new(params).with_alerts(alerts.clone()));
        (control, alerts)
    }

    #[tokio::test]
    async fn test_overdue_intent_fails_with_alert() {
        let (control, alerts) = setup(ControlParams::default()).await;
        let now = Utc::now();
        control
            .add_intent_node(IntentNode::new("S1", "Secure region", IntentType::Strategic))
            .await
            .unwrap();
        control
            .add_intent_node(
                IntentNode::new("T1", "Recon", IntentType::Tactical)
                    .with_parent("S1")
                    .with_deadline(now - chrono::Duration::minutes(5)),
            )
            .await
            .unwrap();
        control
            .add_intent_node(
                IntentNode::new("T2", "Relay", IntentType::Tactical)
                    .with_parent("S1")
                    .with_deadline(now + chrono::Duration::minutes(5)),
            )
            .await
            .unwrap();

        let monitor = IntentHealthMonitor::new(control.clone());
        let report = monitor.sweep(now).await;

        assert_eq!(report.overdue, vec![IntentId::new("T1")]);
        assert!(report.issues.is_empty());
        assert_eq!(report.health.count(IntentStatus::Failed), 1);
        assert_eq!(
            control.intent(&IntentId::new("T1")).await.unwrap().status,
            IntentStatus::Failed
        );
        assert_eq!(alerts.kinds(), vec!["DEADLINE_VIOLATION"]);

        assert!(monitor.sweep(now).await.overdue.is_empty());
    }

    #[tokio::test]
    async fn test_clean_hierarchy_reports_nothing() {
        let (control, alerts) = setup(ControlParams::default()).await;
        control
            .add_intent_node(IntentNode::new("S1", "Secure region", IntentType::Strategic))
            .await
            .unwrap();

        let report = IntentHealthMonitor::new(control).sweep(Utc::now()).await;
        assert!(report.is_clean());
        assert_eq!(report.health.total_intents, 1);
        assert!(alerts.alerts().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_monitor_returns_immediately() {
        let (control, _) = setup(ControlParams::default().with_health_enabled(false)).await;
        let monitor = Arc::new(IntentHealthMonitor::new(control.clone()));
        tokio::time::timeout(Duration::from_secs(1), monitor.run(control.shutdown_token()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_run_stops_on_cancel() {
        let params = ControlParams::default().with_health_interval(Duration::from_millis(10));
        let (control, _) = setup(params).await;
        let monitor = Arc::new(IntentHealthMonitor::new(control.clone()));

        let handle = tokio::spawn(monitor.run(control.shutdown_token()));
        tokio::time::sleep(Duration::from_millis(50)).await;
        control.shutdown();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
