//! Adapt Intents use case.
//!
//! Fails the intents staffed by lost assets, plans how the hierarchy
//! absorbs the loss, and walks the plan's step script. Plans are appended
//! to the history as soon as they are generated.

use crate::context::MissionControl;
use crate::ports::history::{HistoryEntry, HistoryError};
use crate::ports::notification::Alert;
use chrono::Utc;
use pact_domain::{
    AdaptationAction, AdaptationPlan, AgentId, DomainError, Mission, MissionId,
    communication_failure_trigger, generate_adaptation_plan,
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum AdaptationError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Could not record adaptation: {0}")]
    History(#[from] HistoryError),

    #[error("Intent hierarchy inconsistent after adaptation: {}", .0.join("; "))]
    Inconsistent(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "plan", rename_all = "snake_case")]
pub enum AdaptationOutcome {
    /// The plan cleared the auto-execution threshold and ran.
    Executed(AdaptationPlan),
    /// The plan was recorded but left for an operator.
    Deferred(AdaptationPlan),
    /// No intent is staffed by the lost assets.
    NotAffected,
}

impl AdaptationOutcome {
    pub fn as_str(&self) -> &str {
        match self {
            AdaptationOutcome::Executed(_) => "executed",
            AdaptationOutcome::Deferred(_) => "deferred",
            AdaptationOutcome::NotAffected => "not_affected",
        }
    }

    pub fn plan(&self) -> Option<&AdaptationPlan> {
        match self {
            AdaptationOutcome::Executed(plan) | AdaptationOutcome::Deferred(plan) => Some(plan),
            AdaptationOutcome::NotAffected => None,
        }
    }
}

#[derive(Clone)]
pub struct AdaptIntentsUseCase {
    control: Arc<MissionControl>,
}

impl AdaptIntentsUseCase {
    pub fn new(control: Arc<MissionControl>) -> Self {
        Self { control }
    }

    /// Fail every intent staffed by `assets` and record the resulting plan.
    pub async fn generate_plan(
        &self,
        trigger_event: &str,
        assets: &[AgentId],
    ) -> Result<AdaptationPlan, AdaptationError> {
        let now = Utc::now();
        let plan = {
            let mut hierarchy = self.control.hierarchy().lock().await;
            generate_adaptation_plan(&mut hierarchy, trigger_event, assets, now)
        };

        self.control
            .history()
            .append(HistoryEntry::adaptation(plan.clone(), now))
            .await?;

        info!(
            "Adaptation plan for {}: {} intent(s) affected, {} (p={:.2})",
            trigger_event,
            plan.affected_intent_ids.len(),
            plan.adaptation_strategy,
            plan.success_probability
        );
        Ok(plan)
    }

    /// Walk the plan's steps, announcing each one.
    ///
    /// With a mission the whole walk runs inside that mission's critical
    /// section.
    pub async fn execute_plan(
        &self,
        plan: &AdaptationPlan,
        mission: Option<&MissionId>,
    ) -> Result<(), AdaptationError> {
        let handle = self.resolve_mission(mission).await?;
        self.walk_steps(plan, mission, handle.as_ref()).await
    }

    async fn resolve_mission(
        &self,
        mission: Option<&MissionId>,
    ) -> Result<Option<Arc<Mutex<Mission>>>, DomainError> {
        match mission {
            Some(id) => Ok(Some(self.control.mission(id).await?)),
            None => Ok(None),
        }
    }

    async fn walk_steps(
        &self,
        plan: &AdaptationPlan,
        mission: Option<&MissionId>,
        handle: Option<&Arc<Mutex<Mission>>>,
    ) -> Result<(), AdaptationError> {
        let _guard = match handle {
            Some(handle) => Some(handle.lock().await),
            None => None,
        };

        self.control.notify(Alert::AdaptationStarted {
            trigger_event: plan.trigger_event.clone(),
            strategy: plan.adaptation_strategy,
            mission_id: mission.cloned(),
        });

        for step in &plan.execution_steps {
            debug!(
                "Adaptation {} step {}: {}",
                plan.trigger_event, step.step, step.action
            );
            if step.action == AdaptationAction::ValidateIntentHierarchy {
                let issues = self.control.hierarchy().lock().await.validate_consistency();
                if !issues.is_empty() {
                    warn!(
                        "Adaptation {} stopped: {} hierarchy issue(s)",
                        plan.trigger_event,
                        issues.len()
                    );
                    self.control.notify(Alert::hierarchy_inconsistent(&issues));
                    return Err(AdaptationError::Inconsistent(
                        issues.iter().map(ToString::to_string).collect(),
                    ));
                }
            }
            self.control.notify(Alert::AdaptationStep {
                trigger_event: plan.trigger_event.clone(),
                step: step.step,
                action: step.action,
                description: step.description.clone(),
            });
        }

        self.control.notify(Alert::AdaptationComplete {
            trigger_event: plan.trigger_event.clone(),
            affected_intents: plan.affected_intent_ids.len(),
        });
        info!("Adaptation {} complete", plan.trigger_event);
        Ok(())
    }

    /// Generate a plan and run it when its success probability clears the
    /// configured threshold.
    pub async fn trigger_adaptation(
        &self,
        trigger_event: &str,
        assets: &[AgentId],
        mission: Option<&MissionId>,
    ) -> Result<AdaptationOutcome, AdaptationError> {
        // Unknown missions are rejected before the hierarchy is touched.
        let handle = self.resolve_mission(mission).await?;
        let plan = self.generate_plan(trigger_event, assets).await?;
        let threshold = self.control.params().auto_adapt_threshold;

        if plan.success_probability > threshold {
            self.walk_steps(&plan, mission, handle.as_ref()).await?;
            Ok(AdaptationOutcome::Executed(plan))
        } else {
            info!(
                "Adaptation {} deferred: success probability {:.2} <= {:.2}",
                trigger_event, plan.success_probability, threshold
            );
            Ok(AdaptationOutcome::Deferred(plan))
        }
    }

    /// Adapt the hierarchy to a lost agent.
    pub async fn handle_intent_failure(
        &self,
        agent: &AgentId,
        mission: Option<&MissionId>,
    ) -> Result<AdaptationOutcome, AdaptationError> {
        let assets = [agent.clone()];
        let staffed = self
            .control
            .hierarchy()
            .lock()
            .await
            .nodes_using_assets(&assets);
        if staffed.is_empty() {
            debug!("No intents staffed by {}", agent);
            return Ok(AdaptationOutcome::NotAffected);
        }

        self.trigger_adaptation(&communication_failure_trigger(agent), &assets, mission)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControlParams;
    use crate::ports::notification::RecordingNotification;
    use pact_domain::{
        AdaptationStrategy, IntentId, IntentNode, IntentStatus, IntentType, Mission,
        MissionStatus,
    };

    async fn setup() -> (Arc<MissionControl>, Arc<RecordingNotification>, AdaptIntentsUseCase) {
        let alerts = Arc::new(RecordingNotification::default());
        let control = Arc::new(
            MissionControl::new(ControlParams::default()).with_alerts(alerts.clone()),
        );
        let use_case = AdaptIntentsUseCase::new(control.clone());
        (control, alerts, use_case)
    }

    async fn north_sector(control: &MissionControl) {
        control
            .add_intent_node(
                IntentNode::new("T1", "North sector", IntentType::Tactical).with_assets(["D1"]),
            )
            .await
            .unwrap();
        for (id, purpose) in [
            ("O1", "capture north sector photos"),
            ("O2", "capture north sector thermal"),
        ] {
            control
                .add_intent_node(
                    IntentNode::new(id, purpose, IntentType::Operational)
                        .with_parent("T1")
                        .with_priority(0.6)
                        .with_purpose(purpose),
                )
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_strategic_loss_restructures_mission() {
        let (control, _, use_case) = setup().await;
        control
            .add_intent_node(
                IntentNode::new("S1", "Secure the region", IntentType::Strategic)
                    .with_assets(["SAT-1"]),
            )
            .await
            .unwrap();

        let plan = use_case
            .generate_plan("LOSS", &[AgentId::new("SAT-1")])
            .await
            .unwrap();

        assert_eq!(plan.adaptation_strategy, AdaptationStrategy::MissionRestructure);
        assert_eq!(
            control.intent(&IntentId::new("S1")).await.unwrap().status,
            IntentStatus::Failed
        );
        assert_eq!(
            control
                .adaptation_history(&IntentId::new("S1"))
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_confident_plan_executes_with_step_alerts() {
        let (control, alerts, use_case) = setup().await;
        north_sector(&control).await;
        control
            .register_mission(Mission::new("M1", "Recon", Utc::now()).with_status(MissionStatus::Active))
            .await;

        let outcome = use_case
            .handle_intent_failure(&AgentId::new("D1"), Some(&MissionId::new("M1")))
            .await
            .unwrap();

        assert_eq!(outcome.as_str(), "executed");
        let plan = outcome.plan().unwrap();
        assert_eq!(plan.trigger_event, "COMMUNICATION_FAILURE:D1");
        assert_eq!(
            alerts.kinds(),
            vec![
                "ADAPTATION_STARTED",
                "ADAPTATION_STEP",
                "ADAPTATION_STEP",
                "ADAPTATION_STEP",
                "ADAPTATION_STEP",
                "ADAPTATION_STEP",
                "ADAPTATION_COMPLETE"
            ]
        );
    }

    #[tokio::test]
    async fn test_unpromising_plan_is_deferred() {
        let (control, alerts, use_case) = setup().await;
        control
            .add_intent_node(
                IntentNode::new("T1", "Lone tactical", IntentType::Tactical).with_assets(["D1"]),
            )
            .await
            .unwrap();

        let outcome = use_case
            .trigger_adaptation("MANUAL", &[AgentId::new("D1")], None)
            .await
            .unwrap();

        assert_eq!(outcome.as_str(), "deferred");
        assert_eq!(outcome.plan().unwrap().success_probability, 0.0);
        assert!(alerts.alerts().is_empty());
        assert_eq!(control.history().len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unstaffed_agent_is_not_affected() {
        let (control, _, use_case) = setup().await;
        north_sector(&control).await;

        let outcome = use_case
            .handle_intent_failure(&AgentId::new("D9"), None)
            .await
            .unwrap();
        assert_eq!(outcome, AdaptationOutcome::NotAffected);
        assert_eq!(control.history().len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_mission_is_rejected() {
        let (control, _, use_case) = setup().await;
        north_sector(&control).await;

        let err = use_case
            .trigger_adaptation("LOSS", &[AgentId::new("D1")], Some(&MissionId::new("M404")))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AdaptationError::Domain(DomainError::MissionNotFound(_))
        ));
        for id in ["T1", "O1", "O2"] {
            let node = control.intent(&IntentId::new(id)).await.unwrap();
            assert_eq!(node.status, IntentStatus::Active);
        }
        assert_eq!(control.history().len().await.unwrap(), 0);

        let plan = use_case
            .generate_plan("LOSS", &[AgentId::new("D1")])
            .await
            .unwrap();

        let err = use_case
            .execute_plan(&plan, Some(&MissionId::new("M404")))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AdaptationError::Domain(DomainError::MissionNotFound(_))
        ));
    }
}
