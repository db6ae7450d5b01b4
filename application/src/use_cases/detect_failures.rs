//! Failure Detector.
//!
//! Sweeps every active mission's roster and declares an agent
//! communication-failed once it has been silent longer than the configured
//! timeout. Each detection produces a [`CommunicationFailureRecord`] and an
//! asynchronous response: impact analysis, reassignment, then intent
//! adaptation.
//!
//! [`FailureDetector::run`] is the only loop in the system that sleeps. It
//! never ends on an internal error; a failed or panicked sweep is logged and
//! retried after the back-off. It ends when its cancellation token fires.

use super::adapt::{AdaptIntentsUseCase, AdaptationOutcome};
use super::reassign::{ReassignAgentsUseCase, ReassignmentOutcome};
use crate::context::MissionControl;
use chrono::{DateTime, Utc};
use pact_domain::{
    AgentId, AgentStatus, CommunicationFailureRecord, DomainError, MissionImpact, MissionStatus,
};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Everything the detector did about one failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureResponse {
    pub record: CommunicationFailureRecord,
    pub impact: Option<MissionImpact>,
    pub reassignment: ReassignmentOutcome,
    /// `None` when adaptation itself failed (the error is logged)
    pub adaptation: Option<AdaptationOutcome>,
}

#[derive(Clone)]
pub struct FailureDetector {
    control: Arc<MissionControl>,
    reassign: ReassignAgentsUseCase,
    adapt: AdaptIntentsUseCase,
}

impl FailureDetector {
    pub fn new(control: Arc<MissionControl>) -> Self {
        Self {
            reassign: ReassignAgentsUseCase::new(control.clone()),
            adapt: AdaptIntentsUseCase::new(control.clone()),
            control,
        }
    }

    /// One pass over every active mission.
    ///
    /// Agents already marked `CommFailure` are skipped, so a failure is
    /// recorded once.
    pub async fn sweep(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<CommunicationFailureRecord>, DomainError> {
        let timeout = self.control.params().comm_timeout_chrono();
        let mut detected = Vec::new();

        for handle in self.control.mission_handles().await {
            let mut mission = handle.lock().await;
            if !mission.is_active() {
                continue;
            }

            let mut registry = self.control.registry().write().await;
            for agent_id in mission.assigned_agents.clone() {
                let Some(agent) = registry.get(&agent_id) else {
                    warn!(
                        "Mission {} lists unregistered agent {}",
                        mission.id, agent_id
                    );
                    continue;
                };
                if agent.status == AgentStatus::CommFailure
                    || !agent.has_lost_contact(now, timeout)
                {
                    continue;
                }

                let silent_secs = agent.time_since_contact(now).num_seconds();
                let record = CommunicationFailureRecord::capture(agent, &mission, now);
                registry.update_status(&agent_id, AgentStatus::CommFailure)?;
                mission.transition(MissionStatus::Compromised, now);
                let record = record.with_generation(mission.generation);

                warn!(
                    "Communication lost with {} on mission {} (silent for {}s)",
                    agent_id, mission.id, silent_secs
                );
                detected.push(record);
            }
        }

        if !detected.is_empty() {
            let mut table = self.control.active_failure_table().write().await;
            for record in &detected {
                table.insert(record.agent_id.clone(), record.clone());
            }
        }
        Ok(detected)
    }

    /// Analyse, reassign and adapt for one detected failure.
    pub async fn respond(&self, record: CommunicationFailureRecord) -> FailureResponse {
        let impact = match self.reassign.calculate_mission_impact(&record.agent_id).await {
            Ok(impact) => {
                if !impact.is_empty() {
                    warn!(
                        "Losing {} affects {} objective(s): +{} min, -{:.2} success probability",
                        record.agent_id,
                        impact.affected_objectives.len(),
                        impact.mission_delay_minutes,
                        impact.success_probability_reduction
                    );
                }
                Some(impact)
            }
            Err(e) => {
                error!("Impact analysis for {} failed: {}", record.agent_id, e);
                None
            }
        };

        let reassignment = self.reassign.handle_failure(&record).await;

        let adaptation = match self
            .adapt
            .handle_intent_failure(&record.agent_id, Some(&record.mission_id))
            .await
        {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!("Intent adaptation for {} failed: {}", record.agent_id, e);
                None
            }
        };

        FailureResponse {
            record,
            impact,
            reassignment,
            adaptation,
        }
    }

    /// Force `agent` past the contact timeout and handle the resulting
    /// failure(s) inline.
    pub async fn simulate_failure(
        &self,
        agent: &AgentId,
        now: DateTime<Utc>,
    ) -> Result<Vec<FailureResponse>, DomainError> {
        let silent_since =
            now - self.control.params().comm_timeout_chrono() - chrono::Duration::seconds(1);
        self.control.record_contact(agent, silent_since).await?;
        info!("Simulating communication failure of {}", agent);

        let mut responses = Vec::new();
        for record in self.sweep(now).await? {
            responses.push(self.respond(record).await);
        }
        Ok(responses)
    }

    /// Sweep until `cancel` fires.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
        let params = self.control.params().clone();
        info!(
            "Failure detector started (sweep every {:?}, timeout {:?})",
            params.sweep_interval, params.comm_timeout
        );

        loop {
            let detector = self.clone();
            let sweep = tokio::spawn(async move { detector.sweep(Utc::now()).await });

            let pause = match sweep.await {
                Ok(Ok(records)) => {
                    for record in records {
                        let detector = self.clone();
                        tokio::spawn(async move {
                            detector.respond(record).await;
                        });
                    }
                    params.sweep_interval
                }
                Ok(Err(e)) => {
                    error!("Failure sweep failed: {}", e);
                    params.error_backoff
                }
                Err(e) => {
                    error!("Failure sweep aborted: {}", e);
                    params.error_backoff
                }
            };

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(pause) => {}
            }
        }

        info!("Failure detector stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControlParams;
    use crate::ports::notification::RecordingNotification;
    use pact_domain::{Agent, IntentNode, IntentType, Mission, MissionId};
    use std::time::Duration;

    fn ago(now: DateTime<Utc>, secs: i64) -> DateTime<Utc> {
        now - chrono::Duration::seconds(secs)
    }

    async fn setup(params: ControlParams) -> (Arc<MissionControl>, Arc<RecordingNotification>) {
        let alerts = Arc::new(RecordingNotification::default());
        let control = Arc::new(MissionControl::new(params).with_alerts(alerts.clone()));
        let now = Utc::now();

        control
            .register_agent(
                Agent::new("D1", "quad", ago(now, 10))
                    .with_capabilities(["camera", "thermal"])
                    .with_objectives(["OBJ_1"]),
            )
            .await;
        control
            .register_agent(Agent::new("D2", "quad", ago(now, 10)).with_capabilities(["camera"]))
            .await;
        control
            .register_agent(
                Agent::new("R1", "quad", now)
                    .with_capabilities(["thermal"])
                    .with_resource_level(0.9),
            )
            .await;
        control
            .register_mission(
                Mission::new("M1", "Perimeter", now)
                    .with_status(MissionStatus::Active)
                    .with_agents(["D1", "D2"]),
            )
            .await;
        (control, alerts)
    }

    #[tokio::test]
    async fn test_sweep_detects_silent_agent_once() {
        let (control, _) = setup(ControlParams::default()).await;
        let detector = FailureDetector::new(control.clone());
        let now = Utc::now();

        assert!(detector.sweep(now).await.unwrap().is_empty());

        control
            .record_contact(&AgentId::new("D1"), ago(now, 121))
            .await
            .unwrap();
        let records = detector.sweep(now).await.unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.agent_id, AgentId::new("D1"));
        assert_eq!(record.last_known_status, AgentStatus::Operational);
        assert_eq!(record.mission_generation, 1);

        let agent = control.agent(&AgentId::new("D1")).await.unwrap();
        assert_eq!(agent.status, AgentStatus::CommFailure);
        let mission = control.mission_snapshot(&MissionId::new("M1")).await.unwrap();
        assert_eq!(mission.status, MissionStatus::Compromised);
        assert_eq!(control.active_failures().await.len(), 1);

        assert!(detector.sweep(now).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_inactive_missions_are_not_swept() {
        let (control, _) = setup(ControlParams::default()).await;
        {
            let handle = control.mission(&MissionId::new("M1")).await.unwrap();
            handle.lock().await.transition(MissionStatus::Planned, Utc::now());
        }
        let detector = FailureDetector::new(control.clone());
        let later = Utc::now() + chrono::Duration::hours(1);
        assert!(detector.sweep(later).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_simulated_failure_is_reassigned_and_cleared() {
        let (control, alerts) = setup(ControlParams::default()).await;
        control
            .add_intent_node(
                IntentNode::new("T1", "Thermal sweep", IntentType::Tactical).with_assets(["D1"]),
            )
            .await
            .unwrap();
        let detector = FailureDetector::new(control.clone());

        let responses = detector
            .simulate_failure(&AgentId::new("D1"), Utc::now())
            .await
            .unwrap();

        assert_eq!(responses.len(), 1);
        let response = &responses[0];
        let plan = response.reassignment.plan().unwrap();
        assert_eq!(plan.replacement_agents, vec![AgentId::new("R1")]);
        assert_eq!(
            response.adaptation.as_ref().map(|o| o.as_str()),
            Some("deferred")
        );

        let mission = control.mission_snapshot(&MissionId::new("M1")).await.unwrap();
        assert_eq!(mission.status, MissionStatus::Active);
        assert!(control.active_failures().await.is_empty());
        assert!(alerts.kinds().contains(&"REASSIGNMENT_COMPLETE".to_string()));
    }

    #[tokio::test]
    async fn test_second_failure_without_replacement_recompromises_mission() {
        let (control, alerts) = setup(ControlParams::default()).await;
        let detector = FailureDetector::new(control.clone());
        let now = Utc::now();
        for id in ["D1", "D2"] {
            control
                .record_contact(&AgentId::new(id), ago(now, 121))
                .await
                .unwrap();
        }

        let records = detector.sweep(now).await.unwrap();
        assert_eq!(records.len(), 2);

        let mut outcomes = Vec::new();
        for record in records {
            outcomes.push(detector.respond(record).await.reassignment.as_str().to_string());
        }
        assert_eq!(outcomes, vec!["reassigned", "no_plan"]);

        let mission = control.mission_snapshot(&MissionId::new("M1")).await.unwrap();
        assert_eq!(mission.status, MissionStatus::Compromised);
        assert_eq!(
            mission.assigned_agents,
            vec![AgentId::new("D2"), AgentId::new("R1")]
        );
        assert!(alerts.kinds().contains(&"REASSIGNMENT_ESCALATION".to_string()));
    }

    #[tokio::test]
    async fn test_simulating_unknown_agent_is_not_found() {
        let (control, _) = setup(ControlParams::default()).await;
        let detector = FailureDetector::new(control);
        let err = detector
            .simulate_failure(&AgentId::new("GHOST"), Utc::now())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_run_loop_detects_and_stops_on_cancel() {
        let params = ControlParams::default()
            .with_sweep_interval(Duration::from_millis(10))
            .with_comm_timeout(Duration::from_secs(5));
        let (control, _) = setup(params).await;
        let detector = Arc::new(FailureDetector::new(control.clone()));
        let cancel = control.shutdown_token();

        let handle = tokio::spawn(detector.run(cancel));
        tokio::time::sleep(Duration::from_millis(200)).await;
        control.shutdown();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();

        let history = control
            .reassignment_history(&MissionId::new("M1"))
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].plan.failed_agent_id, AgentId::new("D1"));
    }
}
