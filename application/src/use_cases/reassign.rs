//! Reassign Agents use case.
//!
//! Replaces a communication-failed agent on its mission. Everything that
//! reads or writes a mission does so inside that mission's mutex, so a
//! concurrent reader sees the roster either before or after a plan, never
//! in between.

use crate::context::MissionControl;
use crate::ports::history::{HistoryEntry, HistoryError};
use crate::ports::notification::Alert;
use chrono::{DateTime, Utc};
use pact_domain::{
    AgentId, AgentStatus, CommunicationFailureRecord, DomainError, Mission, MissionId,
    MissionImpact, MissionStatus, ReassignmentPlan, ReplacementCandidate,
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Error, Debug)]
pub enum ReassignmentError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(
        "Plan for mission {mission} was computed at generation {planned}, mission is now at {current}"
    )]
    StalePlan {
        mission: MissionId,
        planned: u64,
        current: u64,
    },

    #[error("Could not record reassignment: {0}")]
    History(#[from] HistoryError),
}

impl ReassignmentError {
    pub fn is_stale(&self) -> bool {
        matches!(self, ReassignmentError::StalePlan { .. })
    }
}

/// What the automatic failure flow did with a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum ReassignmentOutcome {
    /// A plan was generated and applied.
    Reassigned(ReassignmentPlan),
    /// No agent qualified; the mission stays compromised and was escalated.
    NoPlan,
    /// The mission already moved past this failure.
    Stale,
    /// The flow aborted; the mission roster is unchanged.
    Failed(String),
}

impl ReassignmentOutcome {
    pub fn as_str(&self) -> &str {
        match self {
            ReassignmentOutcome::Reassigned(_) => "reassigned",
            ReassignmentOutcome::NoPlan => "no_plan",
            ReassignmentOutcome::Stale => "stale",
            ReassignmentOutcome::Failed(_) => "failed",
        }
    }

    pub fn plan(&self) -> Option<&ReassignmentPlan> {
        match self {
            ReassignmentOutcome::Reassigned(plan) => Some(plan),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct ReassignAgentsUseCase {
    control: Arc<MissionControl>,
}

impl ReassignAgentsUseCase {
    pub fn new(control: Arc<MissionControl>) -> Self {
        Self { control }
    }

    // ==================== Analysis ====================

    /// Impact of losing `agent_id` across every mission it is assigned to.
    pub async fn calculate_mission_impact(
        &self,
        agent_id: &AgentId,
    ) -> Result<MissionImpact, DomainError> {
        let agent = self
            .control
            .agent(agent_id)
            .await
            .ok_or_else(|| DomainError::AgentNotFound(agent_id.clone()))?;
        let missions = self.control.mission_snapshots().await;
        Ok(pact_domain::calculate_mission_impact(&agent, &missions))
    }

    pub async fn find_replacement_candidates(
        &self,
        failed: &AgentId,
        mission_id: &MissionId,
    ) -> Result<Vec<ReplacementCandidate>, DomainError> {
        let handle = self.control.mission(mission_id).await?;
        let mission = handle.lock().await;
        let registry = self.control.registry().read().await;
        let failed = registry.require(failed)?;
        Ok(pact_domain::find_replacement_candidates(
            failed, &mission, &registry,
        ))
    }

    /// Plan for the failure in `record`, `Ok(None)` when nobody qualifies.
    pub async fn generate_reassignment_plan(
        &self,
        record: &CommunicationFailureRecord,
    ) -> Result<Option<ReassignmentPlan>, DomainError> {
        let handle = self.control.mission(&record.mission_id).await?;
        let mission = handle.lock().await;
        self.plan_locked(record, &mission, Utc::now()).await
    }

    // ==================== Execution ====================

    /// Apply `plan` to its mission.
    ///
    /// Rejected with [`ReassignmentError::StalePlan`] when the mission has
    /// transitioned since the plan was generated.
    pub async fn execute_reassignment_plan(
        &self,
        plan: &ReassignmentPlan,
    ) -> Result<(), ReassignmentError> {
        let handle = self.control.mission(&plan.mission_id).await?;
        let mut mission = handle.lock().await;
        if mission.generation != plan.mission_generation {
            return Err(ReassignmentError::StalePlan {
                mission: mission.id.clone(),
                planned: plan.mission_generation,
                current: mission.generation,
            });
        }
        self.apply_locked(&mut mission, plan, Utc::now()).await
    }

    /// Full automatic response to a detected communication failure.
    pub async fn handle_failure(&self, record: &CommunicationFailureRecord) -> ReassignmentOutcome {
        let now = Utc::now();
        self.control.notify(Alert::CommunicationFailure {
            agent_id: record.agent_id.clone(),
            mission_id: record.mission_id.clone(),
            detected_at: record.failure_time,
        });

        let handle = match self.control.mission(&record.mission_id).await {
            Ok(handle) => handle,
            Err(e) => return self.fail(record, e.into()),
        };
        let mut mission = handle.lock().await;

        if self.is_stale(record, &mission).await {
            info!(
                "Ignoring stale failure of {} on mission {} (generation {} < {})",
                record.agent_id, mission.id, record.mission_generation, mission.generation
            );
            return ReassignmentOutcome::Stale;
        }

        let plan = match self.plan_locked(record, &mission, now).await {
            Ok(Some(plan)) => plan,
            Ok(None) => {
                warn!(
                    "No replacement for {} on mission {}; escalating",
                    record.agent_id, mission.id
                );
                // An earlier reassignment in the same sweep may have
                // reactivated the mission around this agent.
                mission.transition(MissionStatus::Compromised, now);
                self.control.notify(Alert::ReassignmentEscalation {
                    mission_id: mission.id.clone(),
                    failed_agent_id: record.agent_id.clone(),
                    reason: "no replacement candidates".to_string(),
                });
                return ReassignmentOutcome::NoPlan;
            }
            Err(e) => return self.fail(record, e.into()),
        };

        mission.transition(MissionStatus::Reassigning, now);
        info!(
            "Mission {} reassigning {} to {:?}",
            mission.id, record.agent_id, plan.replacement_agents
        );

        if let Err(e) = self.apply_locked(&mut mission, &plan, now).await {
            mission.transition(MissionStatus::Compromised, now);
            return self.fail(record, e);
        }

        self.control.notify(Alert::ReassignmentComplete {
            mission_id: plan.mission_id.clone(),
            failed_agent_id: plan.failed_agent_id.clone(),
            replacement_agents: plan.replacement_agents.clone(),
            confidence_score: plan.confidence_score,
        });
        ReassignmentOutcome::Reassigned(plan)
    }

    // ==================== Internals ====================

    async fn plan_locked(
        &self,
        record: &CommunicationFailureRecord,
        mission: &Mission,
        now: DateTime<Utc>,
    ) -> Result<Option<ReassignmentPlan>, DomainError> {
        let registry = self.control.registry().read().await;
        let failed = registry.require(&record.agent_id)?;
        Ok(pact_domain::generate_reassignment_plan(
            record, failed, mission, &registry, now,
        ))
    }

    /// A record is stale once the mission is active again at a later
    /// generation and the agent no longer needs replacing.
    async fn is_stale(&self, record: &CommunicationFailureRecord, mission: &Mission) -> bool {
        if !mission.is_active() || mission.generation <= record.mission_generation {
            return false;
        }
        if !mission.has_agent(&record.agent_id) {
            return true;
        }
        let registry = self.control.registry().read().await;
        registry
            .get(&record.agent_id)
            .is_none_or(|agent| agent.status != AgentStatus::CommFailure)
    }

    /// Validate, record, then mutate. Nothing is changed unless every
    /// referenced agent exists and the history append succeeded.
    async fn apply_locked(
        &self,
        mission: &mut Mission,
        plan: &ReassignmentPlan,
        now: DateTime<Utc>,
    ) -> Result<(), ReassignmentError> {
        {
            let registry = self.control.registry().read().await;
            for agent in &plan.replacement_agents {
                registry.require(agent)?;
            }
        }

        self.control
            .history()
            .append(HistoryEntry::reassignment(plan.clone(), now))
            .await?;

        {
            let mut registry = self.control.registry().write().await;
            for agent in &plan.replacement_agents {
                registry.assign_objectives(agent, plan.objectives_for(agent))?;
            }
        }

        mission.remove_agent(&plan.failed_agent_id);
        for agent in &plan.replacement_agents {
            mission.add_agent(agent.clone());
        }
        mission.formation = plan.formation_adjustment.clone();
        mission.transition(MissionStatus::Active, now);

        self.control
            .active_failure_table()
            .write()
            .await
            .remove(&plan.failed_agent_id);

        info!(
            "Mission {} reassigned: {} replaced by {:?} (confidence {:.2}, delay {} min)",
            mission.id,
            plan.failed_agent_id,
            plan.replacement_agents,
            plan.confidence_score,
            plan.estimated_delay_minutes
        );
        Ok(())
    }

    fn fail(
        &self,
        record: &CommunicationFailureRecord,
        e: ReassignmentError,
    ) -> ReassignmentOutcome {
        error!(
            "Reassignment for {} on mission {} failed: {}",
            record.agent_id, record.mission_id, e
        );
        self.control.notify(Alert::ReassignmentFailed {
            mission_id: record.mission_id.clone(),
            failed_agent_id: record.agent_id.clone(),
            error: e.to_string(),
        });
        ReassignmentOutcome::Failed(e.to_string())
    }
}
