//! Coordinate Agents use case.
//!
//! Runs the four-layer intent protocol for one pair of agents:
//!
//! 1. **Individual**: both agents' intents must be valid
//! 2. **Co-intent**: the pair must reach consensus on roles and objective
//! 3. **Core**: the shared objective must serve the mission
//! 4. **Collab**: the partnership energy must clear the dissolution threshold
//!
//! Then the partnership executes and the outcome is counted and sent to
//! telemetry. Rejections are typed results, never errors.

use crate::context::MissionControl;
use crate::ports::telemetry::CoordinationSample;
use chrono::Utc;
use pact_domain::intent::collab::DISSOLUTION_THRESHOLD;
use pact_domain::{
    Agent, AgentId, CoIntent, CollabIntent, CoordinationDetails, CoordinationOutcome,
    CoordinationPhase, CoordinationReport, CoordinationResult, CoreIntent, ExecutionStep,
    ExecutionTrace, IndividualIntent, IntentLayers, MissionContext, TaskContext,
};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

const ALTERNATIVE_PARTNERSHIP: &str = "find_alternative_partnership";

/// Faults caught at the coordination boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordinationError {
    #[error("Energy score is not a finite number ({0})")]
    NonFiniteEnergy(f64),
}

/// Use case for coordinating a pair of agents.
#[derive(Clone)]
pub struct CoordinateAgentsUseCase {
    control: Arc<MissionControl>,
}

impl CoordinateAgentsUseCase {
    pub fn new(control: Arc<MissionControl>) -> Self {
        Self { control }
    }

    /// Coordinate `agent_a` with `agent_b` on `task` within `mission`.
    ///
    /// Unknown agents yield `FAILED_L1_VALIDATION` with a
    /// [`CoordinationDetails::NotFound`] payload.
    pub async fn execute(
        &self,
        agent_a: &AgentId,
        agent_b: &AgentId,
        task: &TaskContext,
        mission: &MissionContext,
    ) -> CoordinationOutcome {
        let coordination_id = Uuid::new_v4().to_string();
        let started = Instant::now();
        self.control
            .begin_coordination(&coordination_id, [agent_a.clone(), agent_b.clone()]);

        info!(
            "Coordination {} started: {} + {}",
            coordination_id, agent_a, agent_b
        );

        let (result, details) = match self.lookup(agent_a, agent_b).await {
            Err(missing) => {
                warn!(
                    "Coordination {}: unknown agent(s) {:?}",
                    coordination_id, missing
                );
                (
                    CoordinationResult::FailedL1Validation,
                    CoordinationDetails::NotFound { missing },
                )
            }
            Ok((a, b)) => {
                match self.run_layers(&coordination_id, &a, &b, task, mission, started) {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        error!("Coordination {} fault: {}", coordination_id, e);
                        (
                            CoordinationResult::FailedL1Validation,
                            CoordinationDetails::Fault {
                                message: e.to_string(),
                            },
                        )
                    }
                }
            }
        };

        let elapsed = started.elapsed();
        let metrics =
            self.control
                .finish_coordination(&coordination_id, result.is_success(), elapsed);

        self.control
            .telemetry()
            .record_coordination(&CoordinationSample {
                coordination_id: coordination_id.clone(),
                result,
                processing_time_ms: elapsed.as_secs_f64() * 1000.0,
                energy_score: details.energy_score(),
                metrics,
            });

        info!("Coordination {} finished: {}", coordination_id, result);
        CoordinationOutcome::new(coordination_id, result, details)
    }

    async fn lookup(&self, a: &AgentId, b: &AgentId) -> Result<(Agent, Agent), Vec<AgentId>> {
        let registry = self.control.registry().read().await;
        match (registry.get(a), registry.get(b)) {
            (Some(a), Some(b)) => Ok((a.clone(), b.clone())),
            (found_a, found_b) => {
                let mut missing = Vec::new();
                if found_a.is_none() {
                    missing.push(a.clone());
                }
                if found_b.is_none() {
                    missing.push(b.clone());
                }
                Err(missing)
            }
        }
    }

    fn run_layers(
        &self,
        coordination_id: &str,
        agent_a: &Agent,
        agent_b: &Agent,
        task: &TaskContext,
        mission: &MissionContext,
        started: Instant,
    ) -> Result<(CoordinationResult, CoordinationDetails), CoordinationError> {
        let now = Utc::now();

        // Layer 1
        let intent_a = IndividualIntent::from_spec(agent_a.id.clone(), &task.agent_a, now);
        let intent_b = IndividualIntent::from_spec(agent_b.id.clone(), &task.agent_b, now);
        let (valid_a, valid_b) = (intent_a.is_valid(), intent_b.is_valid());
        debug!(
            "Coordination {} layer 1: {}={}, {}={}",
            coordination_id, agent_a.id, valid_a, agent_b.id, valid_b
        );
        if !(valid_a && valid_b) {
            return Ok((
                CoordinationResult::FailedL1Validation,
                CoordinationDetails::InvalidIntents {
                    intent_a_valid: valid_a,
                    intent_b_valid: valid_b,
                },
            ));
        }
        self.control
            .advance_coordination(coordination_id, CoordinationPhase::Validated);

        // Layer 2
        self.control
            .advance_coordination(coordination_id, CoordinationPhase::Negotiating);
        let mut co_intent = CoIntent::from_task(&agent_a.id, &agent_b.id, task);
        let consensus = co_intent.establish_consensus();
        debug!(
            "Coordination {} layer 2: consensus={} after {} round(s)",
            coordination_id, consensus, co_intent.negotiation_rounds
        );
        if !consensus {
            return Ok((
                CoordinationResult::FailedL2Consensus,
                CoordinationDetails::NoConsensus {
                    negotiation_rounds: co_intent.negotiation_rounds,
                    consensus_reached: co_intent.consensus_reached,
                },
            ));
        }

        // Layer 3
        let core_intent = CoreIntent::from_mission(mission);
        if let Err(reason) = core_intent.validate_alignment(&co_intent) {
            debug!("Coordination {} layer 3: {}", coordination_id, reason);
            return Ok((
                CoordinationResult::FailedL3Alignment,
                CoordinationDetails::Misaligned {
                    reason,
                    mission_objective: core_intent.mission_objective.clone(),
                },
            ));
        }
        self.control
            .advance_coordination(coordination_id, CoordinationPhase::Aligned);

        // Layer 4
        let mut collab = CollabIntent::new(&agent_a.id, &agent_b.id, coordination_id);
        let energy = collab.calculate_energy_score(agent_a, agent_b, task.complexity);
        if !energy.is_finite() {
            return Err(CoordinationError::NonFiniteEnergy(energy));
        }
        debug!("Coordination {} layer 4: energy {:.3}", coordination_id, energy);
        if collab.should_dissolve() {
            return Ok((
                CoordinationResult::FailedL4Optimization,
                CoordinationDetails::EnergyTooLow {
                    energy_score: energy,
                    threshold: DISSOLUTION_THRESHOLD,
                    recommendation: ALTERNATIVE_PARTNERSHIP.to_string(),
                },
            ));
        }
        if collab.needs_optimization() {
            info!(
                "Coordination {}: partnership works but needs optimization ({:.2})",
                coordination_id, energy
            );
        }
        self.control
            .advance_coordination(coordination_id, CoordinationPhase::Optimized);

        // Execution
        self.control
            .advance_coordination(coordination_id, CoordinationPhase::Executing);
        let execution = execute_partnership(&co_intent, &collab);

        let report = CoordinationReport {
            coordination_id: coordination_id.to_string(),
            processing_time_ms: started.elapsed().as_secs_f64() * 1000.0,
            energy_score: energy,
            needs_optimization: collab.needs_optimization(),
            layers: IntentLayers {
                individual: [intent_a, intent_b],
                co_intent,
                core_intent,
                collab_intent: collab,
            },
            execution,
        };

        Ok((
            CoordinationResult::Success,
            CoordinationDetails::Completed(Box::new(report)),
        ))
    }
}

fn execute_partnership(co_intent: &CoIntent, collab: &CollabIntent) -> ExecutionTrace {
    let mut steps = Vec::with_capacity(4);
    steps.push(ExecutionStep::new(
        "communication_init",
        format!("Established {} protocol", co_intent.communication_protocol),
        Utc::now(),
    ));
    steps.push(ExecutionStep::new(
        "task_distribution",
        format!("Assigned roles: {}", co_intent.describe_roles()),
        Utc::now(),
    ));
    steps.push(ExecutionStep::new(
        "energy_monitoring",
        format!("Partnership energy: {:.2}", collab.partnership_efficiency),
        Utc::now(),
    ));
    steps.push(ExecutionStep::new(
        "coordination_complete",
        "Successfully completed coordination",
        Utc::now(),
    ));

    ExecutionTrace {
        success: true,
        steps,
        final_energy: collab.partnership_efficiency,
        completed_at: Utc::now(),
    }
}
