//! What a coordination call returns: the result plus a typed details payload.

use super::result::CoordinationResult;
use crate::agent::value_objects::AgentId;
use crate::intent::co_intent::CoIntent;
use crate::intent::collab::CollabIntent;
use crate::intent::core_intent::{AlignmentViolation, CoreIntent};
use crate::intent::individual::IndividualIntent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One step of the execution trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStep {
    pub step: String,
    pub timestamp: DateTime<Utc>,
    pub details: String,
}

impl ExecutionStep {
    pub fn new(step: impl Into<String>, details: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            step: step.into(),
            timestamp: at,
            details: details.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionTrace {
    pub success: bool,
    pub steps: Vec<ExecutionStep>,
    pub final_energy: f64,
    pub completed_at: DateTime<Utc>,
}

impl ExecutionTrace {
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.step.as_str()).collect()
    }
}

/// The full four-layer intent record of a successful coordination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentLayers {
    pub individual: [IndividualIntent; 2],
    pub co_intent: CoIntent,
    pub core_intent: CoreIntent,
    pub collab_intent: CollabIntent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinationReport {
    pub coordination_id: String,
    pub processing_time_ms: f64,
    pub energy_score: f64,
    pub needs_optimization: bool,
    pub layers: IntentLayers,
    pub execution: ExecutionTrace,
}

/// Details accompanying a [`CoordinationResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CoordinationDetails {
    /// One or both agents are not registered.
    NotFound { missing: Vec<AgentId> },
    /// Layer 1 rejected at least one individual intent.
    InvalidIntents {
        intent_a_valid: bool,
        intent_b_valid: bool,
    },
    /// Layer 2 negotiation did not converge.
    NoConsensus {
        negotiation_rounds: u32,
        consensus_reached: bool,
    },
    /// Layer 3 found a mission misalignment.
    Misaligned {
        reason: AlignmentViolation,
        mission_objective: String,
    },
    /// Layer 4 scored the partnership below the dissolution threshold.
    EnergyTooLow {
        energy_score: f64,
        threshold: f64,
        recommendation: String,
    },
    /// All four layers passed and the partnership executed.
    Completed(Box<CoordinationReport>),
    /// An internal fault was caught at the orchestration boundary.
    Fault { message: String },
}

impl CoordinationDetails {
    pub fn as_str(&self) -> &str {
        match self {
            CoordinationDetails::NotFound { .. } => "not_found",
            CoordinationDetails::InvalidIntents { .. } => "invalid_intents",
            CoordinationDetails::NoConsensus { .. } => "no_consensus",
            CoordinationDetails::Misaligned { .. } => "misaligned",
            CoordinationDetails::EnergyTooLow { .. } => "energy_too_low",
            CoordinationDetails::Completed(_) => "completed",
            CoordinationDetails::Fault { .. } => "fault",
        }
    }

    pub fn energy_score(&self) -> Option<f64> {
        match self {
            CoordinationDetails::EnergyTooLow { energy_score, .. } => Some(*energy_score),
            CoordinationDetails::Completed(report) => Some(report.energy_score),
            _ => None,
        }
    }

    pub fn report(&self) -> Option<&CoordinationReport> {
        match self {
            CoordinationDetails::Completed(report) => Some(report),
            _ => None,
        }
    }
}

/// A coordination result paired with its details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinationOutcome {
    pub coordination_id: String,
    pub result: CoordinationResult,
    pub details: CoordinationDetails,
}

impl CoordinationOutcome {
    pub fn new(
        coordination_id: impl Into<String>,
        result: CoordinationResult,
        details: CoordinationDetails,
    ) -> Self {
        Self {
            coordination_id: coordination_id.into(),
            result,
            details,
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_success()
    }

    pub fn into_parts(self) -> (CoordinationResult, CoordinationDetails) {
        (self.result, self.details)
    }
}
