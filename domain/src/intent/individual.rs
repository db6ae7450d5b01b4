//! Layer 1: what a single agent intends to do.

use super::context::AgentTaskSpec;
use crate::agent::value_objects::AgentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Minimum length of a trimmed objective.
pub const MIN_OBJECTIVE_LEN: usize = 5;
/// Minimum confidence an agent must state.
pub const MIN_CONFIDENCE: f64 = 0.3;
/// No resource can be required beyond full capacity.
pub const MAX_RESOURCE_REQUIREMENT: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualIntent {
    pub agent_id: AgentId,
    pub primary_objective: String,
    pub constraints: HashMap<String, Value>,
    pub success_metrics: HashMap<String, f64>,
    pub resource_requirements: HashMap<String, f64>,
    pub timestamp: DateTime<Utc>,
    pub confidence: f64,
}

impl IndividualIntent {
    pub fn from_spec(agent_id: AgentId, spec: &AgentTaskSpec, now: DateTime<Utc>) -> Self {
        Self {
            agent_id,
            primary_objective: spec.objective.clone(),
            constraints: spec.constraints.clone(),
            success_metrics: spec.metrics.clone(),
            resource_requirements: spec.resources.clone(),
            timestamp: now,
            confidence: spec.confidence,
        }
    }

    /// An intent is valid when its objective is clear, the agent is
    /// confident enough and no resource is over-requested.
    pub fn is_valid(&self) -> bool {
        if self.primary_objective.trim().chars().count() < MIN_OBJECTIVE_LEN {
            return false;
        }
        if self.confidence < MIN_CONFIDENCE {
            return false;
        }
        self.resource_requirements
            .values()
            .all(|requirement| *requirement <= MAX_RESOURCE_REQUIREMENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(objective: &str, confidence: f64) -> IndividualIntent {
        let spec = AgentTaskSpec::new(objective).with_confidence(confidence);
        IndividualIntent::from_spec(AgentId::new("A"), &spec, Utc::now())
    }

    #[test]
    fn test_valid_intent() {
        assert!(intent("Transmit emergency data", 0.9).is_valid());
    }

    #[test]
    fn test_objective_too_short() {
        assert!(!intent("Go", 0.9).is_valid());
        // Whitespace does not count toward the length
        assert!(!intent("   Go     ", 0.9).is_valid());
        assert!(intent("Relay", 0.9).is_valid());
    }

    #[test]
    fn test_confidence_threshold() {
        assert!(!intent("Transmit data", 0.29).is_valid());
        assert!(intent("Transmit data", 0.3).is_valid());
    }

    #[test]
    fn test_resource_over_request() {
        let spec = AgentTaskSpec::new("Transmit data")
            .with_resource("cpu", 0.5)
            .with_resource("bandwidth", 1.2);
        let intent = IndividualIntent::from_spec(AgentId::new("A"), &spec, Utc::now());
        assert!(!intent.is_valid());

        let spec = AgentTaskSpec::new("Transmit data").with_resource("cpu", 1.0);
        let intent = IndividualIntent::from_spec(AgentId::new("A"), &spec, Utc::now());
        assert!(intent.is_valid());
    }
}
