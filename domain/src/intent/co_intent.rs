//! Layer 2: the shared intent two collaborating agents agree on.

use super::context::TaskContext;
use crate::agent::value_objects::AgentId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Marker for an objective nobody has settled yet.
pub const PLACEHOLDER_MARKER: &str = "TBD";
/// Negotiation gives up after this many rounds.
pub const MAX_NEGOTIATION_ROUNDS: u32 = 3;

pub const DEFAULT_PROTOCOL: &str = "direct";
pub const DEFAULT_CONFLICT_RESOLUTION: &str = "consensus";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoIntent {
    pub agent_a_id: AgentId,
    pub agent_b_id: AgentId,
    pub shared_objective: String,
    pub role_definitions: BTreeMap<AgentId, String>,
    pub communication_protocol: String,
    pub conflict_resolution_method: String,
    pub success_criteria: HashMap<String, f64>,
    pub negotiation_rounds: u32,
    pub consensus_reached: bool,
}

impl CoIntent {
    pub fn from_task(agent_a: &AgentId, agent_b: &AgentId, task: &TaskContext) -> Self {
        let mut role_definitions = BTreeMap::new();
        role_definitions.insert(
            agent_a.clone(),
            task.agent_a.role.clone().unwrap_or_else(|| "primary".to_string()),
        );
        role_definitions.insert(
            agent_b.clone(),
            task.agent_b
                .role
                .clone()
                .unwrap_or_else(|| "secondary".to_string()),
        );

        Self {
            agent_a_id: agent_a.clone(),
            agent_b_id: agent_b.clone(),
            shared_objective: task.shared_objective.clone(),
            role_definitions,
            communication_protocol: task
                .comm_protocol
                .clone()
                .unwrap_or_else(|| DEFAULT_PROTOCOL.to_string()),
            conflict_resolution_method: task
                .conflict_resolution
                .clone()
                .unwrap_or_else(|| DEFAULT_CONFLICT_RESOLUTION.to_string()),
            success_criteria: task.shared_success_criteria.clone(),
            negotiation_rounds: 0,
            consensus_reached: false,
        }
    }

    /// Run one negotiation round.
    ///
    /// Consensus needs two distinct roles and a settled shared objective.
    pub fn establish_consensus(&mut self) -> bool {
        self.negotiation_rounds += 1;

        if self.role_definitions.len() < 2 {
            return false;
        }
        if self.shared_objective.is_empty() || self.shared_objective.contains(PLACEHOLDER_MARKER) {
            return false;
        }
        if self.negotiation_rounds <= MAX_NEGOTIATION_ROUNDS {
            self.consensus_reached = true;
            return true;
        }
        false
    }

    /// Roles rendered as `agent=role` pairs.
    pub fn describe_roles(&self) -> String {
        self.role_definitions
            .iter()
            .map(|(agent, role)| format!("{agent}={role}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn co_intent(shared: &str) -> CoIntent {
        CoIntent::from_task(&AgentId::new("A"), &AgentId::new("B"), &TaskContext::new(shared))
    }

    #[test]
    fn test_defaults_from_task() {
        let co = co_intent("Relay emergency data");
        assert_eq!(co.communication_protocol, "direct");
        assert_eq!(co.conflict_resolution_method, "consensus");
        assert_eq!(co.role_definitions[&AgentId::new("A")], "primary");
        assert_eq!(co.role_definitions[&AgentId::new("B")], "secondary");
        assert_eq!(co.describe_roles(), "A=primary, B=secondary");
    }

    #[test]
    fn test_consensus_reached_first_round() {
        let mut co = co_intent("Relay emergency data");
        assert!(co.establish_consensus());
        assert!(co.consensus_reached);
        assert_eq!(co.negotiation_rounds, 1);
    }

    #[test]
    fn test_placeholder_objective_blocks_consensus() {
        let mut co = co_intent("Relay TBD data");
        assert!(!co.establish_consensus());
        assert!(!co.consensus_reached);

        let mut empty = co_intent("");
        assert!(!empty.establish_consensus());
    }

    #[test]
    fn test_same_agent_twice_has_one_role() {
        let id = AgentId::new("A");
        let mut co = CoIntent::from_task(&id, &id, &TaskContext::new("Relay data"));
        assert_eq!(co.role_definitions.len(), 1);
        assert!(!co.establish_consensus());
    }

    #[test]
    fn test_rounds_cap() {
        let mut co = co_intent("Relay data");
        co.negotiation_rounds = MAX_NEGOTIATION_ROUNDS;
        assert!(!co.establish_consensus());
    }
}
