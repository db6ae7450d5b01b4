//! Replacement search and reassignment plan generation.
//!
//! Both functions are pure: identical registry and mission state always
//! yield identical candidates and plans.

use crate::agent::entities::Agent;
use crate::agent::registry::AgentRegistry;
use crate::agent::value_objects::AgentId;
use crate::failure::record::CommunicationFailureRecord;
use crate::mission::entities::Mission;
use crate::mission::formation::FormationConfig;
use crate::mission::value_objects::{MissionId, ObjectiveId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Replacements must hold strictly more than this fraction of resources.
pub const MIN_RESOURCE_LEVEL: f64 = 0.3;
/// Candidates returned by a search.
pub const MAX_CANDIDATES: usize = 3;
/// Candidates actually selected into a plan.
pub const MAX_REPLACEMENTS: usize = 2;

const MAX_CONFIDENCE: f64 = 0.95;
const CONFIDENCE_PER_REPLACEMENT: f64 = 0.4;
const BASE_CONFIDENCE: f64 = 0.3;
const MIN_DELAY_MINUTES: u32 = 10;
const BASE_DELAY_MINUTES: u32 = 30;
const DELAY_SAVED_PER_REPLACEMENT: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplacementCandidate {
    pub agent_id: AgentId,
    pub shared_capabilities: usize,
    pub resource_level: f64,
}

/// Objectives handed to one replacement agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectiveAssignment {
    pub agent_id: AgentId,
    pub objectives: Vec<ObjectiveId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReassignmentPlan {
    pub failed_agent_id: AgentId,
    pub mission_id: MissionId,
    pub replacement_agents: Vec<AgentId>,
    pub objective_redistribution: Vec<ObjectiveAssignment>,
    pub formation_adjustment: FormationConfig,
    pub estimated_delay_minutes: u32,
    pub confidence_score: f64,
    /// Mission generation the plan was computed against
    pub mission_generation: u64,
    pub generated_at: DateTime<Utc>,
}

impl ReassignmentPlan {
    pub fn objectives_for(&self, agent: &AgentId) -> &[ObjectiveId] {
        self.objective_redistribution
            .iter()
            .find(|a| &a.agent_id == agent)
            .map(|a| a.objectives.as_slice())
            .unwrap_or(&[])
    }
}

/// Operational agents outside the mission that can stand in for `failed`.
///
/// Ranked by shared capability count, then resource level, both descending;
/// ties keep registry order.
pub fn find_replacement_candidates(
    failed: &Agent,
    mission: &Mission,
    registry: &AgentRegistry,
) -> Vec<ReplacementCandidate> {
    let mut candidates: Vec<ReplacementCandidate> = registry
        .iter()
        .filter(|agent| {
            agent.is_operational()
                && agent.id != failed.id
                && !mission.has_agent(&agent.id)
                && agent.resource_level > MIN_RESOURCE_LEVEL
        })
        .filter_map(|agent| {
            let shared = agent.capabilities.shared_count(&failed.capabilities);
            (shared > 0).then(|| ReplacementCandidate {
                agent_id: agent.id.clone(),
                shared_capabilities: shared,
                resource_level: agent.resource_level,
            })
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.shared_capabilities
            .cmp(&a.shared_capabilities)
            .then_with(|| {
                b.resource_level
                    .partial_cmp(&a.resource_level)
                    .unwrap_or(Ordering::Equal)
            })
    });
    candidates.truncate(MAX_CANDIDATES);
    candidates
}

/// Build a plan replacing the agent in `record`, or `None` when no agent
/// qualifies.
pub fn generate_reassignment_plan(
    record: &CommunicationFailureRecord,
    failed: &Agent,
    mission: &Mission,
    registry: &AgentRegistry,
    now: DateTime<Utc>,
) -> Option<ReassignmentPlan> {
    let candidates = find_replacement_candidates(failed, mission, registry);
    if candidates.is_empty() {
        return None;
    }

    let selected: Vec<AgentId> = candidates
        .into_iter()
        .take(MAX_REPLACEMENTS)
        .map(|c| c.agent_id)
        .collect();

    let mut redistribution: Vec<ObjectiveAssignment> = selected
        .iter()
        .map(|id| ObjectiveAssignment {
            agent_id: id.clone(),
            objectives: Vec::new(),
        })
        .collect();
    for (i, objective) in record.assigned_objectives.iter().enumerate() {
        redistribution[i % selected.len()]
            .objectives
            .push(objective.clone());
    }

    let n = selected.len() as u32;
    Some(ReassignmentPlan {
        failed_agent_id: record.agent_id.clone(),
        mission_id: mission.id.clone(),
        replacement_agents: selected,
        objective_redistribution: redistribution,
        formation_adjustment: mission.formation.adjusted_for_loss(),
        estimated_delay_minutes: BASE_DELAY_MINUTES
            .saturating_sub(n * DELAY_SAVED_PER_REPLACEMENT)
            .max(MIN_DELAY_MINUTES),
        confidence_score: (n as f64 * CONFIDENCE_PER_REPLACEMENT + BASE_CONFIDENCE)
            .min(MAX_CONFIDENCE),
        mission_generation: mission.generation,
        generated_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::entities::AgentStatus;
    use crate::mission::entities::MissionStatus;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn drone(id: &str, caps: &[&str], level: f64) -> Agent {
        Agent::new(id, "quad", now())
            .with_capabilities(caps.iter().copied())
            .with_resource_level(level)
    }

    fn setup() -> (AgentRegistry, Mission) {
        let mut registry = AgentRegistry::new();
        registry.register(
            drone("D1", &["surveillance", "relay"], 0.6).with_objectives(["OBJ_1", "OBJ_2", "OBJ_3"]),
        );
        registry.register(drone("D2", &["surveillance"], 0.9));
        registry.register(drone("R1", &["surveillance"], 0.5));
        registry.register(drone("R2", &["surveillance", "relay"], 0.4));
        registry.register(drone("R3", &["surveillance"], 0.8));
        registry.register(drone("LOW", &["surveillance", "relay"], 0.3));
        registry.register(drone("DOWN", &["relay"], 0.9).with_status(AgentStatus::Damaged));
        registry.register(drone("NOCAP", &["payload"], 0.9));

        let mission = Mission::new("M1", "Recon", now())
            .with_status(MissionStatus::Active)
            .with_agents(["D1", "D2"]);
        (registry, mission)
    }

    #[test]
    fn test_candidates_filtered_and_ranked() {
        let (registry, mission) = setup();
        let failed = registry.get(&AgentId::new("D1")).unwrap();

        let candidates = find_replacement_candidates(failed, &mission, &registry);
        let ids: Vec<&str> = candidates.iter().map(|c| c.agent_id.as_str()).collect();
        assert_eq!(ids, vec!["R2", "R3", "R1"]);
        assert_eq!(candidates[0].shared_capabilities, 2);
    }

    #[test]
    fn test_plan_round_robin() {
        let (registry, mission) = setup();
        let failed = registry.get(&AgentId::new("D1")).unwrap();
        let record = CommunicationFailureRecord::capture(failed, &mission, now());

        let plan = generate_reassignment_plan(&record, failed, &mission, &registry, now()).unwrap();
        assert_eq!(plan.replacement_agents, vec![AgentId::new("R2"), AgentId::new("R3")]);
        assert_eq!(
            plan.objectives_for(&AgentId::new("R2")),
            &[ObjectiveId::new("OBJ_1"), ObjectiveId::new("OBJ_3")]
        );
        assert_eq!(plan.objectives_for(&AgentId::new("R3")), &[ObjectiveId::new("OBJ_2")]);
        assert!((plan.confidence_score - 0.95).abs() < 1e-9);
        assert_eq!(plan.estimated_delay_minutes, 10);
        assert!((plan.formation_adjustment.spacing_meters - 60.0).abs() < 1e-9);
        assert_eq!(plan.formation_adjustment.communication_channel, "CH_2");
    }

    #[test]
    fn test_single_candidate_plan() {
        let mut registry = AgentRegistry::new();
        registry.register(drone("D1", &["relay"], 0.6).with_objectives(["OBJ_1", "OBJ_2"]));
        registry.register(drone("R1", &["relay"], 0.7));
        let mission = Mission::new("M1", "Relay", now()).with_agents(["D1"]);
        let failed = registry.get(&AgentId::new("D1")).unwrap();
        let record = CommunicationFailureRecord::capture(failed, &mission, now());

        let plan = generate_reassignment_plan(&record, failed, &mission, &registry, now()).unwrap();
        assert_eq!(plan.replacement_agents, vec![AgentId::new("R1")]);
        assert_eq!(plan.objectives_for(&AgentId::new("R1")).len(), 2);
        assert!((plan.confidence_score - 0.7).abs() < 1e-9);
        assert_eq!(plan.estimated_delay_minutes, 20);
    }

    #[test]
    fn test_no_candidates_no_plan() {
        let mut registry = AgentRegistry::new();
        registry.register(drone("D1", &["relay"], 0.6));
        registry.register(drone("R1", &["relay"], 0.2));
        let mission = Mission::new("M1", "Relay", now()).with_agents(["D1"]);
        let failed = registry.get(&AgentId::new("D1")).unwrap();
        let record = CommunicationFailureRecord::capture(failed, &mission, now());

        assert!(generate_reassignment_plan(&record, failed, &mission, &registry, now()).is_none());
    }

    #[test]
    fn test_plan_generation_is_deterministic() {
        let (registry, mission) = setup();
        let failed = registry.get(&AgentId::new("D1")).unwrap();
        let record = CommunicationFailureRecord::capture(failed, &mission, now());

        let first = generate_reassignment_plan(&record, failed, &mission, &registry, now());
        let second = generate_reassignment_plan(&record, failed, &mission, &registry, now());
        assert_eq!(first, second);
    }
}
