//! Communication failure records.

use crate::agent::entities::{Agent, AgentStatus};
use crate::agent::value_objects::{AgentId, Position};
use crate::mission::entities::Mission;
use crate::mission::value_objects::{MissionId, ObjectiveId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of an agent taken when its communication was declared lost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunicationFailureRecord {
    pub agent_id: AgentId,
    pub mission_id: MissionId,
    pub failure_time: DateTime<Utc>,
    pub last_known_position: Position,
    pub last_known_status: AgentStatus,
    pub estimated_resource_remaining: f64,
    pub assigned_objectives: Vec<ObjectiveId>,
    /// Mission generation at the moment of detection
    pub mission_generation: u64,
}

impl CommunicationFailureRecord {
    /// Capture the agent as last seen. Take the snapshot before the agent
    /// is marked failed so `last_known_status` reflects its final report.
    pub fn capture(agent: &Agent, mission: &Mission, now: DateTime<Utc>) -> Self {
        Self {
            agent_id: agent.id.clone(),
            mission_id: mission.id.clone(),
            failure_time: now,
            last_known_position: agent.position,
            last_known_status: agent.status,
            estimated_resource_remaining: agent.resource_level,
            assigned_objectives: agent.assigned_objectives.clone(),
            mission_generation: mission.generation,
        }
    }

    pub fn with_generation(mut self, generation: u64) -> Self {
        self.mission_generation = generation;
        self
    }
}
