//! Mission entity: objectives, roster and lifecycle.

use super::formation::FormationConfig;
use super::value_objects::{MissionId, ObjectiveId, TaskPriority};
use crate::agent::value_objects::AgentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mission lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MissionStatus {
    #[default]
    Planned,
    Active,
    Compromised,
    Reassigning,
    Completed,
    Aborted,
}

impl MissionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            MissionStatus::Planned => "PLANNED",
            MissionStatus::Active => "ACTIVE",
            MissionStatus::Compromised => "COMPROMISED",
            MissionStatus::Reassigning => "REASSIGNING",
            MissionStatus::Completed => "COMPLETED",
            MissionStatus::Aborted => "ABORTED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, MissionStatus::Completed | MissionStatus::Aborted)
    }
}

impl std::fmt::Display for MissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single mission objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionObjective {
    pub id: ObjectiveId,
    pub name: String,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub required_capabilities: Vec<String>,
    /// Estimated duration in minutes
    #[serde(default)]
    pub estimated_duration: u32,
}

impl MissionObjective {
    pub fn new(id: impl Into<ObjectiveId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            priority: TaskPriority::default(),
            required_capabilities: Vec::new(),
            estimated_duration: 0,
        }
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_capabilities = capabilities.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.estimated_duration = minutes;
        self
    }
}

/// A mission and the agents assigned to it.
///
/// Every status transition bumps `generation`, which lets late failure
/// signals and plans detect that the mission moved on without them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub id: MissionId,
    pub title: String,
    pub status: MissionStatus,
    pub primary_objectives: Vec<MissionObjective>,
    pub backup_objectives: Vec<MissionObjective>,
    pub assigned_agents: Vec<AgentId>,
    pub formation: FormationConfig,
    pub generation: u64,
    pub updated_at: DateTime<Utc>,
}

impl Mission {
    pub fn new(id: impl Into<MissionId>, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status: MissionStatus::Planned,
            primary_objectives: Vec::new(),
            backup_objectives: Vec::new(),
            assigned_agents: Vec::new(),
            formation: FormationConfig::default(),
            generation: 0,
            updated_at: now,
        }
    }

    pub fn with_status(mut self, status: MissionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_objective(mut self, objective: MissionObjective) -> Self {
        self.primary_objectives.push(objective);
        self
    }

    pub fn with_backup_objective(mut self, objective: MissionObjective) -> Self {
        self.backup_objectives.push(objective);
        self
    }

    pub fn with_agents<I, S>(mut self, agents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<AgentId>,
    {
        self.assigned_agents = agents.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_formation(mut self, formation: FormationConfig) -> Self {
        self.formation = formation;
        self
    }

    // ==================== Queries ====================

    pub fn is_active(&self) -> bool {
        self.status == MissionStatus::Active
    }

    pub fn has_agent(&self, agent: &AgentId) -> bool {
        self.assigned_agents.contains(agent)
    }

    // ==================== Transitions ====================

    /// Move to `status`, bumping the generation when the status changes.
    ///
    /// Returns `true` if a transition happened.
    pub fn transition(&mut self, status: MissionStatus, now: DateTime<Utc>) -> bool {
        if self.status == status {
            return false;
        }
        self.status = status;
        self.generation += 1;
        self.updated_at = now;
        true
    }

    pub fn remove_agent(&mut self, agent: &AgentId) -> bool {
        let before = self.assigned_agents.len();
        self.assigned_agents.retain(|a| a != agent);
        before != self.assigned_agents.len()
    }

    pub fn add_agent(&mut self, agent: AgentId) -> bool {
        if self.has_agent(&agent) {
            return false;
        }
        self.assigned_agents.push(agent);
        true
    }
}
