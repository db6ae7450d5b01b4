//! Agent entity and its operational status.

use super::value_objects::{AgentId, CapabilitySet, Position, ResourceLimits};
use crate::mission::value_objects::ObjectiveId;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Operational status of an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentStatus {
    #[default]
    Operational,
    CommFailure,
    Damaged,
    Offline,
    Maintenance,
}

impl AgentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            AgentStatus::Operational => "OPERATIONAL",
            AgentStatus::CommFailure => "COMM_FAILURE",
            AgentStatus::Damaged => "DAMAGED",
            AgentStatus::Offline => "OFFLINE",
            AgentStatus::Maintenance => "MAINTENANCE",
        }
    }

    pub fn is_operational(&self) -> bool {
        matches!(self, AgentStatus::Operational)
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A coordinated agent (drone, satellite, service).
///
/// `resource_level` is the remaining fuel/battery as a fraction in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub platform: String,
    pub capabilities: CapabilitySet,
    pub status: AgentStatus,
    pub resource_limits: ResourceLimits,
    pub resource_level: f64,
    pub position: Position,
    pub last_contact: DateTime<Utc>,
    pub assigned_objectives: Vec<ObjectiveId>,
}

impl Agent {
    /// Create an operational agent with full resources and contact at `now`.
    pub fn new(id: impl Into<AgentId>, platform: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            platform: platform.into(),
            capabilities: CapabilitySet::default(),
            status: AgentStatus::Operational,
            resource_limits: ResourceLimits::default(),
            resource_level: 1.0,
            position: Position::default(),
            last_contact: now,
            assigned_objectives: Vec::new(),
        }
    }

    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities = CapabilitySet::new(capabilities);
        self
    }

    pub fn with_resource_limit(mut self, name: impl Into<String>, value: f64) -> Self {
        self.resource_limits = self.resource_limits.with_limit(name, value);
        self
    }

    pub fn with_resource_level(mut self, level: f64) -> Self {
        self.resource_level = level;
        self
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn with_status(mut self, status: AgentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_last_contact(mut self, at: DateTime<Utc>) -> Self {
        self.last_contact = at;
        self
    }

    pub fn with_objectives<I, S>(mut self, objectives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ObjectiveId>,
    {
        self.assigned_objectives = objectives.into_iter().map(Into::into).collect();
        self
    }

    // ==================== Queries ====================

    pub fn is_operational(&self) -> bool {
        self.status.is_operational()
    }

    pub fn time_since_contact(&self, now: DateTime<Utc>) -> Duration {
        now - self.last_contact
    }

    /// Whether the last contact is strictly older than `timeout`.
    pub fn has_lost_contact(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        self.time_since_contact(now) > timeout
    }

    pub fn is_assigned(&self, objective: &ObjectiveId) -> bool {
        self.assigned_objectives.contains(objective)
    }

    // ==================== Mutations ====================

    /// Add objectives not already assigned, keeping existing order.
    pub fn extend_objectives<'a>(&mut self, objectives: impl IntoIterator<Item = &'a ObjectiveId>) {
        for objective in objectives {
            if !self.is_assigned(objective) {
                self.assigned_objectives.push(objective.clone());
            }
        }
    }
}
