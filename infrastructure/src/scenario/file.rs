//! Raw TOML scenario data types

use chrono::{DateTime, Duration, Utc};
use pact_domain::{
    Agent, AgentId, AgentStatus, FormationConfig, IntentId, IntentNode, IntentStatus, IntentType,
    Mission, MissionContext, MissionObjective, MissionStatus, Position, TaskContext,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAgent {
    pub id: AgentId,
    pub platform: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub status: AgentStatus,
    #[serde(default)]
    pub resource_limits: HashMap<String, f64>,
    #[serde(default = "full")]
    pub resource_level: f64,
    #[serde(default)]
    pub position: Position,
    /// Seconds since the agent was last heard from
    #[serde(default)]
    pub silent_secs: i64,
    #[serde(default)]
    pub objectives: Vec<String>,
}

fn full() -> f64 {
    1.0
}

impl ScenarioAgent {
    pub fn to_agent(&self, now: DateTime<Utc>) -> Agent {
        let mut agent = Agent::new(self.id.clone(), self.platform.clone(), now)
            .with_capabilities(self.capabilities.iter().cloned())
            .with_status(self.status)
            .with_resource_level(self.resource_level)
            .with_position(self.position)
            .with_last_contact(now - Duration::seconds(self.silent_secs))
            .with_objectives(self.objectives.iter().cloned());
        let mut limits: Vec<_> = self.resource_limits.iter().collect();
        limits.sort_by(|a, b| a.0.cmp(b.0));
        for (name, value) in limits {
            agent = agent.with_resource_limit(name.clone(), *value);
        }
        agent
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioMission {
    pub id: String,
    pub title: String,
    #[serde(default = "active")]
    pub status: MissionStatus,
    #[serde(default)]
    pub agents: Vec<String>,
    #[serde(default)]
    pub objectives: Vec<MissionObjective>,
    #[serde(default)]
    pub backup_objectives: Vec<MissionObjective>,
    #[serde(default)]
    pub formation: FormationConfig,
}

fn active() -> MissionStatus {
    MissionStatus::Active
}

impl ScenarioMission {
    pub fn to_mission(&self, now: DateTime<Utc>) -> Mission {
        let mut mission = Mission::new(self.id.clone(), self.title.clone(), now)
            .with_status(self.status)
            .with_agents(self.agents.iter().cloned())
            .with_formation(self.formation.clone());
        for objective in &self.objectives {
            mission = mission.with_objective(objective.clone());
        }
        for objective in &self.backup_objectives {
            mission = mission.with_backup_objective(objective.clone());
        }
        mission
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioIntent {
    pub id: IntentId,
    pub name: String,
    #[serde(rename = "type")]
    pub intent_type: IntentType,
    #[serde(default)]
    pub parent: Option<IntentId>,
    #[serde(default)]
    pub status: IntentStatus,
    #[serde(default = "half")]
    pub priority: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub required_capabilities: Vec<String>,
    #[serde(default)]
    pub assets: Vec<String>,
    /// Deadline relative to load time; negative means already overdue
    #[serde(default)]
    pub deadline_minutes: Option<i64>,
}

fn half() -> f64 {
    0.5
}

impl ScenarioIntent {
    pub fn to_node(&self, now: DateTime<Utc>) -> IntentNode {
        let mut node = IntentNode::new(self.id.clone(), self.name.clone(), self.intent_type)
            .with_status(self.status)
            .with_priority(self.priority)
            .with_description(self.description.clone())
            .with_purpose(self.purpose.clone())
            .with_capabilities(self.required_capabilities.iter().cloned())
            .with_assets(self.assets.iter().cloned());
        if let Some(parent) = &self.parent {
            node = node.with_parent(parent.clone());
        }
        if let Some(minutes) = self.deadline_minutes {
            node = node.with_deadline(now + Duration::minutes(minutes));
        }
        node
    }
}

/// A named, ready-to-run coordination request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioCoordination {
    pub agent_a: AgentId,
    pub agent_b: AgentId,
    #[serde(default)]
    pub task: TaskContext,
    #[serde(default)]
    pub mission: MissionContext,
}

/// Complete scenario file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioFile {
    pub agents: Vec<ScenarioAgent>,
    pub missions: Vec<ScenarioMission>,
    /// Listed parents before children
    pub intents: Vec<ScenarioIntent>,
    pub coordinations: BTreeMap<String, ScenarioCoordination>,
}
