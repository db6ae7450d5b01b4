//! Inputs to a coordination request: the task and the mission it serves.
//!
//! Every field has a default, so partially specified contexts (for example
//! from a scenario file) deserialize into a usable request.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Default confidence when an agent does not state one.
pub const DEFAULT_CONFIDENCE: f64 = 0.8;

/// What one agent intends to do within a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentTaskSpec {
    pub objective: String,
    pub constraints: HashMap<String, Value>,
    pub metrics: HashMap<String, f64>,
    pub resources: HashMap<String, f64>,
    pub confidence: f64,
    pub role: Option<String>,
}

impl Default for AgentTaskSpec {
    fn default() -> Self {
        Self {
            objective: String::new(),
            constraints: HashMap::new(),
            metrics: HashMap::new(),
            resources: HashMap::new(),
            confidence: DEFAULT_CONFIDENCE,
            role: None,
        }
    }
}

impl AgentTaskSpec {
    pub fn new(objective: impl Into<String>) -> Self {
        Self {
            objective: objective.into(),
            ..Self::default()
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_resource(mut self, name: impl Into<String>, requirement: f64) -> Self {
        self.resources.insert(name.into(), requirement);
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// Expected task difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskComplexity {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskComplexity {
    pub fn as_str(&self) -> &str {
        match self {
            TaskComplexity::Low => "low",
            TaskComplexity::Medium => "medium",
            TaskComplexity::High => "high",
        }
    }
}

/// Task-level request for a pair of agents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskContext {
    pub agent_a: AgentTaskSpec,
    pub agent_b: AgentTaskSpec,
    pub shared_objective: String,
    pub comm_protocol: Option<String>,
    pub conflict_resolution: Option<String>,
    pub shared_success_criteria: HashMap<String, f64>,
    pub complexity: TaskComplexity,
}

impl TaskContext {
    pub fn new(shared_objective: impl Into<String>) -> Self {
        Self {
            shared_objective: shared_objective.into(),
            ..Self::default()
        }
    }

    pub fn with_agents(mut self, agent_a: AgentTaskSpec, agent_b: AgentTaskSpec) -> Self {
        self.agent_a = agent_a;
        self.agent_b = agent_b;
        self
    }

    pub fn with_complexity(mut self, complexity: TaskComplexity) -> Self {
        self.complexity = complexity;
        self
    }

    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.comm_protocol = Some(protocol.into());
        self
    }
}

/// Mission criticality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Criticality {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Criticality {
    pub fn as_str(&self) -> &str {
        match self {
            Criticality::Low => "low",
            Criticality::Medium => "medium",
            Criticality::High => "high",
            Criticality::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Criticality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Mission-level context a coordination must align with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionContext {
    pub mission_id: String,
    pub mission_objective: String,
    pub value_hierarchy: Vec<String>,
    pub constraints: HashMap<String, Value>,
    pub success_definition: String,
    pub criticality: Criticality,
}

impl Default for MissionContext {
    fn default() -> Self {
        Self {
            mission_id: "default_mission".to_string(),
            mission_objective: String::new(),
            value_hierarchy: vec!["efficiency".to_string(), "reliability".to_string()],
            constraints: HashMap::new(),
            success_definition: String::new(),
            criticality: Criticality::Medium,
        }
    }
}

impl MissionContext {
    pub fn new(mission_objective: impl Into<String>) -> Self {
        Self {
            mission_objective: mission_objective.into(),
            ..Self::default()
        }
    }

    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.value_hierarchy = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_constraint(mut self, name: impl Into<String>, value: Value) -> Self {
        self.constraints.insert(name.into(), value);
        self
    }

    pub fn with_criticality(mut self, criticality: Criticality) -> Self {
        self.criticality = criticality;
        self
    }
}
