//! Intent nodes: the units of the intent hierarchy.

use crate::agent::value_objects::AgentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Unique identifier for an intent node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntentId(String);

impl IntentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for IntentId {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for IntentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Level of an intent in the hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentType {
    /// High-level mission goals
    Strategic,
    /// Mid-level operational objectives
    Tactical,
    /// Specific executable actions
    Operational,
    /// Backup and failure-handling intents
    Contingency,
}

impl IntentType {
    pub const ALL: [IntentType; 4] = [
        IntentType::Strategic,
        IntentType::Tactical,
        IntentType::Operational,
        IntentType::Contingency,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            IntentType::Strategic => "STRATEGIC",
            IntentType::Tactical => "TACTICAL",
            IntentType::Operational => "OPERATIONAL",
            IntentType::Contingency => "CONTINGENCY",
        }
    }
}

impl std::fmt::Display for IntentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentStatus {
    #[default]
    Active,
    Suspended,
    Completed,
    Failed,
    Adapting,
}

impl IntentStatus {
    pub const ALL: [IntentStatus; 5] = [
        IntentStatus::Active,
        IntentStatus::Suspended,
        IntentStatus::Completed,
        IntentStatus::Failed,
        IntentStatus::Adapting,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            IntentStatus::Active => "ACTIVE",
            IntentStatus::Suspended => "SUSPENDED",
            IntentStatus::Completed => "COMPLETED",
            IntentStatus::Failed => "FAILED",
            IntentStatus::Adapting => "ADAPTING",
        }
    }
}

impl std::fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentNode {
    pub id: IntentId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub intent_type: IntentType,
    #[serde(default)]
    pub status: IntentStatus,
    pub priority: f64,
    #[serde(default)]
    pub parent_id: Option<IntentId>,
    #[serde(default)]
    pub children_ids: Vec<IntentId>,
    /// Why this intent exists
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub success_criteria: HashMap<String, Value>,
    #[serde(default)]
    pub failure_conditions: Vec<String>,
    #[serde(default)]
    pub required_capabilities: Vec<String>,
    #[serde(default)]
    pub assigned_assets: Vec<AgentId>,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

const DEFAULT_PRIORITY: f64 = 0.5;

/// Clamp into `[0, 1]`; NaN falls back to the default.
pub(crate) fn normalize_priority(priority: f64) -> f64 {
    if priority.is_nan() {
        DEFAULT_PRIORITY
    } else {
        priority.clamp(0.0, 1.0)
    }
}

impl IntentNode {
    pub fn new(id: impl Into<IntentId>, name: impl Into<String>, intent_type: IntentType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            intent_type,
            status: IntentStatus::Active,
            priority: DEFAULT_PRIORITY,
            parent_id: None,
            children_ids: Vec::new(),
            purpose: String::new(),
            success_criteria: HashMap::new(),
            failure_conditions: Vec::new(),
            required_capabilities: Vec::new(),
            assigned_assets: Vec::new(),
            deadline: None,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<IntentId>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }

    /// Priority is clamped into `[0, 1]`.
    pub fn with_priority(mut self, priority: f64) -> Self {
        self.priority = normalize_priority(priority);
        self
    }

    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = purpose.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
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

    pub fn with_assets<I, S>(mut self, assets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<AgentId>,
    {
        self.assigned_assets = assets.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_status(mut self, status: IntentStatus) -> Self {
        self.status = status;
        self
    }

    // ==================== Queries ====================

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn uses_any_asset(&self, assets: &[AgentId]) -> bool {
        assets.iter().any(|asset| self.assigned_assets.contains(asset))
    }

    pub fn shares_capability_with(&self, other: &IntentNode) -> bool {
        self.required_capabilities
            .iter()
            .any(|cap| other.required_capabilities.contains(cap))
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.deadline.is_some_and(|deadline| now > deadline)
    }

    /// Effectiveness in `[0, 1]` given the current status, staffing and
    /// priority.
    pub fn effectiveness(&self) -> f64 {
        let mut score = match self.status {
            IntentStatus::Failed => return 0.0,
            IntentStatus::Suspended => 0.3,
            IntentStatus::Adapting => 0.7,
            IntentStatus::Active | IntentStatus::Completed => 1.0,
        };
        if self.assigned_assets.is_empty() && self.intent_type != IntentType::Contingency {
            score *= 0.5;
        }
        (score * self.priority).min(1.0)
    }
}
