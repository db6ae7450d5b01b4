//! Layer 3: the mission-wide intent every partnership must serve.

use super::co_intent::CoIntent;
use super::context::{Criticality, MissionContext};
use crate::core::string::contains_ignore_case;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Minimum `time_limit` (seconds) an urgent objective may carry.
pub const MIN_URGENT_TIME_LIMIT: f64 = 300.0;

/// Value assumed at the top of an empty hierarchy.
const FALLBACK_PRIMARY_VALUE: &str = "efficiency";

/// Why a co-intent does not align with the mission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentViolation {
    SharedObjectiveMisaligned,
    TimeConstraintViolation,
    ValueHierarchyConflict,
}

impl AlignmentViolation {
    pub fn as_str(&self) -> &str {
        match self {
            AlignmentViolation::SharedObjectiveMisaligned => "shared_objective_misaligned",
            AlignmentViolation::TimeConstraintViolation => "time_constraint_violation",
            AlignmentViolation::ValueHierarchyConflict => "value_hierarchy_conflict",
        }
    }
}

impl std::fmt::Display for AlignmentViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreIntent {
    pub mission_id: String,
    pub mission_objective: String,
    pub value_hierarchy: Vec<String>,
    pub constraint_boundaries: HashMap<String, Value>,
    pub success_definition: String,
    pub criticality_level: Criticality,
}

impl CoreIntent {
    pub fn from_mission(mission: &MissionContext) -> Self {
        Self {
            mission_id: mission.mission_id.clone(),
            mission_objective: mission.mission_objective.clone(),
            value_hierarchy: mission.value_hierarchy.clone(),
            constraint_boundaries: mission.constraints.clone(),
            success_definition: mission.success_definition.clone(),
            criticality_level: mission.criticality,
        }
    }

    pub fn primary_value(&self) -> &str {
        self.value_hierarchy
            .first()
            .map(String::as_str)
            .unwrap_or(FALLBACK_PRIMARY_VALUE)
    }

    /// Check the co-intent against the mission. Checks run in a fixed
    /// order and the first violation wins.
    pub fn validate_alignment(&self, co_intent: &CoIntent) -> Result<(), AlignmentViolation> {
        let shared = co_intent.shared_objective.as_str();

        if !contains_ignore_case(shared, &self.mission_objective) {
            return Err(AlignmentViolation::SharedObjectiveMisaligned);
        }

        if let Some(limit) = self.time_limit()
            && limit < MIN_URGENT_TIME_LIMIT
            && shared.contains("urgent")
        {
            return Err(AlignmentViolation::TimeConstraintViolation);
        }

        if self.primary_value() == "reliability" && shared.contains("fast") {
            return Err(AlignmentViolation::ValueHierarchyConflict);
        }

        Ok(())
    }

    fn time_limit(&self) -> Option<f64> {
        self.constraint_boundaries
            .get("time_limit")
            .and_then(Value::as_f64)
    }
}
