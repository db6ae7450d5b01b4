//! Mission impact of losing an agent.

use crate::agent::entities::Agent;
use crate::mission::entities::Mission;
use crate::mission::value_objects::ObjectiveId;
use serde::{Deserialize, Serialize};

/// Delay added per affected objective, in minutes.
pub const DELAY_PER_OBJECTIVE_MINUTES: u32 = 15;
/// Success-probability reduction per affected critical objective.
pub const CRITICAL_OBJECTIVE_REDUCTION: f64 = 0.25;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MissionImpact {
    pub affected_objectives: Vec<ObjectiveId>,
    /// Capabilities of the lost agent that critical objectives depend on
    pub critical_capabilities_lost: Vec<String>,
    pub mission_delay_minutes: u32,
    /// Unbounded sum; see [`MissionImpact::clamped_reduction`]
    pub success_probability_reduction: f64,
}

impl MissionImpact {
    pub fn clamped_reduction(&self) -> f64 {
        self.success_probability_reduction.clamp(0.0, 1.0)
    }

    pub fn is_empty(&self) -> bool {
        self.affected_objectives.is_empty()
    }
}

/// Sum the impact of `agent` over every mission whose roster contains it.
///
/// An objective is affected when its required capabilities intersect the
/// agent's capabilities.
pub fn calculate_mission_impact<'a>(
    agent: &Agent,
    missions: impl IntoIterator<Item = &'a Mission>,
) -> MissionImpact {
    let mut impact = MissionImpact::default();

    for mission in missions.into_iter().filter(|m| m.has_agent(&agent.id)) {
        for objective in &mission.primary_objectives {
            let matched: Vec<&str> = agent
                .capabilities
                .matching(&objective.required_capabilities)
                .collect();
            if matched.is_empty() {
                continue;
            }

            impact.affected_objectives.push(objective.id.clone());
            impact.mission_delay_minutes += DELAY_PER_OBJECTIVE_MINUTES;

            if objective.priority.is_critical() {
                impact.success_probability_reduction += CRITICAL_OBJECTIVE_REDUCTION;
                for capability in matched {
                    if !impact.critical_capabilities_lost.iter().any(|c| c == capability) {
                        impact.critical_capabilities_lost.push(capability.to_string());
                    }
                }
            }
        }
    }

    impact
}
