//! Layer 4: partnership efficiency ("energy") between two agents.
//!
//! ```text
//! energy = 0.30 * comm_synergy
//!        + 0.25 * capability_synergy
//!        + 0.25 * resource_balance
//!        + 0.20 * task_compatibility
//! ```

use super::context::TaskComplexity;
use crate::agent::entities::Agent;
use crate::agent::value_objects::AgentId;
use serde::{Deserialize, Serialize};

/// Below this the partnership should be dissolved.
pub const DISSOLUTION_THRESHOLD: f64 = 0.3;
/// Below this the partnership works but should be optimized.
pub const OPTIMIZATION_THRESHOLD: f64 = 0.5;
/// Conflicts tolerated before dissolution.
pub const MAX_CONFLICTS: u32 = 5;

const COMM_WEIGHT: f64 = 0.30;
const CAPABILITY_WEIGHT: f64 = 0.25;
const RESOURCE_WEIGHT: f64 = 0.25;
const TASK_WEIGHT: f64 = 0.20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollabIntent {
    pub partnership_id: String,
    pub agent_a_id: AgentId,
    pub agent_b_id: AgentId,
    pub partnership_efficiency: f64,
    pub optimization_method: String,
    pub adaptation_triggers: Vec<String>,
    pub dissolution_threshold: f64,
    pub max_conflicts: u32,
}

impl CollabIntent {
    pub fn new(agent_a: &AgentId, agent_b: &AgentId, coordination_id: &str) -> Self {
        let short_id: String = coordination_id.chars().take(8).collect();
        Self {
            partnership_id: format!("{agent_a}_{agent_b}_{short_id}"),
            agent_a_id: agent_a.clone(),
            agent_b_id: agent_b.clone(),
            partnership_efficiency: 0.0,
            optimization_method: "energy_based".to_string(),
            adaptation_triggers: vec!["efficiency_drop".to_string(), "conflict_detected".to_string()],
            dissolution_threshold: DISSOLUTION_THRESHOLD,
            max_conflicts: MAX_CONFLICTS,
        }
    }

    /// Score the partnership and store it as the partnership efficiency.
    ///
    /// The result is clamped into `[0, 1]`. Out-of-range resource limits can
    /// push the raw product outside that range; a non-finite input yields a
    /// non-finite score, which callers treat as a fault.
    pub fn calculate_energy_score(
        &mut self,
        agent_a: &Agent,
        agent_b: &Agent,
        complexity: TaskComplexity,
    ) -> f64 {
        let raw = COMM_WEIGHT * comm_synergy(agent_a, agent_b)
            + CAPABILITY_WEIGHT * capability_synergy(agent_a, agent_b)
            + RESOURCE_WEIGHT * resource_balance(agent_a, agent_b)
            + TASK_WEIGHT * task_compatibility(complexity);

        let score = if raw.is_finite() { raw.clamp(0.0, 1.0) } else { raw };
        self.partnership_efficiency = score;
        score
    }

    pub fn needs_optimization(&self) -> bool {
        self.partnership_efficiency < OPTIMIZATION_THRESHOLD
    }

    pub fn should_dissolve(&self) -> bool {
        self.partnership_efficiency < self.dissolution_threshold
    }
}

fn comm_synergy(a: &Agent, b: &Agent) -> f64 {
    if a.platform == b.platform { 0.8 } else { 0.6 }
}

/// Complementary capabilities score high; heavy overlap scores low.
fn capability_synergy(a: &Agent, b: &Agent) -> f64 {
    let distinct = a.capabilities.distinct_count(&b.capabilities) as f64;
    let shared = a.capabilities.shared_count(&b.capabilities).max(1) as f64;
    (distinct / shared).min(1.0)
}

/// Product over resources named by both agents of `1 - |a - b|`.
fn resource_balance(a: &Agent, b: &Agent) -> f64 {
    a.resource_limits
        .shared_with(&b.resource_limits)
        .map(|(_, left, right)| 1.0 - (left - right).abs())
        .product()
}

fn task_compatibility(complexity: TaskComplexity) -> f64 {
    match complexity {
        TaskComplexity::High => 0.9,
        _ => 0.8,
    }
}
