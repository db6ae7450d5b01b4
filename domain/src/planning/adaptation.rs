//! Hierarchy adaptation plans: how the intent tree reorganizes after assets
//! are lost.

use crate::agent::value_objects::AgentId;
use crate::hierarchy::node::{IntentId, IntentStatus, IntentType};
use crate::hierarchy::tree::IntentHierarchy;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// More touched intents than this triggers a hierarchical rebalance.
pub const REBALANCE_THRESHOLD: usize = 3;
/// Alternatives assigned per touched intent.
pub const MAX_ASSIGNED_ALTERNATIVES: usize = 2;

const MAX_SUCCESS_PROBABILITY: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdaptationStrategy {
    MissionRestructure,
    HierarchicalRebalance,
    TacticalReassignment,
}

impl AdaptationStrategy {
    pub fn as_str(&self) -> &str {
        match self {
            AdaptationStrategy::MissionRestructure => "MISSION_RESTRUCTURE",
            AdaptationStrategy::HierarchicalRebalance => "HIERARCHICAL_REBALANCE",
            AdaptationStrategy::TacticalReassignment => "TACTICAL_REASSIGNMENT",
        }
    }
}

impl std::fmt::Display for AdaptationStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Moderate => "MODERATE",
            RiskLevel::High => "HIGH",
        }
    }

    fn from_degradation(degradation: f64) -> Self {
        if degradation > 0.5 {
            RiskLevel::High
        } else if degradation > 0.2 {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptationImpact {
    pub mission_delay_minutes: u32,
    pub capability_degradation: f64,
    pub resource_utilization_change: f64,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdaptationAction {
    SuspendAffectedIntents,
    AnalyzeIntentDependencies,
    ReassignIntentResponsibilities,
    ValidateIntentHierarchy,
    ResumeMissionExecution,
}

impl AdaptationAction {
    pub fn as_str(&self) -> &str {
        match self {
            AdaptationAction::SuspendAffectedIntents => "SUSPEND_AFFECTED_INTENTS",
            AdaptationAction::AnalyzeIntentDependencies => "ANALYZE_INTENT_DEPENDENCIES",
            AdaptationAction::ReassignIntentResponsibilities => "REASSIGN_INTENT_RESPONSIBILITIES",
            AdaptationAction::ValidateIntentHierarchy => "VALIDATE_INTENT_HIERARCHY",
            AdaptationAction::ResumeMissionExecution => "RESUME_MISSION_EXECUTION",
        }
    }
}

impl std::fmt::Display for AdaptationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptationStep {
    pub step: u8,
    pub action: AdaptationAction,
    pub description: String,
    pub estimated_duration_secs: u32,
}

/// Touched intent and the alternatives chosen to carry its responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentAssignment {
    pub intent_id: IntentId,
    pub alternatives: Vec<IntentId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptationPlan {
    pub trigger_event: String,
    pub affected_intent_ids: Vec<IntentId>,
    pub adaptation_strategy: AdaptationStrategy,
    pub new_intent_assignments: Vec<IntentAssignment>,
    pub success_probability: f64,
    pub estimated_impact: AdaptationImpact,
    pub execution_steps: Vec<AdaptationStep>,
    pub generated_at: DateTime<Utc>,
}

impl AdaptationPlan {
    pub fn total_duration_secs(&self) -> u32 {
        self.execution_steps
            .iter()
            .map(|s| s.estimated_duration_secs)
            .sum()
    }

    pub fn touches(&self, intent: &IntentId) -> bool {
        self.affected_intent_ids.contains(intent)
            || self
                .new_intent_assignments
                .iter()
                .any(|a| &a.intent_id == intent || a.alternatives.contains(intent))
    }
}

/// Trigger name used for an intent-level communication failure.
pub fn communication_failure_trigger(agent: &AgentId) -> String {
    format!("COMMUNICATION_FAILURE:{agent}")
}

/// Fail every intent staffed by `affected_assets`, then plan how the
/// hierarchy absorbs the loss.
pub fn generate_adaptation_plan(
    hierarchy: &mut IntentHierarchy,
    trigger_event: impl Into<String>,
    affected_assets: &[AgentId],
    now: DateTime<Utc>,
) -> AdaptationPlan {
    let mut affected: Vec<IntentId> = Vec::new();
    let mut seen: HashSet<IntentId> = HashSet::new();
    for intent in hierarchy.nodes_using_assets(affected_assets) {
        let touched = hierarchy.propagate_failure(&intent).unwrap_or_default();
        for id in touched {
            if seen.insert(id.clone()) {
                affected.push(id);
            }
        }
    }

    let strategy = determine_strategy(hierarchy, &affected);
    let assignments = assign_alternatives(hierarchy, &affected);
    let success_probability = success_probability(hierarchy, &assignments);
    let impact = estimate_impact(hierarchy, &affected);

    AdaptationPlan {
        trigger_event: trigger_event.into(),
        affected_intent_ids: affected,
        adaptation_strategy: strategy,
        new_intent_assignments: assignments,
        success_probability,
        estimated_impact: impact,
        execution_steps: execution_script(strategy),
        generated_at: now,
    }
}

fn determine_strategy(hierarchy: &IntentHierarchy, affected: &[IntentId]) -> AdaptationStrategy {
    let strategic = affected
        .iter()
        .filter_map(|id| hierarchy.get(id))
        .any(|node| node.intent_type == IntentType::Strategic);

    if strategic {
        AdaptationStrategy::MissionRestructure
    } else if affected.len() > REBALANCE_THRESHOLD {
        AdaptationStrategy::HierarchicalRebalance
    } else {
        AdaptationStrategy::TacticalReassignment
    }
}

fn assign_alternatives(hierarchy: &IntentHierarchy, affected: &[IntentId]) -> Vec<IntentAssignment> {
    affected
        .iter()
        .filter(|id| {
            hierarchy
                .get(id)
                .is_some_and(|node| node.status != IntentStatus::Failed)
        })
        .map(|id| {
            let mut alternatives = hierarchy.find_alternative_intents(id).unwrap_or_default();
            alternatives.truncate(MAX_ASSIGNED_ALTERNATIVES);
            IntentAssignment {
                intent_id: id.clone(),
                alternatives,
            }
        })
        .collect()
}

fn success_probability(hierarchy: &IntentHierarchy, assignments: &[IntentAssignment]) -> f64 {
    if assignments.is_empty() {
        return 0.0;
    }
    let total = assignments.len() as f64;
    let assigned = assignments
        .iter()
        .filter(|a| !a.alternatives.is_empty())
        .count() as f64;
    let priority_sum: f64 = assignments
        .iter()
        .filter_map(|a| hierarchy.get(&a.intent_id))
        .map(|node| node.priority)
        .sum();

    ((assigned / total) * 0.7 + (priority_sum / total) * 0.3).min(MAX_SUCCESS_PROBABILITY)
}

fn estimate_impact(hierarchy: &IntentHierarchy, affected: &[IntentId]) -> AdaptationImpact {
    let mut delay = 0;
    let mut degradation = 0.0;
    for node in affected.iter().filter_map(|id| hierarchy.get(id)) {
        let (minutes, loss) = match node.intent_type {
            IntentType::Strategic => (30, 0.20),
            IntentType::Tactical => (15, 0.10),
            IntentType::Operational | IntentType::Contingency => (5, 0.05),
        };
        delay += minutes;
        degradation += loss;
    }

    AdaptationImpact {
        mission_delay_minutes: delay,
        capability_degradation: degradation,
        resource_utilization_change: 0.0,
        risk_level: RiskLevel::from_degradation(degradation),
    }
}

fn execution_script(strategy: AdaptationStrategy) -> Vec<AdaptationStep> {
    let steps = [
        (
            AdaptationAction::SuspendAffectedIntents,
            "Temporarily suspend affected intents to prevent conflicts".to_string(),
            30,
        ),
        (
            AdaptationAction::AnalyzeIntentDependencies,
            "Analyze intent hierarchy dependencies for safe reassignment".to_string(),
            60,
        ),
        (
            AdaptationAction::ReassignIntentResponsibilities,
            format!("Execute {strategy} to redistribute intent responsibilities"),
            120,
        ),
        (
            AdaptationAction::ValidateIntentHierarchy,
            "Validate that intent hierarchy remains consistent".to_string(),
            45,
        ),
        (
            AdaptationAction::ResumeMissionExecution,
            "Resume mission execution with adapted intent assignments".to_string(),
            30,
        ),
    ];

    steps
        .into_iter()
        .enumerate()
        .map(|(i, (action, description, secs))| AdaptationStep {
            step: i as u8 + 1,
            action,
            description,
            estimated_duration_secs: secs,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::node::IntentNode;

    fn id(s: &str) -> IntentId {
        IntentId::new(s)
    }

    /// S1 (D0)
    /// ├── T1 (D1, imaging)
    /// │   └── O1
    /// └── T2 (D2, imaging)
    fn hierarchy() -> IntentHierarchy {
        let mut h = IntentHierarchy::new();
        h.add_node(
            IntentNode::new("S1", "Secure area", IntentType::Strategic)
                .with_priority(0.9)
                .with_assets(["D0"]),
        )
        .unwrap();
        h.add_node(
            IntentNode::new("T1", "North recon", IntentType::Tactical)
                .with_parent("S1")
                .with_priority(0.8)
                .with_purpose("survey northern grid sector")
                .with_capabilities(["imaging"])
                .with_assets(["D1"]),
        )
        .unwrap();
        h.add_node(
            IntentNode::new("O1", "Photo pass", IntentType::Operational)
                .with_parent("T1")
                .with_priority(0.6),
        )
        .unwrap();
        h.add_node(
            IntentNode::new("T2", "South recon", IntentType::Tactical)
                .with_parent("S1")
                .with_priority(0.7)
                .with_purpose("survey southern grid area")
                .with_capabilities(["imaging"])
                .with_assets(["D2"]),
        )
        .unwrap();
        h
    }

    #[test]
    fn test_tactical_failure_plan() {
        let mut h = hierarchy();
        let plan = generate_adaptation_plan(
            &mut h,
            communication_failure_trigger(&AgentId::new("D1")),
            &[AgentId::new("D1")],
            Utc::now(),
        );

        assert_eq!(plan.trigger_event, "COMMUNICATION_FAILURE:D1");
        assert_eq!(plan.affected_intent_ids, vec![id("T1"), id("O1"), id("S1")]);
        // S1 is strategic and was touched as T1's parent
        assert_eq!(plan.adaptation_strategy, AdaptationStrategy::MissionRestructure);

        // T1 failed and gets no assignment; O1 and S1 remain viable
        let ids: Vec<&str> = plan
            .new_intent_assignments
            .iter()
            .map(|a| a.intent_id.as_str())
            .collect();
        assert_eq!(ids, vec!["O1", "S1"]);
        assert!(plan.new_intent_assignments.iter().all(|a| a.alternatives.is_empty()));
        // 0.7 * 0 + 0.3 * (0.6 + 0.9) / 2
        assert!((plan.success_probability - 0.225).abs() < 1e-9);

        // 15 + 5 + 30 minutes; 0.10 + 0.05 + 0.20
        assert_eq!(plan.estimated_impact.mission_delay_minutes, 50);
        assert!((plan.estimated_impact.capability_degradation - 0.35).abs() < 1e-9);
        assert_eq!(plan.estimated_impact.risk_level, RiskLevel::Moderate);
    }

    #[test]
    fn test_strategic_failure_mission_restructure() {
        let mut h = hierarchy();
        let plan = generate_adaptation_plan(&mut h, "LOSS", &[AgentId::new("D0")], Utc::now());

        assert_eq!(plan.adaptation_strategy, AdaptationStrategy::MissionRestructure);
        assert_eq!(
            plan.affected_intent_ids,
            vec![id("S1"), id("T1"), id("O1"), id("T2")]
        );
        assert_eq!(h.get(&id("S1")).unwrap().status, IntentStatus::Failed);
        assert_eq!(h.get(&id("T2")).unwrap().status, IntentStatus::Suspended);
    }

    #[test]
    fn test_rebalance_without_strategic() {
        let mut h = IntentHierarchy::new();
        h.add_node(IntentNode::new("T1", "Sector", IntentType::Tactical).with_assets(["D1"]))
            .unwrap();
        for n in 1..=3 {
            h.add_node(
                IntentNode::new(format!("O{n}"), "step", IntentType::Operational).with_parent("T1"),
            )
            .unwrap();
        }
        let plan = generate_adaptation_plan(&mut h, "LOSS", &[AgentId::new("D1")], Utc::now());
        assert_eq!(plan.affected_intent_ids.len(), 4);
        assert_eq!(plan.adaptation_strategy, AdaptationStrategy::HierarchicalRebalance);
    }

    #[test]
    fn test_alternatives_raise_success_probability() {
        let mut h = IntentHierarchy::new();
        h.add_node(IntentNode::new("T1", "North sector", IntentType::Tactical).with_assets(["D1"]))
            .unwrap();
        h.add_node(
            IntentNode::new("O1", "Photos", IntentType::Operational)
                .with_parent("T1")
                .with_priority(0.6)
                .with_purpose("capture north sector photos"),
        )
        .unwrap();
        h.add_node(
            IntentNode::new("O2", "Thermal", IntentType::Operational)
                .with_parent("T1")
                .with_priority(0.6)
                .with_purpose("capture north sector thermal"),
        )
        .unwrap();

        let plan = generate_adaptation_plan(&mut h, "LOSS", &[AgentId::new("D1")], Utc::now());

        assert_eq!(plan.adaptation_strategy, AdaptationStrategy::TacticalReassignment);
        assert_eq!(plan.new_intent_assignments.len(), 2);
        assert_eq!(plan.new_intent_assignments[0].alternatives, vec![id("O2")]);
        assert_eq!(plan.new_intent_assignments[1].alternatives, vec![id("O1")]);
        // 0.7 * 1 + 0.3 * 0.6
        assert!((plan.success_probability - 0.88).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_assets_yield_empty_plan() {
        let mut h = hierarchy();
        let plan = generate_adaptation_plan(&mut h, "LOSS", &[AgentId::new("ghost")], Utc::now());
        assert!(plan.affected_intent_ids.is_empty());
        assert!(plan.new_intent_assignments.is_empty());
        assert_eq!(plan.success_probability, 0.0);
        assert_eq!(plan.adaptation_strategy, AdaptationStrategy::TacticalReassignment);
        assert_eq!(plan.estimated_impact.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_fixed_execution_script() {
        let script = execution_script(AdaptationStrategy::TacticalReassignment);
        let actions: Vec<&str> = script.iter().map(|s| s.action.as_str()).collect();
        assert_eq!(
            actions,
            vec![
                "SUSPEND_AFFECTED_INTENTS",
                "ANALYZE_INTENT_DEPENDENCIES",
                "REASSIGN_INTENT_RESPONSIBILITIES",
                "VALIDATE_INTENT_HIERARCHY",
                "RESUME_MISSION_EXECUTION",
            ]
        );
        let durations: Vec<u32> = script.iter().map(|s| s.estimated_duration_secs).collect();
        assert_eq!(durations, vec![30, 60, 120, 45, 30]);
        assert!(script[2].description.contains("TACTICAL_REASSIGNMENT"));
        assert_eq!(script[0].step, 1);
    }
}
