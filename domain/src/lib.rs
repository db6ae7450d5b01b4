//! Domain layer for pact-coordinator
//!
//! This crate contains the core rules of intent-layered coordination.
//! It has no dependencies on infrastructure, presentation or an async runtime.
//!
//! # Core Concepts
//!
//! ## Four-layer coordination
//!
//! Two agents coordinate only after passing four gates:
//!
//! - **Individual intent**: each agent states a clear, confident objective
//! - **Co-intent**: both agree on roles and a shared objective
//! - **Core intent**: the shared objective serves the mission
//! - **Collab intent**: the partnership's energy score is high enough
//!
//! ## Intent hierarchy
//!
//! Strategic, tactical, operational and contingency intents form a tree.
//! When an agent is lost, the intents it staffed fail, their descendants are
//! suspended and an adaptation plan reassigns responsibility.
//!
//! ## Reassignment
//!
//! An agent that stops reporting is replaced on its mission by up to two
//! operational agents with overlapping capabilities.

pub mod agent;
pub mod coordination;
pub mod core;
pub mod failure;
pub mod hierarchy;
pub mod intent;
pub mod mission;
pub mod planning;

// Re-export commonly used types
pub use agent::{
    entities::{Agent, AgentStatus},
    registry::AgentRegistry,
    value_objects::{AgentId, CapabilitySet, Position, ResourceLimits},
};
pub use coordination::{
    metrics::CoordinationMetrics,
    outcome::{
        CoordinationDetails, CoordinationOutcome, CoordinationReport, ExecutionStep,
        ExecutionTrace, IntentLayers,
    },
    result::{CoordinationPhase, CoordinationResult},
};
pub use core::error::DomainError;
pub use failure::{
    impact::{MissionImpact, calculate_mission_impact},
    record::CommunicationFailureRecord,
};
pub use hierarchy::{
    health::HierarchyHealth,
    node::{IntentId, IntentNode, IntentStatus, IntentType},
    tree::{HierarchyIssue, IntentHierarchy},
};
pub use intent::{
    co_intent::CoIntent,
    collab::CollabIntent,
    context::{AgentTaskSpec, Criticality, MissionContext, TaskComplexity, TaskContext},
    core_intent::{AlignmentViolation, CoreIntent},
    individual::IndividualIntent,
};
pub use mission::{
    entities::{Mission, MissionObjective, MissionStatus},
    formation::{FormationConfig, FormationType},
    value_objects::{MissionId, ObjectiveId, TaskPriority},
};
pub use planning::{
    adaptation::{
        AdaptationAction, AdaptationImpact, AdaptationPlan, AdaptationStep, AdaptationStrategy,
        IntentAssignment, RiskLevel, communication_failure_trigger, generate_adaptation_plan,
    },
    reassignment::{
        ObjectiveAssignment, ReassignmentPlan, ReplacementCandidate, find_replacement_candidates,
        generate_reassignment_plan,
    },
};
