//! Domain error types

use crate::agent::value_objects::AgentId;
use crate::hierarchy::node::IntentId;
use crate::mission::value_objects::MissionId;
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Agent not found: {0}")]
    AgentNotFound(AgentId),

    #[error("Mission not found: {0}")]
    MissionNotFound(MissionId),

    #[error("Intent not found: {0}")]
    IntentNotFound(IntentId),

    #[error("Intent already exists: {0}")]
    DuplicateIntent(IntentId),

    #[error("Intent {child} references unknown parent {parent}")]
    MissingParent { child: IntentId, parent: IntentId },

    #[error("Intent {0} would introduce a cycle")]
    CycleDetected(IntentId),
}

impl DomainError {
    /// Check if this error is a lookup failure (agent, mission or intent)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DomainError::AgentNotFound(_)
                | DomainError::MissionNotFound(_)
                | DomainError::IntentNotFound(_)
        )
    }
}
