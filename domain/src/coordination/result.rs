//! Coordination results and lifecycle phases.

use serde::{Deserialize, Serialize};

/// Terminal result of a coordination request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoordinationResult {
    Success,
    #[serde(rename = "FAILED_L1_VALIDATION")]
    FailedL1Validation,
    #[serde(rename = "FAILED_L2_CONSENSUS")]
    FailedL2Consensus,
    #[serde(rename = "FAILED_L3_ALIGNMENT")]
    FailedL3Alignment,
    #[serde(rename = "FAILED_L4_OPTIMIZATION")]
    FailedL4Optimization,
}

impl CoordinationResult {
    /// Wire name of the result.
    pub fn as_str(&self) -> &str {
        match self {
            CoordinationResult::Success => "SUCCESS",
            CoordinationResult::FailedL1Validation => "FAILED_L1_VALIDATION",
            CoordinationResult::FailedL2Consensus => "FAILED_L2_CONSENSUS",
            CoordinationResult::FailedL3Alignment => "FAILED_L3_ALIGNMENT",
            CoordinationResult::FailedL4Optimization => "FAILED_L4_OPTIMIZATION",
        }
    }

    /// Human-readable description of which layer decided the result.
    pub fn description(&self) -> &str {
        match self {
            CoordinationResult::Success => "coordination succeeded",
            CoordinationResult::FailedL1Validation => "individual intent invalid",
            CoordinationResult::FailedL2Consensus => "co-intent consensus not reached",
            CoordinationResult::FailedL3Alignment => "core intent misaligned",
            CoordinationResult::FailedL4Optimization => "partnership energy too low",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CoordinationResult::Success)
    }

    /// Layer (1-4) that rejected the request, `None` on success.
    pub fn failed_layer(&self) -> Option<u8> {
        match self {
            CoordinationResult::Success => None,
            CoordinationResult::FailedL1Validation => Some(1),
            CoordinationResult::FailedL2Consensus => Some(2),
            CoordinationResult::FailedL3Alignment => Some(3),
            CoordinationResult::FailedL4Optimization => Some(4),
        }
    }
}

impl std::fmt::Display for CoordinationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Progress of a single coordination through the layers
///
/// ```text
/// Pending -> Validated -> Negotiating -> Aligned -> Optimized -> Executing -> Completed
///     \__________\____________\_____________\___________\-> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinationPhase {
    #[default]
    Pending,
    Validated,
    Negotiating,
    Aligned,
    Optimized,
    Executing,
    Completed,
    Failed,
}

impl CoordinationPhase {
    pub fn as_str(&self) -> &str {
        match self {
            CoordinationPhase::Pending => "pending",
            CoordinationPhase::Validated => "validated",
            CoordinationPhase::Negotiating => "negotiating",
            CoordinationPhase::Aligned => "aligned",
            CoordinationPhase::Optimized => "optimized",
            CoordinationPhase::Executing => "executing",
            CoordinationPhase::Completed => "completed",
            CoordinationPhase::Failed => "failed",
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, CoordinationPhase::Completed | CoordinationPhase::Failed)
    }
}

impl std::fmt::Display for CoordinationPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
