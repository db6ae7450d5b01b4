//! Formation configuration for a mission's agents.

use serde::{Deserialize, Serialize};

/// Spacing multiplier applied when a formation loses a member.
pub const SPACING_EXPANSION: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormationType {
    #[default]
    Diamond,
    Wedge,
    Line,
    Circle,
    Grid,
}

impl FormationType {
    pub fn as_str(&self) -> &str {
        match self {
            FormationType::Diamond => "diamond",
            FormationType::Wedge => "wedge",
            FormationType::Line => "line",
            FormationType::Circle => "circle",
            FormationType::Grid => "grid",
        }
    }
}

impl std::fmt::Display for FormationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormationConfig {
    pub formation_type: FormationType,
    pub spacing_meters: f64,
    pub altitude_agl: f64,
    pub communication_channel: String,
    pub backup_channel: String,
}

impl Default for FormationConfig {
    fn default() -> Self {
        Self {
            formation_type: FormationType::Diamond,
            spacing_meters: 50.0,
            altitude_agl: 120.0,
            communication_channel: "CH_1".to_string(),
            backup_channel: "CH_2".to_string(),
        }
    }
}

impl FormationConfig {
    /// Formation after losing a member: wider spacing, frequencies swapped
    /// onto the backup channel.
    pub fn adjusted_for_loss(&self) -> Self {
        Self {
            formation_type: self.formation_type,
            spacing_meters: self.spacing_meters * SPACING_EXPANSION,
            altitude_agl: self.altitude_agl,
            communication_channel: self.backup_channel.clone(),
            backup_channel: self.communication_channel.clone(),
        }
    }
}
