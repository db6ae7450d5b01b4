//! Hierarchy health summary.

use super::node::{IntentStatus, IntentType};
use super::tree::IntentHierarchy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Effectiveness reported for an intent type with no nodes.
const EMPTY_TYPE_EFFECTIVENESS: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyHealth {
    pub total_intents: usize,
    pub active_percentage: f64,
    pub average_effectiveness: f64,
    pub depth: usize,
    pub status_distribution: BTreeMap<IntentStatus, usize>,
    pub type_distribution: BTreeMap<IntentType, usize>,
    pub effectiveness_by_type: BTreeMap<IntentType, f64>,
}

impl HierarchyHealth {
    pub fn of(hierarchy: &IntentHierarchy) -> Self {
        let total = hierarchy.len();

        let mut status_distribution: BTreeMap<IntentStatus, usize> =
            IntentStatus::ALL.iter().map(|s| (*s, 0)).collect();
        let mut type_distribution: BTreeMap<IntentType, usize> =
            IntentType::ALL.iter().map(|t| (*t, 0)).collect();
        let mut effectiveness_sums: BTreeMap<IntentType, f64> = BTreeMap::new();
        let mut effectiveness_total = 0.0;

        for node in hierarchy.iter() {
            *status_distribution.entry(node.status).or_default() += 1;
            *type_distribution.entry(node.intent_type).or_default() += 1;
            let effectiveness = node.effectiveness();
            *effectiveness_sums.entry(node.intent_type).or_default() += effectiveness;
            effectiveness_total += effectiveness;
        }

        let effectiveness_by_type = IntentType::ALL
            .iter()
            .map(|t| {
                let count = type_distribution.get(t).copied().unwrap_or(0);
                let score = if count == 0 {
                    EMPTY_TYPE_EFFECTIVENESS
                } else {
                    effectiveness_sums.get(t).copied().unwrap_or(0.0) / count as f64
                };
                (*t, score)
            })
            .collect();

        let (active_percentage, average_effectiveness) = if total == 0 {
            (0.0, 0.0)
        } else {
            let active = status_distribution
                .get(&IntentStatus::Active)
                .copied()
                .unwrap_or(0);
            (
                active as f64 / total as f64 * 100.0,
                effectiveness_total / total as f64,
            )
        };

        Self {
            total_intents: total,
            active_percentage,
            average_effectiveness,
            depth: hierarchy.depth(),
            status_distribution,
            type_distribution,
            effectiveness_by_type,
        }
    }

    pub fn count(&self, status: IntentStatus) -> usize {
        self.status_distribution.get(&status).copied().unwrap_or(0)
    }
}

impl IntentHierarchy {
    pub fn health(&self) -> HierarchyHealth {
        HierarchyHealth::of(self)
    }
}
