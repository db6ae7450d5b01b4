//! Port for the append-only plan audit history.
//!
//! Every executed reassignment plan and every generated adaptation plan is
//! appended once and never rewritten. Queries are by mission id
//! (reassignments) or by intent id (adaptations touching that intent).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pact_domain::{AdaptationPlan, IntentId, MissionId, ReassignmentPlan};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("History I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("History serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("History store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReassignmentRecord {
    pub recorded_at: DateTime<Utc>,
    pub plan: ReassignmentPlan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptationRecord {
    pub recorded_at: DateTime<Utc>,
    pub plan: AdaptationPlan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HistoryEntry {
    Reassignment(ReassignmentRecord),
    Adaptation(AdaptationRecord),
}

impl HistoryEntry {
    pub fn reassignment(plan: ReassignmentPlan, at: DateTime<Utc>) -> Self {
        HistoryEntry::Reassignment(ReassignmentRecord {
            recorded_at: at,
            plan,
        })
    }

    pub fn adaptation(plan: AdaptationPlan, at: DateTime<Utc>) -> Self {
        HistoryEntry::Adaptation(AdaptationRecord {
            recorded_at: at,
            plan,
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            HistoryEntry::Reassignment(_) => "reassignment",
            HistoryEntry::Adaptation(_) => "adaptation",
        }
    }

    pub fn is_for_mission(&self, mission: &MissionId) -> bool {
        matches!(self, HistoryEntry::Reassignment(r) if &r.plan.mission_id == mission)
    }

    pub fn touches_intent(&self, intent: &IntentId) -> bool {
        matches!(self, HistoryEntry::Adaptation(a) if a.plan.touches(intent))
    }
}

/// Filter helpers shared by history adapters.
pub fn reassignments_for<'a>(
    entries: impl IntoIterator<Item = &'a HistoryEntry>,
    mission: &MissionId,
) -> Vec<ReassignmentRecord> {
    entries
        .into_iter()
        .filter_map(|entry| match entry {
            HistoryEntry::Reassignment(r) if &r.plan.mission_id == mission => Some(r.clone()),
            _ => None,
        })
        .collect()
}

pub fn adaptations_for<'a>(
    entries: impl IntoIterator<Item = &'a HistoryEntry>,
    intent: &IntentId,
) -> Vec<AdaptationRecord> {
    entries
        .into_iter()
        .filter_map(|entry| match entry {
            HistoryEntry::Adaptation(a) if a.plan.touches(intent) => Some(a.clone()),
            _ => None,
        })
        .collect()
}

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append an entry. Entries are immutable once appended.
    async fn append(&self, entry: HistoryEntry) -> Result<(), HistoryError>;

    /// Executed reassignment plans for a mission, oldest first.
    async fn reassignments(&self, mission: &MissionId) -> Result<Vec<ReassignmentRecord>, HistoryError>;

    /// Adaptation plans that touched an intent, oldest first.
    async fn adaptations(&self, intent: &IntentId) -> Result<Vec<AdaptationRecord>, HistoryError>;

    /// Total number of entries.
    async fn len(&self) -> Result<usize, HistoryError>;
}

/// Process-local history, the default when no persistent store is configured.
#[derive(Default)]
pub struct InMemoryHistory {
    entries: RwLock<Vec<HistoryEntry>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistory {
    async fn append(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn reassignments(&self, mission: &MissionId) -> Result<Vec<ReassignmentRecord>, HistoryError> {
        Ok(reassignments_for(self.entries.read().await.iter(), mission))
    }

    async fn adaptations(&self, intent: &IntentId) -> Result<Vec<AdaptationRecord>, HistoryError> {
        Ok(adaptations_for(self.entries.read().await.iter(), intent))
    }

    async fn len(&self) -> Result<usize, HistoryError> {
        Ok(self.entries.read().await.len())
    }
}
