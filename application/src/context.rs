//! Shared mission-control state.
//!
//! [`MissionControl`] owns every piece of mutable coordination state: the
//! agent registry, the missions (one async mutex each), the intent
//! hierarchy, the active-failure table and the coordination tracker. Use
//! cases hold an `Arc<MissionControl>`; nothing here is global.
//!
//! # Lock order
//!
//! A mission mutex is always taken before the registry lock or the
//! hierarchy mutex. The active-failure table is never held across any
//! other lock.

use crate::config::ControlParams;
use crate::ports::history::{
    AdaptationRecord, HistoryError, HistoryStore, InMemoryHistory, ReassignmentRecord,
};
use crate::ports::notification::{Alert, NoNotification, NotificationSink};
use crate::ports::telemetry::{NoTelemetry, TelemetrySink};
use pact_domain::{
    Agent, AgentId, AgentRegistry, CommunicationFailureRecord, CoordinationMetrics,
    CoordinationPhase, DomainError, HierarchyHealth, IntentHierarchy, IntentId, IntentNode,
    Mission, MissionId,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Tracked state of one coordination call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoordinationRecord {
    pub coordination_id: String,
    pub agents: [AgentId; 2],
    pub phase: CoordinationPhase,
    pub processing_time_ms: Option<f64>,
}

/// Metrics snapshot returned by [`MissionControl::performance_metrics`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    #[serde(flatten)]
    pub totals: CoordinationMetrics,
    pub success_rate: f64,
    pub active_coordinations: usize,
}

/// Coordination records and rolling metrics.
///
/// Guarded by a std mutex: updates are short and never span an `.await`.
#[derive(Default)]
struct CoordinationTracker {
    inner: StdMutex<TrackerState>,
}

#[derive(Default)]
struct TrackerState {
    records: HashMap<String, CoordinationRecord>,
    metrics: CoordinationMetrics,
}

impl CoordinationTracker {
    fn state(&self) -> std::sync::MutexGuard<'_, TrackerState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct MissionControl {
    registry: RwLock<AgentRegistry>,
    missions: RwLock<BTreeMap<MissionId, Arc<Mutex<Mission>>>>,
    hierarchy: Mutex<IntentHierarchy>,
    active_failures: RwLock<BTreeMap<AgentId, CommunicationFailureRecord>>,
    tracker: CoordinationTracker,
    history: Arc<dyn HistoryStore>,
    alerts: Arc<dyn NotificationSink>,
    telemetry: Arc<dyn TelemetrySink>,
    params: ControlParams,
    shutdown: CancellationToken,
}

impl MissionControl {
    /// Empty mission control with in-memory history and no-op sinks.
    pub fn new(params: ControlParams) -> Self {
        Self {
            registry: RwLock::new(AgentRegistry::new()),
            missions: RwLock::new(BTreeMap::new()),
            hierarchy: Mutex::new(IntentHierarchy::new()),
            active_failures: RwLock::new(BTreeMap::new()),
            tracker: CoordinationTracker::default(),
            history: Arc::new(InMemoryHistory::new()),
            alerts: Arc::new(NoNotification),
            telemetry: Arc::new(NoTelemetry),
            params,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_history(mut self, history: Arc<dyn HistoryStore>) -> Self {
        self.history = history;
        self
    }

    pub fn with_alerts(mut self, alerts: Arc<dyn NotificationSink>) -> Self {
        self.alerts = alerts;
        self
    }

    pub fn with_telemetry(mut self, telemetry: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = telemetry;
        self
    }

    // ==================== Accessors ====================

    pub fn params(&self) -> &ControlParams {
        &self.params
    }

    pub fn history(&self) -> &Arc<dyn HistoryStore> {
        &self.history
    }

    pub fn telemetry(&self) -> &Arc<dyn TelemetrySink> {
        &self.telemetry
    }

    pub fn notify(&self, alert: Alert) {
        self.alerts.notify(alert);
    }

    pub(crate) fn registry(&self) -> &RwLock<AgentRegistry> {
        &self.registry
    }

    pub(crate) fn hierarchy(&self) -> &Mutex<IntentHierarchy> {
        &self.hierarchy
    }

    pub(crate) fn active_failure_table(
        &self,
    ) -> &RwLock<BTreeMap<AgentId, CommunicationFailureRecord>> {
        &self.active_failures
    }

    // ==================== Teardown ====================

    /// Token cancelled by [`MissionControl::shutdown`]; background loops
    /// stop when it fires.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn shutdown(&self) {
        info!("Mission control shutting down");
        self.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    // ==================== Agents ====================

    /// Register (or replace) an agent. Returns `true` if it was new.
    pub async fn register_agent(&self, agent: Agent) -> bool {
        let id = agent.id.clone();
        let is_new = self.registry.write().await.register(agent);
        info!("Registered agent {} ({})", id, if is_new { "new" } else { "updated" });
        is_new
    }

    pub async fn agent(&self, id: &AgentId) -> Option<Agent> {
        self.registry.read().await.get(id).cloned()
    }

    pub async fn agents(&self) -> Vec<Agent> {
        self.registry.read().await.iter().cloned().collect()
    }

    /// Record a heartbeat from an agent.
    pub async fn record_contact(
        &self,
        id: &AgentId,
        at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), DomainError> {
        self.registry.write().await.record_contact(id, at)
    }

    // ==================== Missions ====================

    pub async fn register_mission(&self, mission: Mission) {
        info!(
            "Registered mission {} with {} agent(s)",
            mission.id,
            mission.assigned_agents.len()
        );
        self.missions
            .write()
            .await
            .insert(mission.id.clone(), Arc::new(Mutex::new(mission)));
    }

    /// Handle to a mission's critical section.
    pub async fn mission(&self, id: &MissionId) -> Result<Arc<Mutex<Mission>>, DomainError> {
        self.missions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::MissionNotFound(id.clone()))
    }

    /// Handles to every mission, ordered by id.
    pub async fn mission_handles(&self) -> Vec<Arc<Mutex<Mission>>> {
        self.missions.read().await.values().cloned().collect()
    }

    /// Consistent copy of a mission: taken under its mutex, so it never
    /// shows a half-applied plan.
    pub async fn mission_snapshot(&self, id: &MissionId) -> Result<Mission, DomainError> {
        let handle = self.mission(id).await?;
        let mission = handle.lock().await;
        Ok(mission.clone())
    }

    pub async fn mission_snapshots(&self) -> Vec<Mission> {
        let mut out = Vec::new();
        for handle in self.mission_handles().await {
            out.push(handle.lock().await.clone());
        }
        out
    }

    // ==================== Intents ====================

    pub async fn add_intent_node(&self, node: IntentNode) -> Result<(), DomainError> {
        let id = node.id.clone();
        self.hierarchy.lock().await.add_node(node)?;
        info!("Added intent {}", id);
        Ok(())
    }

    pub async fn intent(&self, id: &IntentId) -> Option<IntentNode> {
        self.hierarchy.lock().await.get(id).cloned()
    }

    pub async fn intents(&self) -> Vec<IntentNode> {
        self.hierarchy.lock().await.iter().cloned().collect()
    }

    pub async fn hierarchy_health(&self) -> HierarchyHealth {
        self.hierarchy.lock().await.health()
    }

    // ==================== Failures & History ====================

    pub async fn active_failures(&self) -> Vec<CommunicationFailureRecord> {
        self.active_failures.read().await.values().cloned().collect()
    }

    pub async fn reassignment_history(
        &self,
        mission: &MissionId,
    ) -> Result<Vec<ReassignmentRecord>, HistoryError> {
        self.history.reassignments(mission).await
    }

    pub async fn adaptation_history(
        &self,
        intent: &IntentId,
    ) -> Result<Vec<AdaptationRecord>, HistoryError> {
        self.history.adaptations(intent).await
    }

    // ==================== Coordination Tracking ====================

    pub fn coordination_status(&self, coordination_id: &str) -> Option<CoordinationRecord> {
        self.tracker.state().records.get(coordination_id).cloned()
    }

    pub fn performance_metrics(&self) -> PerformanceMetrics {
        let state = self.tracker.state();
        let active = state
            .records
            .values()
            .filter(|r| !r.phase.is_finished())
            .count();
        PerformanceMetrics {
            success_rate: state.metrics.success_rate(),
            totals: state.metrics.clone(),
            active_coordinations: active,
        }
    }

    pub(crate) fn begin_coordination(&self, coordination_id: &str, agents: [AgentId; 2]) {
        self.tracker.state().records.insert(
            coordination_id.to_string(),
            CoordinationRecord {
                coordination_id: coordination_id.to_string(),
                agents,
                phase: CoordinationPhase::Pending,
                processing_time_ms: None,
            },
        );
    }

    pub(crate) fn advance_coordination(&self, coordination_id: &str, phase: CoordinationPhase) {
        if let Some(record) = self.tracker.state().records.get_mut(coordination_id) {
            record.phase = phase;
        }
    }

    /// Close a coordination and count it. Returns the metrics right after.
    pub(crate) fn finish_coordination(
        &self,
        coordination_id: &str,
        success: bool,
        elapsed: Duration,
    ) -> CoordinationMetrics {
        let mut state = self.tracker.state();
        if let Some(record) = state.records.get_mut(coordination_id) {
            record.phase = if success {
                CoordinationPhase::Completed
            } else {
                CoordinationPhase::Failed
            };
            record.processing_time_ms = Some(elapsed.as_secs_f64() * 1000.0);
        }
        state.metrics.record(success, elapsed);
        state.metrics.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pact_domain::{IntentType, MissionStatus};

    #[tokio::test]
    async fn test_register_and_snapshot() {
        let control = MissionControl::new(ControlParams::default());
        assert!(control.register_agent(Agent::new("D1", "quad", Utc::now())).await);
        assert!(!control.register_agent(Agent::new("D1", "quad", Utc::now())).await);

        control
            .register_mission(
                Mission::new("M1", "Recon", Utc::now())
                    .with_status(MissionStatus::Active)
                    .with_agents(["D1"]),
            )
            .await;

        let snapshot = control.mission_snapshot(&MissionId::new("M1")).await.unwrap();
        assert_eq!(snapshot.assigned_agents, vec![AgentId::new("D1")]);
        assert!(
            control
                .mission_snapshot(&MissionId::new("M9"))
                .await
                .unwrap_err()
                .is_not_found()
        );
    }

    #[tokio::test]
    async fn test_intent_nodes_and_health() {
        let control = MissionControl::new(ControlParams::default());
        control
            .add_intent_node(IntentNode::new("S1", "Mission", IntentType::Strategic))
            .await
            .unwrap();
        let err = control
            .add_intent_node(IntentNode::new("T1", "Recon", IntentType::Tactical).with_parent("X"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::MissingParent { .. }));
        assert_eq!(control.hierarchy_health().await.total_intents, 1);
    }

    #[test]
    fn test_tracker_lifecycle() {
        let control = MissionControl::new(ControlParams::default());
        control.begin_coordination("c1", [AgentId::new("A"), AgentId::new("B")]);
        control.advance_coordination("c1", CoordinationPhase::Negotiating);
        assert_eq!(control.performance_metrics().active_coordinations, 1);

        let metrics = control.finish_coordination("c1", true, Duration::from_millis(4));
        assert_eq!(metrics.total_coordinations, 1);

        let status = control.coordination_status("c1").unwrap();
        assert_eq!(status.phase, CoordinationPhase::Completed);
        assert!(status.processing_time_ms.is_some());
        let perf = control.performance_metrics();
        assert_eq!(perf.active_coordinations, 0);
        assert_eq!(perf.success_rate, 1.0);
    }

    #[test]
    fn test_shutdown_cancels_token() {
        let control = MissionControl::new(ControlParams::default());
        let token = control.shutdown_token();
        control.shutdown();
        assert!(token.is_cancelled());
        assert!(control.is_shut_down());
    }
}
