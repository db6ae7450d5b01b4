//! Agent registry: the authoritative set of known agents.
//!
//! Agents are iterated in registration order so candidate searches and
//! snapshots are deterministic for identical inputs.

use super::entities::{Agent, AgentStatus};
use super::value_objects::AgentId;
use crate::core::error::DomainError;
use crate::mission::value_objects::ObjectiveId;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    agents: HashMap<AgentId, Agent>,
    order: Vec<AgentId>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an agent. Returns `true` if the id was new.
    pub fn register(&mut self, agent: Agent) -> bool {
        let id = agent.id.clone();
        let is_new = self.agents.insert(id.clone(), agent).is_none();
        if is_new {
            self.order.push(id);
        }
        is_new
    }

    pub fn get(&self, id: &AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn require(&self, id: &AgentId) -> Result<&Agent, DomainError> {
        self.get(id)
            .ok_or_else(|| DomainError::AgentNotFound(id.clone()))
    }

    fn require_mut(&mut self, id: &AgentId) -> Result<&mut Agent, DomainError> {
        self.agents
            .get_mut(id)
            .ok_or_else(|| DomainError::AgentNotFound(id.clone()))
    }

    pub fn contains(&self, id: &AgentId) -> bool {
        self.agents.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Agents in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.order.iter().filter_map(|id| self.agents.get(id))
    }

    pub fn operational_count(&self) -> usize {
        self.agents.values().filter(|a| a.is_operational()).count()
    }

    // ==================== Updates ====================

    pub fn update_status(&mut self, id: &AgentId, status: AgentStatus) -> Result<(), DomainError> {
        self.require_mut(id)?.status = status;
        Ok(())
    }

    pub fn record_contact(&mut self, id: &AgentId, at: DateTime<Utc>) -> Result<(), DomainError> {
        self.require_mut(id)?.last_contact = at;
        Ok(())
    }

    pub fn update_resource_level(&mut self, id: &AgentId, level: f64) -> Result<(), DomainError> {
        self.require_mut(id)?.resource_level = level.clamp(0.0, 1.0);
        Ok(())
    }

    pub fn assign_objectives(
        &mut self,
        id: &AgentId,
        objectives: &[ObjectiveId],
    ) -> Result<(), DomainError> {
        self.require_mut(id)?.extend_objectives(objectives);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(id: &str) -> Agent {
        Agent::new(id, "quad", Utc::now())
    }

    #[test]
    fn test_register_keeps_order() {
        let mut registry = AgentRegistry::new();
        assert!(registry.register(agent("C")));
        assert!(registry.register(agent("A")));
        assert!(registry.register(agent("B")));
        // Re-registering replaces in place
        assert!(!registry.register(agent("A").with_resource_level(0.2)));

        let ids: Vec<&str> = registry.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["C", "A", "B"]);
        assert_eq!(registry.get(&AgentId::new("A")).unwrap().resource_level, 0.2);
    }

    #[test]
    fn test_update_unknown_agent() {
        let mut registry = AgentRegistry::new();
        let err = registry
            .update_status(&AgentId::new("ghost"), AgentStatus::Offline)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_status_and_level_updates() {
        let mut registry = AgentRegistry::new();
        registry.register(agent("D1"));
        let id = AgentId::new("D1");

        registry.update_status(&id, AgentStatus::CommFailure).unwrap();
        registry.update_resource_level(&id, 1.7).unwrap();

        let d1 = registry.get(&id).unwrap();
        assert_eq!(d1.status, AgentStatus::CommFailure);
        assert_eq!(d1.resource_level, 1.0);
        assert_eq!(registry.operational_count(), 0);
    }
}
