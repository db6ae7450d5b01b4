//! Intent hierarchy stored as an arena of nodes keyed by id.
//!
//! Parent/child links are ids, never references. Nodes are only ever
//! transitioned between statuses; nothing is removed.

use super::node::{IntentId, IntentNode, IntentStatus, normalize_priority};
use crate::agent::value_objects::AgentId;
use crate::core::error::DomainError;
use crate::core::string::purposes_overlap;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// A parent becomes Adapting once more than this share of its children failed.
pub const PARENT_FAILURE_RATIO: f64 = 0.5;
/// Sibling purposes must share more than this share of words.
pub const PURPOSE_OVERLAP_RATIO: f64 = 0.3;
/// Maximum number of alternatives offered for a failed intent.
pub const MAX_ALTERNATIVES: usize = 3;

/// A structural problem found by [`IntentHierarchy::validate_consistency`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HierarchyIssue {
    OrphanedParent { intent: IntentId, parent: IntentId },
    ParentChildMismatch { parent: IntentId, child: IntentId },
    Cycle { intent: IntentId },
}

impl std::fmt::Display for HierarchyIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HierarchyIssue::OrphanedParent { intent, parent } => {
                write!(f, "Intent {intent} has invalid parent {parent}")
            }
            HierarchyIssue::ParentChildMismatch { parent, child } => {
                write!(f, "Intent {parent} lists child {child} whose parent differs")
            }
            HierarchyIssue::Cycle { intent } => {
                write!(f, "Circular dependency detected involving intent {intent}")
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IntentHierarchy {
    nodes: HashMap<IntentId, IntentNode>,
    order: Vec<IntentId>,
}

impl IntentHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node and link it under its parent.
    ///
    /// The node's own `children_ids` are ignored: children are linked as
    /// they are added.
    pub fn add_node(&mut self, mut node: IntentNode) -> Result<(), DomainError> {
        if self.nodes.contains_key(&node.id) {
            return Err(DomainError::DuplicateIntent(node.id));
        }
        if let Some(parent_id) = &node.parent_id {
            if *parent_id == node.id {
                return Err(DomainError::CycleDetected(node.id));
            }
            let Some(parent) = self.nodes.get_mut(parent_id) else {
                return Err(DomainError::MissingParent {
                    child: node.id.clone(),
                    parent: parent_id.clone(),
                });
            };
            parent.children_ids.push(node.id.clone());
        }

        node.children_ids.clear();
        node.priority = normalize_priority(node.priority);
        self.order.push(node.id.clone());
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    // ==================== Queries ====================

    pub fn get(&self, id: &IntentId) -> Option<&IntentNode> {
        self.nodes.get(id)
    }

    pub fn require(&self, id: &IntentId) -> Result<&IntentNode, DomainError> {
        self.get(id)
            .ok_or_else(|| DomainError::IntentNotFound(id.clone()))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &IntentNode> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn roots(&self) -> Vec<&IntentNode> {
        self.iter().filter(|node| node.is_root()).collect()
    }

    /// Direct children; empty for an unknown id.
    pub fn children(&self, id: &IntentId) -> Vec<&IntentNode> {
        self.nodes
            .get(id)
            .map(|node| {
                node.children_ids
                    .iter()
                    .filter_map(|child| self.nodes.get(child))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All descendants, depth-first pre-order.
    pub fn descendants(&self, id: &IntentId) -> Vec<&IntentNode> {
        let mut out = Vec::new();
        let mut seen = HashSet::from([id.clone()]);
        self.collect_descendants(id, &mut seen, &mut out);
        out
    }

    fn collect_descendants<'a>(
        &'a self,
        id: &IntentId,
        seen: &mut HashSet<IntentId>,
        out: &mut Vec<&'a IntentNode>,
    ) {
        for child in self.children(id) {
            if !seen.insert(child.id.clone()) {
                continue;
            }
            out.push(child);
            self.collect_descendants(&child.id, seen, out);
        }
    }

    /// Nodes staffed by any of `assets`, in insertion order.
    pub fn nodes_using_assets(&self, assets: &[AgentId]) -> Vec<IntentId> {
        self.iter()
            .filter(|node| node.uses_any_asset(assets))
            .map(|node| node.id.clone())
            .collect()
    }

    /// Number of levels; a lone root has depth 1, an empty hierarchy 0.
    pub fn depth(&self) -> usize {
        self.roots()
            .iter()
            .map(|root| self.levels_below(&root.id, &mut HashSet::new()) + 1)
            .max()
            .unwrap_or(0)
    }

    fn levels_below(&self, id: &IntentId, seen: &mut HashSet<IntentId>) -> usize {
        if !seen.insert(id.clone()) {
            return 0;
        }
        self.children(id)
            .iter()
            .map(|child| self.levels_below(&child.id, seen) + 1)
            .max()
            .unwrap_or(0)
    }

    // ==================== Failure Propagation ====================

    /// Mark `id` failed, suspend its descendants and re-evaluate the direct
    /// parent.
    ///
    /// Returns the affected ids: the node, its descendants, then the parent.
    pub fn propagate_failure(&mut self, id: &IntentId) -> Result<Vec<IntentId>, DomainError> {
        let parent_id = self.require(id)?.parent_id.clone();
        let descendant_ids: Vec<IntentId> =
            self.descendants(id).into_iter().map(|n| n.id.clone()).collect();

        self.set_status_unchecked(id, IntentStatus::Failed);
        for descendant in &descendant_ids {
            self.set_status_unchecked(descendant, IntentStatus::Suspended);
        }

        let mut affected = Vec::with_capacity(descendant_ids.len() + 2);
        affected.push(id.clone());
        affected.extend(descendant_ids);

        if let Some(parent_id) = parent_id
            && self.nodes.contains_key(&parent_id)
        {
            self.evaluate_parent_viability(&parent_id);
            affected.push(parent_id);
        }

        Ok(affected)
    }

    fn evaluate_parent_viability(&mut self, parent_id: &IntentId) {
        let children = self.children(parent_id);
        let failed = children
            .iter()
            .filter(|c| c.status == IntentStatus::Failed)
            .count();
        if failed as f64 > children.len() as f64 * PARENT_FAILURE_RATIO {
            self.set_status_unchecked(parent_id, IntentStatus::Adapting);
        }
    }

    /// Other ways to achieve what `failed` was for: similar-purpose siblings
    /// first, then same-type active intents sharing a capability.
    ///
    /// An intent matching both rules appears twice.
    pub fn find_alternative_intents(&self, failed: &IntentId) -> Result<Vec<IntentId>, DomainError> {
        let failed_node = self.require(failed)?;
        let mut alternatives = Vec::new();

        if let Some(parent_id) = &failed_node.parent_id {
            alternatives.extend(
                self.children(parent_id)
                    .into_iter()
                    .filter(|sibling| {
                        sibling.id != failed_node.id
                            && sibling.status != IntentStatus::Failed
                            && purposes_overlap(
                                &failed_node.purpose,
                                &sibling.purpose,
                                PURPOSE_OVERLAP_RATIO,
                            )
                    })
                    .map(|sibling| sibling.id.clone()),
            );
        }

        alternatives.extend(
            self.iter()
                .filter(|node| {
                    node.id != failed_node.id
                        && node.intent_type == failed_node.intent_type
                        && node.status == IntentStatus::Active
                        && node.shares_capability_with(failed_node)
                })
                .map(|node| node.id.clone()),
        );

        alternatives.truncate(MAX_ALTERNATIVES);
        Ok(alternatives)
    }

    // ==================== Status Updates ====================

    pub fn set_status(&mut self, id: &IntentId, status: IntentStatus) -> Result<(), DomainError> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| DomainError::IntentNotFound(id.clone()))?;
        node.status = status;
        Ok(())
    }

    fn set_status_unchecked(&mut self, id: &IntentId, status: IntentStatus) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.status = status;
        }
    }

    /// Fail every active intent whose deadline has passed.
    pub fn fail_overdue(&mut self, now: DateTime<Utc>) -> Vec<IntentId> {
        let overdue: Vec<IntentId> = self
            .iter()
            .filter(|node| node.status == IntentStatus::Active && node.is_overdue(now))
            .map(|node| node.id.clone())
            .collect();
        for id in &overdue {
            self.set_status_unchecked(id, IntentStatus::Failed);
        }
        overdue
    }

    // ==================== Consistency ====================

    /// Structural problems: dangling parents, children that name another
    /// parent, and parent chains that loop.
    pub fn validate_consistency(&self) -> Vec<HierarchyIssue> {
        let mut issues = Vec::new();

        for node in self.iter() {
            if let Some(parent) = &node.parent_id
                && !self.nodes.contains_key(parent)
            {
                issues.push(HierarchyIssue::OrphanedParent {
                    intent: node.id.clone(),
                    parent: parent.clone(),
                });
            }

            for child_id in &node.children_ids {
                let matches = self
                    .nodes
                    .get(child_id)
                    .is_some_and(|child| child.parent_id.as_ref() == Some(&node.id));
                if !matches {
                    issues.push(HierarchyIssue::ParentChildMismatch {
                        parent: node.id.clone(),
                        child: child_id.clone(),
                    });
                }
            }

            if self.in_parent_cycle(&node.id) {
                issues.push(HierarchyIssue::Cycle {
                    intent: node.id.clone(),
                });
            }
        }

        issues
    }

    fn in_parent_cycle(&self, start: &IntentId) -> bool {
        let mut seen = HashSet::new();
        let mut current = self.nodes.get(start).and_then(|n| n.parent_id.as_ref());
        while let Some(id) = current {
            if id == start {
                return true;
            }
            if !seen.insert(id.clone()) {
                return false;
            }
            current = self.nodes.get(id).and_then(|n| n.parent_id.as_ref());
        }
        false
    }

    #[cfg(test)]
    pub(crate) fn node_mut_for_test(&mut self, id: &IntentId) -> Option<&mut IntentNode> {
        self.nodes.get_mut(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::node::IntentType;

    fn id(s: &str) -> IntentId {
        IntentId::new(s)
    }

    /// S1
    /// ├── T1 (D1)
    /// │   ├── O1
    /// │   └── O2
    /// └── T2 (D2)
    fn sample() -> IntentHierarchy {
        let mut h = IntentHierarchy::new();
        h.add_node(IntentNode::new("S1", "Secure area", IntentType::Strategic).with_priority(0.9))
            .unwrap();
        h.add_node(
            IntentNode::new("T1", "North recon", IntentType::Tactical)
                .with_parent("S1")
                .with_purpose("survey northern grid sector")
                .with_capabilities(["imaging"])
                .with_assets(["D1"]),
        )
        .unwrap();
        h.add_node(
            IntentNode::new("T2", "South recon", IntentType::Tactical)
                .with_parent("S1")
                .with_purpose("survey southern grid area")
                .with_capabilities(["imaging"])
                .with_assets(["D2"]),
        )
        .unwrap();
        h.add_node(IntentNode::new("O1", "Photo pass", IntentType::Operational).with_parent("T1"))
            .unwrap();
        h.add_node(IntentNode::new("O2", "Thermal pass", IntentType::Operational).with_parent("T1"))
            .unwrap();
        h
    }

    #[test]
    fn test_add_links_children() {
        let h = sample();
        let children: Vec<&str> = h.children(&id("S1")).iter().map(|n| n.id.as_str()).collect();
        assert_eq!(children, vec!["T1", "T2"]);
        assert_eq!(h.roots().len(), 1);
        assert_eq!(h.depth(), 3);
    }

    #[test]
    fn test_add_rejects_bad_nodes() {
        let mut h = sample();
        assert_eq!(
            h.add_node(IntentNode::new("T1", "dup", IntentType::Tactical)),
            Err(DomainError::DuplicateIntent(id("T1")))
        );
        assert!(matches!(
            h.add_node(IntentNode::new("X", "x", IntentType::Tactical).with_parent("nope")),
            Err(DomainError::MissingParent { .. })
        ));
        assert_eq!(
            h.add_node(IntentNode::new("Y", "y", IntentType::Tactical).with_parent("Y")),
            Err(DomainError::CycleDetected(id("Y")))
        );
        assert_eq!(h.len(), 5);
    }

    #[test]
    fn test_add_normalizes_deserialized_priority() {
        let mut h = sample();
        let mut high: IntentNode = serde_json::from_str(
            r#"{"id": "O3", "name": "Overreach", "intent_type": "OPERATIONAL", "priority": 1.7, "parent_id": "T2"}"#,
        )
        .unwrap();
        assert_eq!(high.priority, 1.7);
        h.add_node(high.clone()).unwrap();
        assert_eq!(h.get(&id("O3")).unwrap().priority, 1.0);

        high.id = id("O4");
        high.priority = -0.2;
        h.add_node(high.clone()).unwrap();
        assert_eq!(h.get(&id("O4")).unwrap().priority, 0.0);

        high.id = id("O5");
        high.priority = f64::NAN;
        h.add_node(high).unwrap();
        assert_eq!(h.get(&id("O5")).unwrap().priority, 0.5);
    }

    #[test]
    fn test_descendants_preorder() {
        let h = sample();
        let ids: Vec<&str> = h.descendants(&id("S1")).iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["T1", "O1", "O2", "T2"]);
    }

    #[test]
    fn test_propagate_failure() {
        let mut h = sample();
        let affected = h.propagate_failure(&id("T1")).unwrap();
        assert_eq!(affected, vec![id("T1"), id("O1"), id("O2"), id("S1")]);

        assert_eq!(h.get(&id("T1")).unwrap().status, IntentStatus::Failed);
        assert_eq!(h.get(&id("O1")).unwrap().status, IntentStatus::Suspended);
        // 1 of 2 children failed: not more than half
        assert_eq!(h.get(&id("S1")).unwrap().status, IntentStatus::Active);

        h.propagate_failure(&id("T2")).unwrap();
        assert_eq!(h.get(&id("S1")).unwrap().status, IntentStatus::Adapting);
    }

    #[test]
    fn test_propagate_failure_idempotent() {
        let mut h = sample();
        let first = h.propagate_failure(&id("T1")).unwrap();
        let second = h.propagate_failure(&id("T1")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_propagate_unknown() {
        let mut h = sample();
        assert_eq!(
            h.propagate_failure(&id("ghost")),
            Err(DomainError::IntentNotFound(id("ghost")))
        );
    }

    #[test]
    fn test_alternatives_sibling_then_same_type() {
        let mut h = sample();
        h.propagate_failure(&id("T1")).unwrap();
        let alternatives = h.find_alternative_intents(&id("T1")).unwrap();
        // T2 matches both rules and is listed twice
        assert_eq!(alternatives, vec![id("T2"), id("T2")]);
    }

    #[test]
    fn test_alternatives_capped() {
        let mut h = sample();
        for n in 3..7 {
            h.add_node(
                IntentNode::new(format!("T{n}"), "extra", IntentType::Tactical)
                    .with_parent("S1")
                    .with_capabilities(["imaging"]),
            )
            .unwrap();
        }
        let alternatives = h.find_alternative_intents(&id("T1")).unwrap();
        assert_eq!(alternatives.len(), MAX_ALTERNATIVES);
    }

    #[test]
    fn test_fail_overdue() {
        let now = Utc::now();
        let mut h = IntentHierarchy::new();
        h.add_node(
            IntentNode::new("I1", "late", IntentType::Tactical)
                .with_deadline(now - chrono::Duration::minutes(1)),
        )
        .unwrap();
        h.add_node(
            IntentNode::new("I2", "late but suspended", IntentType::Tactical)
                .with_deadline(now - chrono::Duration::minutes(1))
                .with_status(IntentStatus::Suspended),
        )
        .unwrap();

        assert_eq!(h.fail_overdue(now), vec![id("I1")]);
        assert_eq!(h.get(&id("I1")).unwrap().status, IntentStatus::Failed);
        assert!(h.fail_overdue(now).is_empty());
    }

    #[test]
    fn test_consistent_hierarchy_has_no_issues() {
        assert!(sample().validate_consistency().is_empty());
    }

    #[test]
    fn test_detects_orphan_mismatch_and_cycle() {
        let mut h = sample();
        h.node_mut_for_test(&id("O2")).unwrap().parent_id = Some(id("gone"));
        let issues = h.validate_consistency();
        assert!(issues.contains(&HierarchyIssue::OrphanedParent {
            intent: id("O2"),
            parent: id("gone"),
        }));
        assert!(issues.contains(&HierarchyIssue::ParentChildMismatch {
            parent: id("T1"),
            child: id("O2"),
        }));

        let mut looped = sample();
        looped.node_mut_for_test(&id("S1")).unwrap().parent_id = Some(id("O1"));
        let issues = looped.validate_consistency();
        assert!(issues.contains(&HierarchyIssue::Cycle { intent: id("S1") }));
        assert!(issues.contains(&HierarchyIssue::Cycle { intent: id("O1") }));
    }
}
