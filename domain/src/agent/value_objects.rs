//! Agent value objects - immutable types describing a coordinated agent.
//!
//! # Identifiers
//! - [`AgentId`] - Unique identifier for an agent (drone, satellite, service)
//!
//! # Capability and Resources
//! - [`CapabilitySet`] - Ordered set of named capabilities
//! - [`ResourceLimits`] - Named resource limits, fractions of capacity
//! - [`Position`] - Last known geographic position

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Unique identifier for an agent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    /// Creates an AgentId from an existing string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T: Into<String>> From<T> for AgentId {
    fn from(s: T) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Named capabilities an agent offers.
///
/// Kept ordered so that anything derived from it (logs, plans, scores)
/// is reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet(BTreeSet<String>);

impl CapabilitySet {
    pub fn new<I, S>(capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(capabilities.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, capability: &str) -> bool {
        self.0.contains(capability)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of capabilities both sets share.
    pub fn shared_count(&self, other: &CapabilitySet) -> usize {
        self.0.intersection(&other.0).count()
    }

    /// Number of capabilities held by exactly one of the two sets.
    pub fn distinct_count(&self, other: &CapabilitySet) -> usize {
        self.0.symmetric_difference(&other.0).count()
    }

    /// Capabilities of `self` that also appear in `names`.
    pub fn matching<'a>(&'a self, names: &'a [String]) -> impl Iterator<Item = &'a str> {
        names
            .iter()
            .map(String::as_str)
            .filter(move |name| self.0.contains(*name))
    }
}

impl<S: Into<String>> FromIterator<S> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Named resource limits (cpu, memory, bandwidth, ...) as fractions of
/// nominal capacity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceLimits(BTreeMap<String, f64>);

impl ResourceLimits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, name: impl Into<String>, value: f64) -> Self {
        self.0.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Pairs of values for every resource named by both sides.
    pub fn shared_with<'a>(
        &'a self,
        other: &'a ResourceLimits,
    ) -> impl Iterator<Item = (&'a str, f64, f64)> + 'a {
        self.0
            .iter()
            .filter_map(move |(name, a)| other.get(name).map(|b| (name.as_str(), *a, b)))
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for ResourceLimits {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Geographic position (degrees, metres above ground).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
}

impl Position {
    pub fn new(lat: f64, lon: f64, alt: f64) -> Self {
        Self { lat, lon, alt }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4}, {:.0}m)", self.lat, self.lon, self.alt)
    }
}
