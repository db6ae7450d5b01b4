//! Scenario files
//!
//! A scenario describes a constellation of agents, the missions they fly,
//! the intent hierarchy behind them and a set of named coordination
//! requests. The CLI seeds a [`pact_application::MissionControl`] from one.

mod file;
mod loader;

pub use file::{
    ScenarioAgent, ScenarioCoordination, ScenarioFile, ScenarioIntent, ScenarioMission,
};
pub use loader::{ScenarioError, ScenarioLoader, SeedSummary};
