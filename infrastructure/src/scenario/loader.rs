//! Scenario loading and seeding

use super::file::{ScenarioCoordination, ScenarioFile};
use chrono::{DateTime, Utc};
use pact_application::MissionControl;
use pact_domain::DomainError;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Could not read scenario {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid scenario {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Scenario rejected: {0}")]
    Domain(#[from] DomainError),

    #[error("Unknown coordination '{name}' (available: {})", .available.join(", "))]
    UnknownCoordination {
        name: String,
        available: Vec<String>,
    },
}

impl ScenarioError {
    pub fn is_unknown_coordination(&self) -> bool {
        matches!(self, ScenarioError::UnknownCoordination { .. })
    }
}

/// What [`ScenarioLoader::seed`] put into mission control.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub agents: usize,
    pub missions: usize,
    pub intents: usize,
}

pub struct ScenarioLoader;

impl ScenarioLoader {
    pub fn load(path: &Path) -> Result<ScenarioFile, ScenarioError> {
        let content = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scenario = Self::parse(&content).map_err(|source| ScenarioError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            "Loaded scenario {}: {} agents, {} missions, {} intents",
            path.display(),
            scenario.agents.len(),
            scenario.missions.len(),
            scenario.intents.len()
        );
        Ok(scenario)
    }

    pub fn parse(content: &str) -> Result<ScenarioFile, toml::de::Error> {
        toml::from_str(content)
    }

    /// Register every agent, mission and intent, in that order.
    ///
    /// Intents are added in file order, so parents must come first.
    /// Times relative to "now" (silence, deadlines) are anchored at `now`.
    pub async fn seed(
        scenario: &ScenarioFile,
        control: &MissionControl,
        now: DateTime<Utc>,
    ) -> Result<SeedSummary, ScenarioError> {
        for agent in &scenario.agents {
            control.register_agent(agent.to_agent(now)).await;
        }
        for mission in &scenario.missions {
            control.register_mission(mission.to_mission(now)).await;
        }
        for intent in &scenario.intents {
            control.add_intent_node(intent.to_node(now)).await?;
        }

        let summary = SeedSummary {
            agents: scenario.agents.len(),
            missions: scenario.missions.len(),
            intents: scenario.intents.len(),
        };
        info!(
            "Seeded {} agent(s), {} mission(s), {} intent(s)",
            summary.agents, summary.missions, summary.intents
        );
        Ok(summary)
    }

    pub fn coordination<'a>(
        scenario: &'a ScenarioFile,
        name: &str,
    ) -> Result<&'a ScenarioCoordination, ScenarioError> {
        scenario
            .coordinations
            .get(name)
            .ok_or_else(|| ScenarioError::UnknownCoordination {
                name: name.to_string(),
                available: scenario.coordinations.keys().cloned().collect(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pact_application::{ControlParams, CoordinateAgentsUseCase, FailureDetector};
    use pact_domain::{
        AgentId, AgentStatus, CoordinationResult, Criticality, IntentId, IntentStatus,
        IntentType, MissionId, MissionStatus, TaskComplexity, TaskPriority,
    };
    use std::sync::Arc;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SCENARIO: &str = r#"
[[agents]]
id = "SAT-1"
platform = "leo"
capabilities = ["imaging", "relay"]
resource_level = 0.8
silent_secs = 30
objectives = ["OBJ_1"]

[agents.resource_limits]
cpu = 2.0

[agents.position]
lat = 10.0
lon = 20.0
alt = 550.0

[[agents]]
id = "SAT-2"
platform = "leo"
capabilities = ["relay"]
status = "MAINTENANCE"

[[missions]]
id = "M1"
title = "Coastal survey"
agents = ["SAT-1", "SAT-2"]

[missions.formation]
formation_type = "line"
spacing_meters = 80.0

[[missions.objectives]]
id = "OBJ_1"
name = "Image coastline"
priority = "high"
required_capabilities = ["imaging"]

[[intents]]
id = "S1"
name = "Map the coast"
type = "STRATEGIC"
priority = 0.9

[[intents]]
id = "T1"
name = "Northern pass"
type = "TACTICAL"
parent = "S1"
assets = ["SAT-1"]
deadline_minutes = -5

[coordinations.survey]
agent_a = "SAT-1"
agent_b = "SAT-2"

[coordinations.survey.task]
shared_objective = "coastal imaging"
complexity = "high"

[coordinations.survey.task.agent_a]
objective = "image the coast"
role = "primary"

[coordinations.survey.mission]
criticality = "high"
"#;

    #[test]
    fn test_parse_full_scenario() {
        let scenario = ScenarioLoader::parse(SCENARIO).unwrap();
        assert_eq!(scenario.agents.len(), 2);
        assert_eq!(scenario.agents[0].resource_limits["cpu"], 2.0);
        assert_eq!(scenario.agents[0].position.alt, 550.0);
        assert_eq!(scenario.agents[1].status, AgentStatus::Maintenance);
        assert_eq!(scenario.agents[1].resource_level, 1.0);

        let mission = &scenario.missions[0];
        assert_eq!(mission.status, MissionStatus::Active);
        assert_eq!(mission.objectives[0].priority, TaskPriority::High);
        assert_eq!(mission.formation.spacing_meters, 80.0);

        assert_eq!(scenario.intents[1].intent_type, IntentType::Tactical);
        assert_eq!(scenario.intents[1].parent, Some(IntentId::new("S1")));
        assert_eq!(scenario.intents[0].priority, 0.9);

        let survey = ScenarioLoader::coordination(&scenario, "survey").unwrap();
        assert_eq!(survey.agent_b, AgentId::new("SAT-2"));
        assert_eq!(survey.task.complexity, TaskComplexity::High);
        assert_eq!(survey.task.agent_a.role.as_deref(), Some("primary"));
        assert_eq!(survey.task.agent_b.confidence, 0.8);
        assert_eq!(survey.mission.criticality, Criticality::High);
        assert_eq!(survey.mission.mission_id, "default_mission");
    }

    #[test]
    fn test_unknown_coordination_lists_available() {
        let scenario = ScenarioLoader::parse(SCENARIO).unwrap();
        let err = ScenarioLoader::coordination(&scenario, "relay").unwrap_err();
        assert!(err.is_unknown_coordination());
        assert_eq!(
            err.to_string(),
            "Unknown coordination 'relay' (available: survey)"
        );
    }

    #[test]
    fn test_empty_scenario_is_valid() {
        let scenario = ScenarioLoader::parse("").unwrap();
        assert_eq!(scenario, ScenarioFile::default());
    }

    #[test]
    fn test_load_reports_parse_errors_with_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[[agents]]\nplatform = \"leo\"").unwrap();
        let err = ScenarioLoader::load(file.path()).unwrap_err();
        assert!(matches!(err, ScenarioError::Parse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ScenarioLoader::load(Path::new("/nonexistent/scenario.toml")).unwrap_err();
        assert!(matches!(err, ScenarioError::Io { .. }));
    }

    #[tokio::test]
    async fn test_seed_populates_mission_control() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", SCENARIO).unwrap();
        let scenario = ScenarioLoader::load(file.path()).unwrap();

        let control = MissionControl::new(ControlParams::default());
        let now = Utc::now();
        let summary = ScenarioLoader::seed(&scenario, &control, now).await.unwrap();
        assert_eq!(
            summary,
            SeedSummary {
                agents: 2,
                missions: 1,
                intents: 2
            }
        );

        let sat = control.agent(&AgentId::new("SAT-1")).await.unwrap();
        assert_eq!(sat.time_since_contact(now).num_seconds(), 30);
        let mission = control.mission_snapshot(&MissionId::new("M1")).await.unwrap();
        assert_eq!(mission.assigned_agents.len(), 2);

        let t1 = control.intent(&IntentId::new("T1")).await.unwrap();
        assert_eq!(t1.status, IntentStatus::Active);
        assert!(t1.is_overdue(now));
    }

    #[tokio::test]
    async fn test_sample_constellation_runs_end_to_end() {
        let scenario =
            ScenarioLoader::parse(include_str!("../../../cli/scenarios/constellation.toml"))
                .unwrap();
        let control = Arc::new(MissionControl::new(ControlParams::default()));
        ScenarioLoader::seed(&scenario, &control, Utc::now())
            .await
            .unwrap();

        let coordinate = CoordinateAgentsUseCase::new(control.clone());
        for (name, expected) in [
            ("survey", CoordinationResult::Success),
            ("hesitant", CoordinationResult::FailedL1Validation),
            ("rushed", CoordinationResult::FailedL3Alignment),
        ] {
            let request = ScenarioLoader::coordination(&scenario, name).unwrap();
            let outcome = coordinate
                .execute(
                    &request.agent_a,
                    &request.agent_b,
                    &request.task,
                    &request.mission,
                )
                .await;
            assert_eq!(outcome.result, expected, "coordination {name}");
        }

        let responses = FailureDetector::new(control.clone())
            .simulate_failure(&AgentId::new("D1"), Utc::now())
            .await
            .unwrap();
        assert_eq!(responses.len(), 1);
        let plan = responses[0].reassignment.plan().unwrap();
        assert_eq!(plan.replacement_agents[0], AgentId::new("R1"));
        let mission = control.mission_snapshot(&MissionId::new("M1")).await.unwrap();
        assert_eq!(mission.status, MissionStatus::Active);
        assert!(!mission.has_agent(&AgentId::new("D1")));
    }

    #[tokio::test]
    async fn test_seed_rejects_orphan_intent() {
        let scenario = ScenarioLoader::parse(
            r#"
[[intents]]
id = "T1"
name = "Orphan"
type = "TACTICAL"
parent = "S404"
"#,
        )
        .unwrap();
        let control = MissionControl::new(ControlParams::default());
        let err = ScenarioLoader::seed(&scenario, &control, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ScenarioError::Domain(_)));
    }
}
