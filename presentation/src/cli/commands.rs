//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored, human-readable text
    Text,
    /// Pretty-printed JSON
    Json,
}

/// CLI arguments for pact-coordinator
#[derive(Parser, Debug)]
#[command(name = "pact")]
#[command(author, version, about = "Intent-layered coordination for autonomous agent teams")]
#[command(long_about = r#"
pact coordinates pairs of autonomous agents through four intent layers
(individual, co-intent, core intent, collab intent), detects agents that
stop reporting, reassigns their objectives and adapts the intent hierarchy.

World state (agents, missions, intents, named coordinations) is loaded
from a scenario file.

Configuration files are loaded from (in priority order):
1. --config <path>          Explicit config file
2. ./pact.toml              Project-level config
3. ~/.config/pact/config.toml   Global config

Example:
  pact -s constellation.toml coordinate survey
  pact -s constellation.toml simulate-failure SAT-1
  pact -s constellation.toml -v monitor --for-secs 60
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Scenario file describing agents, missions and intents
    #[arg(short, long, value_name = "PATH", global = true)]
    pub scenario: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run a named coordination from the scenario through all four layers
    Coordinate {
        /// Coordination name (a key under [coordinations] in the scenario)
        name: String,

        /// Run the coordination this many times concurrently
        #[arg(long, default_value_t = 1)]
        repeat: usize,
    },

    /// Force an agent past the contact timeout and handle the failure
    SimulateFailure {
        /// Agent to silence
        agent: String,
    },

    /// Fail the intents staffed by the given assets and plan an adaptation
    Adapt {
        /// Event that triggered the adaptation
        #[arg(long, default_value = "MANUAL")]
        trigger: String,

        /// Mission whose critical section the adaptation runs in
        #[arg(long, value_name = "ID")]
        mission: Option<String>,

        /// Lost assets
        #[arg(required = true, value_name = "AGENT")]
        assets: Vec<String>,
    },

    /// Run one intent health sweep and print the hierarchy's health
    Health,

    /// Run the failure detector and health monitor until interrupted
    Monitor {
        /// Stop after this many seconds instead of waiting for Ctrl-C
        #[arg(long, value_name = "SECS")]
        for_secs: Option<u64>,
    },

    /// Show configuration file locations and exit
    ShowConfig,
}
