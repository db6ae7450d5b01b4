//! Infrastructure layer for pact-coordinator
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, configuration file loading and
//! scenario loading.

pub mod alerts;
pub mod config;
pub mod history;
pub mod scenario;
pub mod telemetry;

// Re-export commonly used types
pub use alerts::{
    AlertBusError, AlertReceiver, BroadcastAlertSink, FanoutAlertSink, TracingAlertSink,
};
pub use config::{
    ConfigLoader, ConfigValidationError, FileAdaptationConfig, FileAlertsConfig, FileConfig,
    FileDetectorConfig, FileHealthConfig, FileHistoryConfig, HistoryBackend,
};
pub use history::JsonlHistoryStore;
pub use scenario::{
    ScenarioAgent, ScenarioCoordination, ScenarioError, ScenarioFile, ScenarioIntent,
    ScenarioLoader, ScenarioMission, SeedSummary,
};
pub use telemetry::TracingTelemetrySink;
