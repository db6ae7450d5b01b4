//! Application layer for pact-coordinator
//!
//! This crate contains use cases, port definitions, the shared
//! [`MissionControl`] context and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod context;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ControlParams;
pub use context::{CoordinationRecord, MissionControl, PerformanceMetrics};
pub use ports::{
    history::{
        AdaptationRecord, HistoryEntry, HistoryError, HistoryStore, InMemoryHistory,
        ReassignmentRecord,
    },
    notification::{Alert, AlertSeverity, NoNotification, NotificationSink},
    telemetry::{CoordinationSample, NoTelemetry, TelemetrySink},
};
pub use use_cases::adapt::{AdaptIntentsUseCase, AdaptationError, AdaptationOutcome};
pub use use_cases::coordinate::{CoordinateAgentsUseCase, CoordinationError};
pub use use_cases::detect_failures::{FailureDetector, FailureResponse};
pub use use_cases::monitor_health::{HealthReport, IntentHealthMonitor};
pub use use_cases::reassign::{ReassignAgentsUseCase, ReassignmentError, ReassignmentOutcome};
