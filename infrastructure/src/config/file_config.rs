//! Raw TOML configuration data types
//!
//! These structs mirror the config file section by section. Every field has
//! a default, so a partial file (or none at all) still loads.
//!
//! ```toml
//! [detector]
//! sweep_interval_secs = 30
//! comm_timeout_secs = 120
//! error_backoff_secs = 60
//!
//! [health]
//! enabled = true
//! interval_secs = 60
//! backoff_secs = 120
//!
//! [adaptation]
//! auto_execute_threshold = 0.5
//!
//! [history]
//! backend = "jsonl"            # or "memory"
//! path = "/var/lib/pact/history.jsonl"
//!
//! [alerts]
//! broadcast_capacity = 256
//! ```

use pact_application::ControlParams;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq)]
pub enum ConfigValidationError {
    #[error("{0} cannot be 0")]
    ZeroInterval(&'static str),

    #[error("unknown history backend '{0}' (expected 'memory' or 'jsonl')")]
    UnknownHistoryBackend(String),

    #[error("adaptation.auto_execute_threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),

    #[error("alerts.broadcast_capacity cannot be 0")]
    ZeroCapacity,
}

/// Where plan history is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryBackend {
    Memory,
    Jsonl,
}

impl HistoryBackend {
    pub fn as_str(&self) -> &str {
        match self {
            HistoryBackend::Memory => "memory",
            HistoryBackend::Jsonl => "jsonl",
        }
    }
}

impl std::str::FromStr for HistoryBackend {
    type Err = ConfigValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(HistoryBackend::Memory),
            "jsonl" => Ok(HistoryBackend::Jsonl),
            other => Err(ConfigValidationError::UnknownHistoryBackend(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDetectorConfig {
    pub sweep_interval_secs: u64,
    pub comm_timeout_secs: u64,
    pub error_backoff_secs: u64,
}

impl Default for FileDetectorConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: 30,
            comm_timeout_secs: 120,
            error_backoff_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileHealthConfig {
    pub enabled: bool,
    pub interval_secs: u64,
    pub backoff_secs: u64,
}

impl Default for FileHealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 60,
            backoff_secs: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAdaptationConfig {
    /// Plans above this success probability execute without an operator
    pub auto_execute_threshold: f64,
}

impl Default for FileAdaptationConfig {
    fn default() -> Self {
        Self {
            auto_execute_threshold: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileHistoryConfig {
    /// "memory" or "jsonl"
    pub backend: String,
    /// JSONL file; defaults to the platform data directory
    pub path: Option<PathBuf>,
}

impl Default for FileHistoryConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            path: None,
        }
    }
}

impl FileHistoryConfig {
    pub fn parse_backend(&self) -> Result<HistoryBackend, ConfigValidationError> {
        self.backend.parse()
    }

    /// Configured path, or `<data dir>/pact/history.jsonl`.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        self.path
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join("pact").join("history.jsonl")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAlertsConfig {
    /// Alerts buffered per subscriber before the oldest are dropped
    pub broadcast_capacity: usize,
}

impl Default for FileAlertsConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 256,
        }
    }
}

/// Complete configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub detector: FileDetectorConfig,
    pub health: FileHealthConfig,
    pub adaptation: FileAdaptationConfig,
    pub history: FileHistoryConfig,
    pub alerts: FileAlertsConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let intervals = [
            ("detector.sweep_interval_secs", self.detector.sweep_interval_secs),
            ("detector.comm_timeout_secs", self.detector.comm_timeout_secs),
            ("detector.error_backoff_secs", self.detector.error_backoff_secs),
            ("health.interval_secs", self.health.interval_secs),
            ("health.backoff_secs", self.health.backoff_secs),
        ];
        for (field, value) in intervals {
            if value == 0 {
                return Err(ConfigValidationError::ZeroInterval(field));
            }
        }

        self.history.parse_backend()?;

        let threshold = self.adaptation.auto_execute_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigValidationError::InvalidThreshold(threshold));
        }

        if self.alerts.broadcast_capacity == 0 {
            return Err(ConfigValidationError::ZeroCapacity);
        }

        Ok(())
    }

    /// Loop timing and thresholds for the application layer.
    pub fn to_control_params(&self) -> ControlParams {
        ControlParams::default()
            .with_sweep_interval(Duration::from_secs(self.detector.sweep_interval_secs))
            .with_comm_timeout(Duration::from_secs(self.detector.comm_timeout_secs))
            .with_error_backoff(Duration::from_secs(self.detector.error_backoff_secs))
            .with_health_enabled(self.health.enabled)
            .with_health_interval(Duration::from_secs(self.health.interval_secs))
            .with_health_backoff(Duration::from_secs(self.health.backoff_secs))
            .with_auto_adapt_threshold(self.adaptation.auto_execute_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[detector]
sweep_interval_secs = 10
comm_timeout_secs = 45
error_backoff_secs = 20

[health]
enabled = false
interval_secs = 15
backoff_secs = 30

[adaptation]
auto_execute_threshold = 0.7

[history]
backend = "jsonl"
path = "/tmp/pact-history.jsonl"

[alerts]
broadcast_capacity = 16
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.detector.comm_timeout_secs, 45);
        assert!(!config.health.enabled);
        assert_eq!(config.history.parse_backend().unwrap(), HistoryBackend::Jsonl);
        assert_eq!(
            config.history.resolved_path(),
            Some(PathBuf::from("/tmp/pact-history.jsonl"))
        );
        assert_eq!(config.alerts.broadcast_capacity, 16);
        assert!(config.validate().is_ok());

        let params = config.to_control_params();
        assert_eq!(params.sweep_interval, Duration::from_secs(10));
        assert_eq!(params.comm_timeout, Duration::from_secs(45));
        assert_eq!(params.health_backoff, Duration::from_secs(30));
        assert!(!params.health_enabled);
        assert_eq!(params.auto_adapt_threshold, 0.7);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: FileConfig = toml::from_str("[detector]\ncomm_timeout_secs = 90\n").unwrap();
        assert_eq!(config.detector.comm_timeout_secs, 90);
        assert_eq!(config.detector.sweep_interval_secs, 30);
        assert_eq!(config.history.backend, "memory");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_matches_control_params() {
        assert_eq!(
            FileConfig::default().to_control_params(),
            ControlParams::default()
        );
    }

    #[test]
    fn test_validate_zero_interval() {
        let mut config = FileConfig::default();
        config.health.interval_secs = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::ZeroInterval("health.interval_secs"))
        );
    }

    #[test]
    fn test_validate_unknown_backend() {
        let mut config = FileConfig::default();
        config.history.backend = "postgres".to_string();
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::UnknownHistoryBackend(
                "postgres".to_string()
            ))
        );
    }

    #[test]
    fn test_validate_threshold_and_capacity() {
        let mut config = FileConfig::default();
        config.adaptation.auto_execute_threshold = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigValidationError::InvalidThreshold(_))
        ));

        let mut config = FileConfig::default();
        config.alerts.broadcast_capacity = 0;
        assert_eq!(config.validate(), Err(ConfigValidationError::ZeroCapacity));
    }

    #[test]
    fn test_backend_parse_is_case_insensitive() {
        assert_eq!("JSONL".parse::<HistoryBackend>().unwrap(), HistoryBackend::Jsonl);
        assert_eq!(HistoryBackend::Memory.as_str(), "memory");
    }
}
