//! Configuration file loading for pact-coordinator
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. Project root: `./pact.toml` or `./.pact.toml`
//! 3. Global: `$XDG_CONFIG_HOME/pact/config.toml` (or `~/.config/pact/config.toml`)
//! 4. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileAdaptationConfig, FileAlertsConfig, FileConfig,
    FileDetectorConfig, FileHealthConfig, FileHistoryConfig, HistoryBackend,
};
pub use loader::ConfigLoader;
