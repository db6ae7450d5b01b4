//! Control parameters: background loop timing and automation thresholds.
//!
//! [`ControlParams`] groups the static parameters that drive the failure
//! detector and the intent health monitor. These are application-layer
//! concerns, not domain policy.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Background loop control parameters.
///
/// | Loop | Interval | Timeout | Back-off |
/// |------|----------|---------|----------|
/// | Failure detector | `sweep_interval` | `comm_timeout` | `error_backoff` |
/// | Intent health monitor | `health_interval` | - | `health_backoff` |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlParams {
    /// Time between failure-detector sweeps.
    pub sweep_interval: Duration,
    /// Silence after which an agent is declared communication-failed.
    pub comm_timeout: Duration,
    /// Pause after a detector sweep fails before resuming.
    pub error_backoff: Duration,
    /// Whether the intent health monitor runs at all.
    pub health_enabled: bool,
    /// Time between intent health sweeps.
    pub health_interval: Duration,
    /// Pause after a health sweep fails before resuming.
    pub health_backoff: Duration,
    /// Adaptation plans above this success probability execute automatically.
    pub auto_adapt_threshold: f64,
}

impl Default for ControlParams {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(30),
            comm_timeout: Duration::from_secs(120),
            error_backoff: Duration::from_secs(60),
            health_enabled: true,
            health_interval: Duration::from_secs(60),
            health_backoff: Duration::from_secs(120),
            auto_adapt_threshold: 0.5,
        }
    }
}

impl ControlParams {
    // ==================== Builder Methods ====================

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    pub fn with_comm_timeout(mut self, timeout: Duration) -> Self {
        self.comm_timeout = timeout;
        self
    }

    pub fn with_error_backoff(mut self, backoff: Duration) -> Self {
        self.error_backoff = backoff;
        self
    }

    pub fn with_health_enabled(mut self, enabled: bool) -> Self {
        self.health_enabled = enabled;
        self
    }

    pub fn with_health_interval(mut self, interval: Duration) -> Self {
        self.health_interval = interval;
        self
    }

    pub fn with_health_backoff(mut self, backoff: Duration) -> Self {
        self.health_backoff = backoff;
        self
    }

    pub fn with_auto_adapt_threshold(mut self, threshold: f64) -> Self {
        self.auto_adapt_threshold = threshold;
        self
    }

    /// The communication timeout as a chrono duration, for timestamp math.
    pub fn comm_timeout_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.comm_timeout).unwrap_or(chrono::Duration::MAX)
    }
}
