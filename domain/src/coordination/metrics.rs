//! Rolling coordination metrics.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoordinationMetrics {
    pub total_coordinations: u64,
    pub successful_coordinations: u64,
    pub failed_coordinations: u64,
    /// Rolling average processing time in milliseconds
    pub average_processing_time_ms: f64,
}

impl CoordinationMetrics {
    pub fn record(&mut self, success: bool, processing_time: Duration) {
        self.total_coordinations += 1;
        if success {
            self.successful_coordinations += 1;
        } else {
            self.failed_coordinations += 1;
        }

        let n = self.total_coordinations as f64;
        let sample = processing_time.as_secs_f64() * 1000.0;
        self.average_processing_time_ms =
            (self.average_processing_time_ms * (n - 1.0) + sample) / n;
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_coordinations == 0 {
            return 0.0;
        }
        self.successful_coordinations as f64 / self.total_coordinations as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rolling_average() {
        let mut metrics = CoordinationMetrics::default();
        metrics.record(true, Duration::from_millis(10));
        metrics.record(false, Duration::from_millis(30));
        metrics.record(true, Duration::from_millis(20));

        assert_eq!(metrics.total_coordinations, 3);
        assert_eq!(metrics.successful_coordinations, 2);
        assert_eq!(metrics.failed_coordinations, 1);
        assert!((metrics.average_processing_time_ms - 20.0).abs() < 1e-9);
        assert!((metrics.success_rate() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_success_rate() {
        assert_eq!(CoordinationMetrics::default().success_rate(), 0.0);
    }
}
