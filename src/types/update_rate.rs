//! Update rate control for snapshot streams

use serde::{Deserialize, Serialize};

/// Update rate for snapshot subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UpdateRate {
    /// Every composite pass is delivered
    Native,

    /// Throttled to maximum Hz
    /// If the requested rate exceeds the source rate, Native is used
    Max(u32),
}

impl UpdateRate {
    /// Normalize rate against source frequency
    /// Returns effective rate to use
    pub fn normalize(self, source_hz: f64) -> Self {
        match self {
            UpdateRate::Native => UpdateRate::Native,
            UpdateRate::Max(0) => UpdateRate::Native,
            UpdateRate::Max(hz) if hz as f64 >= source_hz => UpdateRate::Native,
            UpdateRate::Max(hz) => UpdateRate::Max(hz),
        }
    }

    /// Check if throttling is needed
    pub fn needs_throttle(self, source_hz: f64) -> bool {
        match self.normalize(source_hz) {
            UpdateRate::Native => false,
            UpdateRate::Max(_) => true,
        }
    }

    /// Get throttle interval if needed
    pub fn throttle_interval(self, source_hz: f64) -> Option<std::time::Duration> {
        match self.normalize(source_hz) {
            UpdateRate::Native => None,
            UpdateRate::Max(hz) => Some(std::time::Duration::from_secs_f64(1.0 / hz as f64)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn rates_at_or_above_source_are_native() {
        assert_eq!(UpdateRate::Max(10).normalize(10.0), UpdateRate::Native);
        assert_eq!(UpdateRate::Max(0).normalize(10.0), UpdateRate::Native);
        assert!(!UpdateRate::Max(30).needs_throttle(10.0));
    }

    #[test]
    fn slower_rates_throttle() {
        assert_eq!(UpdateRate::Max(4).throttle_interval(10.0), Some(Duration::from_millis(250)));
        assert_eq!(UpdateRate::Native.throttle_interval(10.0), None);
    }
}
