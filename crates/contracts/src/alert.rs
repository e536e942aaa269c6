//! Alert - Alert Pipeline output
//!
//! Immutable after dispatch except for the `acknowledged` flag, which is set
//! by the UI/notification collaborator, never by the core.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{AnomalyResult, MetricKey, SensorId};

/// Alert severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// Alert category; determines the dedup cooldown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCategory {
    /// Potential injury-risk signal
    Medical,
    /// Hardware or data-quality fault
    SensorFault,
    /// Everything else (load, asymmetry, threshold crossings)
    General,
}

impl AlertCategory {
    /// Minimum interval between dispatched alerts for one (sensor, category)
    /// pair. Repeated triggers inside the window are suppressed, not queued.
    pub fn cooldown(&self) -> Duration {
        match self {
            AlertCategory::Medical => Duration::from_secs(300),
            AlertCategory::SensorFault => Duration::from_secs(5),
            AlertCategory::General => Duration::from_secs(1),
        }
    }
}

/// What triggered the alert
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertPayload {
    /// Actionable anomaly detection
    Anomaly(AnomalyResult),

    /// A session metric crossed its configured threshold
    MetricThreshold {
        key: MetricKey,
        value: f64,
        threshold: f64,
    },

    /// Sensor-level fault (stale stream, rejected readings, etc.)
    SensorError { message: String },
}

/// Dispatched alert record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    /// Monotonically increasing id assigned at dispatch
    pub id: u64,

    /// Category used for dedup/cooldown
    pub category: AlertCategory,

    /// Derived severity
    pub severity: AlertSeverity,

    /// Sensor the trigger came from
    pub sensor_id: SensorId,

    /// Trigger timestamp (seconds)
    pub timestamp: f64,

    /// Trigger details
    pub payload: AlertPayload,

    /// Set by the notification collaborator once a human has seen it
    pub acknowledged: bool,
}

impl Alert {
    /// Mark the alert acknowledged (collaborator-side mutation)
    pub fn acknowledge(&mut self) {
        self.acknowledged = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldowns() {
        assert_eq!(AlertCategory::Medical.cooldown(), Duration::from_secs(300));
        assert_eq!(AlertCategory::SensorFault.cooldown(), Duration::from_secs(5));
        assert_eq!(AlertCategory::General.cooldown(), Duration::from_secs(1));
    }

    #[test]
    fn test_severity_ordering() {
        assert!(AlertSeverity::Critical > AlertSeverity::High);
        assert!(AlertSeverity::High > AlertSeverity::Medium);
        assert!(AlertSeverity::Medium > AlertSeverity::Low);
    }
}
