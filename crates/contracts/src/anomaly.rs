//! AnomalyResult - Anomaly Detector output
//!
//! Created per detection pass, consumed once by the alert pipeline and
//! otherwise discarded; persistence is a collaborator concern.

use serde::{Deserialize, Serialize};

use crate::SensorId;

/// Classified anomaly shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// Deviation beyond 2x the baseline spread
    Outlier,
    /// Slow wander inside normal spread
    Drift,
    /// Deviation beyond 3x the baseline spread
    SpikePattern,
    /// Deviation collapsed below half the baseline spread
    Discontinuity,
}

/// One detection pass result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyResult {
    /// Sensor the window came from
    pub sensor_id: SensorId,

    /// Timestamp of the newest sample in the window (seconds)
    pub timestamp: f64,

    /// Detection confidence; only results at or above the configured
    /// threshold are forwarded to the alert pipeline
    pub confidence: f64,

    /// Classified shape
    pub kind: AnomalyKind,

    /// Smoothed current level (sub-window moving average)
    pub magnitude: f64,

    /// Max deviation expressed in units of baseline standard deviation
    pub baseline_deviation: f64,
}

impl AnomalyResult {
    /// True when this result should reach the alert pipeline
    pub fn is_actionable(&self, threshold: f64) -> bool {
        self.confidence >= threshold
    }
}
