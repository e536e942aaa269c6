//! WindowReport / PipelineUpdate - Analytics Engine output
//!
//! One `WindowReport` per completed processing window; `PipelineUpdate` is
//! the unit written to sinks and the transport layer.

use serde::{Deserialize, Serialize};

use crate::{
    Alert, AnomalyResult, BaselineProfile, HeatMap, SensorId, SessionMetrics, WindowMetrics,
};

/// Everything produced by one window pass for one sensor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowReport {
    /// Sensor the window belongs to
    pub sensor_id: SensorId,

    /// Timestamp of the newest sample in the window (seconds)
    pub t_window: f64,

    /// Aggregated window metrics
    pub metrics: WindowMetrics,

    /// Regenerated heat map
    pub heat_map: HeatMap,

    /// Detection result; `None` when the pass was skipped (degenerate input)
    pub anomaly: Option<AnomalyResult>,

    /// Pass metadata for observability
    pub meta: ProcessMeta,
}

/// Per-pass metadata
///
/// Carried alongside every report so the observability layer can aggregate
/// drop counts and latency without reaching into component internals.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ProcessMeta {
    /// Samples in the processed window
    pub window_len: usize,

    /// Wall-clock duration of the pass (milliseconds)
    pub pass_ms: f64,

    /// True when the pass exceeded the end-to-end latency budget
    pub over_budget: bool,

    /// Samples evicted from this sensor's window since the last pass
    pub evicted_count: u64,

    /// Readings rejected at the quality gate since the last pass
    pub rejected_count: u64,
}

/// Outbound unit consumed by sinks and the transport layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineUpdate {
    /// Per-window metrics
    Metrics(WindowMetrics),

    /// Session-level metrics snapshot
    Session(SessionMetrics),

    /// Regenerated heat map
    HeatMap(HeatMap),

    /// Dispatched alert
    Alert(Alert),

    /// Refreshed baseline (handed to the storage collaborator)
    Baseline(BaselineProfile),
}

impl PipelineUpdate {
    /// Short label for logging/metrics
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineUpdate::Metrics(_) => "metrics",
            PipelineUpdate::Session(_) => "session",
            PipelineUpdate::HeatMap(_) => "heat_map",
            PipelineUpdate::Alert(_) => "alert",
            PipelineUpdate::Baseline(_) => "baseline",
        }
    }

    /// Sensor the update concerns, when it has one
    pub fn sensor_id(&self) -> Option<&SensorId> {
        match self {
            PipelineUpdate::Metrics(m) => Some(&m.sensor_id),
            PipelineUpdate::Session(_) => None,
            PipelineUpdate::HeatMap(h) => Some(&h.sensor_id),
            PipelineUpdate::Alert(a) => Some(&a.sensor_id),
            PipelineUpdate::Baseline(b) => Some(&b.sensor_id),
        }
    }
}
