//! Component tuning configuration shared across crates.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{SensorId, SensorPlacement};

/// Stream filter tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Process noise (Q)
    pub process_noise: f64,
    /// Measurement noise (R) at the reference cutoff
    pub measurement_noise: f64,
}

/// Cutoff at which `measurement_noise` applies unscaled
pub const REFERENCE_CUTOFF_HZ: f64 = 5.0;

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            process_noise: 0.1,
            measurement_noise: 0.1,
        }
    }
}

impl FilterConfig {
    /// Effective measurement noise for a calibrated cutoff.
    ///
    /// A higher cutoff trusts measurements more (less smoothing), so R
    /// scales inversely with the cutoff relative to the reference.
    pub fn measurement_noise_for(&self, cutoff_hz: f64) -> f64 {
        let cutoff = cutoff_hz.max(1e-3);
        self.measurement_noise * (REFERENCE_CUTOFF_HZ / cutoff)
    }
}

/// Window buffer tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Fixed window capacity; matches the downstream batch size
    pub capacity: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { capacity: 1024 }
    }
}

/// Anomaly detector tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Moving-average sub-window width
    pub sub_window: usize,
    /// Confidence floor for actionable results
    pub anomaly_threshold: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            sub_window: 10,
            anomaly_threshold: 0.85,
        }
    }
}

/// Heat map tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatMapConfig {
    /// Square grid side length
    pub resolution: u32,
}

impl Default for HeatMapConfig {
    fn default() -> Self {
        Self { resolution: 32 }
    }
}

/// Baseline refresh tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineConfig {
    /// Seconds between baseline recomputations
    pub refresh_interval_s: f64,
}

impl Default for BaselineConfig {
    fn default() -> Self {
        Self {
            refresh_interval_s: 300.0,
        }
    }
}

/// Transport reliability layer tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Remote endpoint, `host:port`
    pub endpoint: String,

    /// Heartbeat interval (seconds); two missed acks force a reconnect
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_s: f64,

    /// Reconnect backoff base (milliseconds)
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Reconnect backoff cap (seconds)
    #[serde(default = "default_backoff_cap_s")]
    pub backoff_cap_s: u64,

    /// Reconnect attempts before the link is terminally down
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Bounded outbound queue capacity (oldest dropped on overflow)
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Gzip-compress outbound payloads
    #[serde(default = "default_compression")]
    pub compression: bool,
}

fn default_heartbeat_interval() -> f64 {
    5.0
}

fn default_backoff_base_ms() -> u64 {
    500
}

fn default_backoff_cap_s() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    8
}

fn default_queue_capacity() -> usize {
    256
}

fn default_compression() -> bool {
    true
}

/// Assembled configuration for the analytics engine
///
/// Built from a `SessionBlueprint`; one instance drives every per-sensor
/// processing unit.
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    /// Readings below this quality score are rejected before filtering
    pub quality_floor: u8,

    /// End-to-end budget from window-full to emitted report (milliseconds)
    pub latency_budget_ms: f64,

    /// Stream filter tuning
    pub filter: FilterConfig,

    /// Window buffer tuning
    pub window: WindowConfig,

    /// Anomaly detector tuning
    pub detector: DetectorConfig,

    /// Heat map tuning
    pub heatmap: HeatMapConfig,

    /// Baseline refresh tuning
    pub baseline: BaselineConfig,

    /// Body placement per sensor
    pub placements: HashMap<SensorId, SensorPlacement>,

    /// Expected interval per sensor (seconds)
    pub sensor_intervals: HashMap<SensorId, f64>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            quality_floor: 50,
            latency_budget_ms: 100.0,
            filter: FilterConfig::default(),
            window: WindowConfig::default(),
            detector: DetectorConfig::default(),
            heatmap: HeatMapConfig::default(),
            baseline: BaselineConfig::default(),
            placements: HashMap::new(),
            sensor_intervals: HashMap::new(),
        }
    }
}
