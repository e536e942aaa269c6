//! SensorReading - Ingestion input
//!
//! Raw timestamped sample produced by the garment edge layer.

use serde::{Deserialize, Serialize};

use crate::SensorId;

/// Sensor channel kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorChannel {
    /// Inertial measurement unit (3-axis accel + gyro), nominal 200 Hz
    Imu,
    /// Optical time-of-flight distance sensor, nominal 100 Hz
    Tof,
}

impl SensorChannel {
    /// Nominal sampling rate for the channel kind (Hz)
    pub fn nominal_rate_hz(&self) -> f64 {
        match self {
            SensorChannel::Imu => 200.0,
            SensorChannel::Tof => 100.0,
        }
    }
}

/// Raw sensor reading
///
/// Immutable once captured. Timestamped and quality-scored by the edge
/// layer before it reaches the core; the core rejects readings below the
/// configured quality floor before filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorReading {
    /// Sensor ID
    pub sensor_id: SensorId,

    /// Channel kind
    pub channel: SensorChannel,

    /// Session-relative timestamp (seconds, f64) - primary clock
    pub timestamp: f64,

    /// Raw channel values (IMU: ax, ay, az, gx, gy, gz; ToF: distance, intensity)
    pub raw_values: Vec<f64>,

    /// Edge-assigned quality score, 0..=100
    pub quality_score: u8,
}

impl SensorReading {
    /// True when every raw value is finite and at least one is present
    pub fn is_well_formed(&self) -> bool {
        !self.raw_values.is_empty() && self.raw_values.iter().all(|v| v.is_finite())
    }
}
