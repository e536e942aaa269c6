//! Calibration parameters and store
//!
//! Per-sensor calibration is mutated only through `CalibrationStore::apply`,
//! which validates every field and rejects out-of-range values atomically -
//! values are never silently clamped.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{PipelineError, SensorId};

/// Per-sensor calibration parameters
///
/// Every range below is a hard contract: writes outside it fail with a
/// validation error and leave the prior calibration untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CalibrationParams {
    /// ToF sensor gain multiplier
    #[validate(range(min = 1.0, max = 16.0))]
    pub tof_gain: f64,

    /// IMU drift correction (degrees)
    #[validate(range(min = 0.1, max = 2.0))]
    pub imu_drift_correction: f64,

    /// Pressure alert threshold (kg)
    #[validate(range(min = 0.1, max = 5.0))]
    pub pressure_threshold: f64,

    /// Processing window span (milliseconds)
    #[validate(range(min = 50, max = 500))]
    pub sample_window_ms: u32,

    /// Stream filter cutoff (Hz)
    #[validate(range(min = 0.5, max = 10.0))]
    pub filter_cutoff_hz: f64,
}

impl Default for CalibrationParams {
    fn default() -> Self {
        Self {
            tof_gain: 4.0,
            imu_drift_correction: 0.5,
            pressure_threshold: 2.0,
            sample_window_ms: 250,
            filter_cutoff_hz: 5.0,
        }
    }
}

impl CalibrationParams {
    /// Validate all ranges, mapping the first violation to a pipeline error
    pub fn check(&self) -> Result<(), PipelineError> {
        self.validate().map_err(|errors| {
            match errors.field_errors().into_iter().next() {
                Some((field, kinds)) => {
                    let message = kinds
                        .first()
                        .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                        .unwrap_or_else(|| "value out of range".to_string());
                    PipelineError::calibration_range(field.to_string(), message)
                }
                None => PipelineError::calibration_range("calibration", "value out of range"),
            }
        })
    }
}

/// Calibration store
///
/// Holds the active calibration per sensor plus a default set for sensors
/// that have never been calibrated. Single writer, multiple readers; a write
/// is applied only after the whole parameter set validates (no partial
/// application).
#[derive(Debug, Default)]
pub struct CalibrationStore {
    defaults: CalibrationParams,
    per_sensor: RwLock<HashMap<SensorId, CalibrationParams>>,
}

impl CalibrationStore {
    /// Create a store with the given defaults
    pub fn new(defaults: CalibrationParams) -> Self {
        Self {
            defaults,
            per_sensor: RwLock::new(HashMap::new()),
        }
    }

    /// Apply new calibration for a sensor
    ///
    /// Validates every field first; an out-of-range value rejects the whole
    /// set and the previous calibration stays active.
    pub fn apply(&self, sensor_id: SensorId, params: CalibrationParams) -> Result<(), PipelineError> {
        params.check()?;
        self.per_sensor
            .write()
            .expect("calibration lock poisoned")
            .insert(sensor_id, params);
        Ok(())
    }

    /// Active calibration for a sensor (defaults if never calibrated)
    pub fn get(&self, sensor_id: &str) -> CalibrationParams {
        self.per_sensor
            .read()
            .expect("calibration lock poisoned")
            .get(sensor_id)
            .cloned()
            .unwrap_or_else(|| self.defaults.clone())
    }
}
