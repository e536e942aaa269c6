//! Ingress quality gate.
//!
//! Every anomaly confidence and session metric downstream must derive only
//! from samples that passed this gate: corrupt or low-quality readings are
//! rejected (and counted) before they can touch filter state.

use contracts::{PipelineError, SensorReading};

/// Reading validation gate
#[derive(Debug, Clone, Copy)]
pub struct QualityGate {
    floor: u8,
}

impl QualityGate {
    /// Create a gate with the given quality floor (0..=100)
    pub fn new(floor: u8) -> Self {
        Self { floor }
    }

    /// Configured floor
    pub fn floor(&self) -> u8 {
        self.floor
    }

    /// Validate one reading
    ///
    /// # Errors
    /// Returns a validation error for readings scoring below the floor or
    /// carrying empty/non-finite values. The reading is dropped, never fixed.
    pub fn check(&self, reading: &SensorReading) -> Result<(), PipelineError> {
        if reading.quality_score < self.floor {
            return Err(PipelineError::invalid_reading(
                reading.sensor_id.as_str(),
                format!(
                    "quality score {} below floor {}",
                    reading.quality_score, self.floor
                ),
            ));
        }

        if !reading.is_well_formed() {
            return Err(PipelineError::invalid_reading(
                reading.sensor_id.as_str(),
                "empty or non-finite raw values",
            ));
        }

        if !reading.timestamp.is_finite() || reading.timestamp < 0.0 {
            return Err(PipelineError::invalid_reading(
                reading.sensor_id.as_str(),
                format!("bad timestamp {}", reading.timestamp),
            ));
        }

        Ok(())
    }
}

impl Default for QualityGate {
    fn default() -> Self {
        Self { floor: 50 }
    }
}
