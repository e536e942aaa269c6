//! HeatMap - Heat Map Generator output
//!
//! Sparse cell list regenerated in full each update cycle (no diffing).

use serde::{Deserialize, Serialize};

use crate::SensorId;

/// One occupied grid cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatMapCell {
    /// Grid column, always within [0, resolution)
    pub x: u32,

    /// Grid row, always within [0, resolution)
    pub y: u32,

    /// Normalized intensity, always within [0, 1]
    pub intensity: f64,
}

/// Full heat map for one sensor window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatMap {
    /// Sensor the map was generated from
    pub sensor_id: SensorId,

    /// Timestamp of the generating window (seconds)
    pub timestamp: f64,

    /// Square grid side length
    pub resolution: u32,

    /// Occupied cells (zero-intensity cells omitted)
    pub cells: Vec<HeatMapCell>,
}

impl HeatMap {
    /// Intensity at a cell, zero when unoccupied
    pub fn intensity_at(&self, x: u32, y: u32) -> f64 {
        self.cells
            .iter()
            .find(|c| c.x == x && c.y == y)
            .map(|c| c.intensity)
            .unwrap_or(0.0)
    }
}
