//! BaselineProfile - per-sensor reference statistics
//!
//! Recomputed periodically from recent window history; readers always see a
//! complete profile because refresh swaps whole profiles, never mutates one
//! in place.

use serde::{Deserialize, Serialize};

use crate::SensorId;

/// Per-sensor baseline statistics
///
/// Shared read-only by the anomaly detector and metrics aggregator; written
/// only by the baseline-refresh task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaselineProfile {
    /// Sensor this baseline describes
    pub sensor_id: SensorId,

    /// Per-axis mean of recent filtered samples
    pub mean: Vec<f64>,

    /// Per-axis variance of recent filtered samples
    pub variance: Vec<f64>,

    /// Session timestamp of the last refresh (seconds)
    pub last_updated: f64,
}

impl BaselineProfile {
    /// Pooled standard deviation across axes
    ///
    /// The detector classifies deviations against a single scalar; averaging
    /// the per-axis variances keeps that comparison stable when axes differ
    /// in count between IMU and ToF sensors.
    pub fn pooled_std(&self) -> f64 {
        if self.variance.is_empty() {
            return 0.0;
        }
        let mean_var = self.variance.iter().sum::<f64>() / self.variance.len() as f64;
        mean_var.max(0.0).sqrt()
    }

    /// Scalar mean across axes
    pub fn pooled_mean(&self) -> f64 {
        if self.mean.is_empty() {
            return 0.0;
        }
        self.mean.iter().sum::<f64>() / self.mean.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pooled_std() {
        let profile = BaselineProfile {
            sensor_id: "pelvis_imu".into(),
            mean: vec![1.0, 2.0, 3.0],
            variance: vec![4.0, 4.0, 4.0],
            last_updated: 10.0,
        };
        assert!((profile.pooled_std() - 2.0).abs() < 1e-12);
        assert!((profile.pooled_mean() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_profile_is_zero() {
        let profile = BaselineProfile::default();
        assert_eq!(profile.pooled_std(), 0.0);
        assert_eq!(profile.pooled_mean(), 0.0);
    }
}
