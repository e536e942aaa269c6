//! Window metric aggregation.
//!
//! Combines filtered IMU/ToF windows into per-window biomechanical metrics.
//! The IMU and ToF key sets are disjoint by construction; merging them into
//! one record uses first-write-wins and logs any collision.

use contracts::{BaselineProfile, MetricKey, SensorId, WindowMetrics};
use nalgebra::{DVector, Vector3};
use tracing::warn;

use crate::engine::FilteredFrame;

/// Window metrics aggregator
///
/// Stateless between passes; tissue deformation reads the injected baseline.
#[derive(Debug, Clone, Default)]
pub struct MetricsAggregator;

impl MetricsAggregator {
    /// Create an aggregator
    pub fn new() -> Self {
        Self
    }

    /// Aggregate one pass worth of filtered windows into a metrics record.
    ///
    /// Either window may be empty (a sensor carries one channel kind); the
    /// output then holds only the other half's keys.
    pub fn aggregate(
        &self,
        sensor_id: &SensorId,
        timestamp: f64,
        imu_window: &[FilteredFrame],
        tof_window: &[FilteredFrame],
        baseline: Option<&BaselineProfile>,
    ) -> WindowMetrics {
        let mut out = WindowMetrics::new(sensor_id.clone(), timestamp);

        if !imu_window.is_empty() {
            let collisions = out.merge(self.imu_metrics(sensor_id, timestamp, imu_window));
            debug_assert_eq!(collisions, 0);
        }

        if !tof_window.is_empty() {
            let collisions =
                out.merge(self.tof_metrics(sensor_id, timestamp, tof_window, baseline));
            if collisions > 0 {
                warn!(
                    sensor_id = %sensor_id,
                    collisions,
                    "metric key collision during merge, first write kept"
                );
            }
        }

        out
    }

    /// IMU half: magnitude statistics, movement intensity, symmetry, joint angle
    fn imu_metrics(
        &self,
        sensor_id: &SensorId,
        timestamp: f64,
        window: &[FilteredFrame],
    ) -> WindowMetrics {
        let mut out = WindowMetrics::new(sensor_id.clone(), timestamp);

        let magnitudes: Vec<f64> = window.iter().map(FilteredFrame::accel_magnitude).collect();
        let series = DVector::from_column_slice(&magnitudes);
        out.values
            .insert(MetricKey::AccelMagnitudeMean, series.mean());
        out.values
            .insert(MetricKey::AccelMagnitudeStd, series.variance().sqrt());

        // Movement intensity: mean of absolute values across all axes
        let mut abs_sum = 0.0;
        let mut abs_count = 0usize;
        for frame in window {
            for value in &frame.values {
                abs_sum += value.abs();
                abs_count += 1;
            }
        }
        let intensity = if abs_count > 0 {
            abs_sum / abs_count as f64
        } else {
            0.0
        };
        out.values.insert(MetricKey::MovementIntensity, intensity);

        out.values
            .insert(MetricKey::SymmetryIndex, symmetry_index(&magnitudes));

        if let Some(angle) = mean_joint_angle(window) {
            out.values.insert(MetricKey::JointAngle, angle);
        }

        out
    }

    /// ToF half: muscle load, asymmetry, tissue deformation
    fn tof_metrics(
        &self,
        sensor_id: &SensorId,
        timestamp: f64,
        window: &[FilteredFrame],
        baseline: Option<&BaselineProfile>,
    ) -> WindowMetrics {
        let mut out = WindowMetrics::new(sensor_id.clone(), timestamp);

        let series: Vec<f64> = window.iter().map(FilteredFrame::scalar).collect();
        let load = series.iter().copied().fold(f64::MIN, f64::max);
        out.values.insert(MetricKey::MuscleLoad, load);

        out.values
            .insert(MetricKey::AsymmetryScore, symmetry_index(&series));

        // Mean absolute deviation from the stored tissue baseline; zero until
        // the first baseline refresh exists
        let deformation = match baseline {
            Some(profile) if !profile.mean.is_empty() => {
                let reference = profile.pooled_mean();
                series.iter().map(|v| (v - reference).abs()).sum::<f64>() / series.len() as f64
            }
            _ => 0.0,
        };
        out.values
            .insert(MetricKey::TissueDeformation, deformation);

        out
    }
}

/// `|left - right| / (left + right)` with the window split at its midpoint
fn symmetry_index(series: &[f64]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    let mid = series.len() / 2;
    let left: f64 = series[..mid].iter().sum();
    let right: f64 = series[mid..].iter().sum();
    let total = left + right;
    if total.abs() > f64::EPSILON {
        (left - right).abs() / total
    } else {
        0.0
    }
}

/// Mean angle between each 3-axis triplet and the gravity reference axis
fn mean_joint_angle(window: &[FilteredFrame]) -> Option<f64> {
    let reference: Vector3<f64> = Vector3::z();
    let mut sum = 0.0;
    let mut count = 0usize;

    for frame in window {
        if frame.values.len() < 3 {
            continue;
        }
        let v = Vector3::new(frame.values[0], frame.values[1], frame.values[2]);
        let norm = v.norm();
        if norm <= f64::EPSILON {
            continue;
        }
        let cos = (v / norm).dot(&reference).clamp(-1.0, 1.0);
        sum += cos.acos();
        count += 1;
    }

    (count > 0).then(|| sum / count as f64)
}
