//! Session metrics - Metrics Aggregator output
//!
//! Keyed by closed enums rather than open string maps so that a mismatched
//! key is a compile error, not a silent new entry.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::SensorId;

/// Closed set of per-window metric names
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKey {
    // IMU-derived
    AccelMagnitudeMean,
    AccelMagnitudeStd,
    MovementIntensity,
    SymmetryIndex,
    JointAngle,
    // ToF-derived
    MuscleLoad,
    AsymmetryScore,
    TissueDeformation,
}

/// Muscle groups instrumented by the garment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MuscleGroup {
    Quadriceps,
    Hamstrings,
    Calves,
    Glutes,
    LowerBack,
}

/// Body regions used for force distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyRegion {
    LeftLower,
    RightLower,
    LeftUpper,
    RightUpper,
    Core,
}

/// Joints tracked for range of motion
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    Hip,
    Knee,
    Ankle,
    Shoulder,
    Elbow,
}

/// Where a sensor sits on the body
///
/// Routes per-window metrics into the session-level maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorPlacement {
    pub muscle: MuscleGroup,
    pub region: BodyRegion,
    pub joint: Joint,
}

/// Metrics computed from one processing window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowMetrics {
    /// Sensor the window came from
    pub sensor_id: SensorId,

    /// Timestamp of the newest sample in the window (seconds)
    pub timestamp: f64,

    /// Metric values keyed by the closed name set
    pub values: BTreeMap<MetricKey, f64>,
}

impl WindowMetrics {
    /// Create an empty metrics record
    pub fn new(sensor_id: SensorId, timestamp: f64) -> Self {
        Self {
            sensor_id,
            timestamp,
            values: BTreeMap::new(),
        }
    }

    /// Merge another record into this one, first write wins.
    ///
    /// Intended for combining the IMU and ToF halves of one pass, whose key
    /// sets are disjoint by construction. Returns the number of keys skipped
    /// because this record already held them; callers log a non-zero count.
    pub fn merge(&mut self, other: WindowMetrics) -> usize {
        let mut collisions = 0;
        for (key, value) in other.values {
            if self.values.contains_key(&key) {
                collisions += 1;
            } else {
                self.values.insert(key, value);
            }
        }
        collisions
    }
}

/// Session-level biomechanical metrics
///
/// Owned by one session for its lifetime: created on session start, mutated
/// incrementally per processed window, handed to the storage collaborator on
/// session end.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionMetrics {
    /// Latest activity level per muscle group
    pub muscle_activity: BTreeMap<MuscleGroup, f64>,

    /// Latest load per body region
    pub force_distribution: BTreeMap<BodyRegion, f64>,

    /// Peak observed joint angle (radians)
    pub range_of_motion: BTreeMap<Joint, f64>,

    /// Latest anomaly confidence per sensor
    pub anomaly_scores: HashMap<SensorId, f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_disjoint_keys() {
        let mut imu = WindowMetrics::new("pelvis_imu".into(), 1.0);
        imu.values.insert(MetricKey::AccelMagnitudeMean, 9.8);
        imu.values.insert(MetricKey::SymmetryIndex, 0.1);

        let mut tof = WindowMetrics::new("pelvis_imu".into(), 1.0);
        tof.values.insert(MetricKey::MuscleLoad, 3.2);

        let collisions = imu.merge(tof);
        assert_eq!(collisions, 0);
        assert_eq!(imu.values.len(), 3);
    }

    #[test]
    fn test_merge_first_write_wins() {
        let mut first = WindowMetrics::new("quad_left_imu".into(), 1.0);
        first.values.insert(MetricKey::MovementIntensity, 0.4);

        let mut second = WindowMetrics::new("quad_left_imu".into(), 1.0);
        second.values.insert(MetricKey::MovementIntensity, 0.9);

        let collisions = first.merge(second);
        assert_eq!(collisions, 1);
        assert_eq!(
            first.values.get(&MetricKey::MovementIntensity).copied(),
            Some(0.4)
        );
    }

    #[test]
    fn test_metric_key_serde_names() {
        let json = serde_json::to_string(&MetricKey::TissueDeformation).unwrap();
        assert_eq!(json, "\"tissue_deformation\"");
    }
}
