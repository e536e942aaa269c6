//! Session-level metric tracking.
//!
//! Folds per-window reports into the session's biomechanical metrics using
//! each sensor's body placement. Owned by one session for its lifetime and
//! handed to the storage collaborator at session end.

use std::collections::HashMap;

use contracts::{MetricKey, SensorId, SensorPlacement, SessionMetrics, WindowReport};

/// Session metrics tracker
#[derive(Debug, Clone, Default)]
pub struct SessionTracker {
    placements: HashMap<SensorId, SensorPlacement>,
    metrics: SessionMetrics,
}

impl SessionTracker {
    /// Create a tracker with the session's sensor placements
    pub fn new(placements: HashMap<SensorId, SensorPlacement>) -> Self {
        Self {
            placements,
            metrics: SessionMetrics::default(),
        }
    }

    /// Fold one window report into the session metrics
    pub fn fold(&mut self, report: &WindowReport) {
        if let Some(anomaly) = &report.anomaly {
            self.metrics
                .anomaly_scores
                .insert(report.sensor_id.clone(), anomaly.confidence);
        }

        let Some(placement) = self.placements.get(&report.sensor_id).copied() else {
            return;
        };
        let values = &report.metrics.values;

        // Muscle activity: ToF load when present, IMU intensity otherwise
        if let Some(activity) = values
            .get(&MetricKey::MuscleLoad)
            .or_else(|| values.get(&MetricKey::MovementIntensity))
        {
            self.metrics
                .muscle_activity
                .insert(placement.muscle, *activity);
        }

        if let Some(load) = values.get(&MetricKey::MuscleLoad) {
            self.metrics
                .force_distribution
                .insert(placement.region, *load);
        }

        // Range of motion keeps the session peak
        if let Some(angle) = values.get(&MetricKey::JointAngle) {
            self.metrics
                .range_of_motion
                .entry(placement.joint)
                .and_modify(|peak| *peak = peak.max(*angle))
                .or_insert(*angle);
        }
    }

    /// Snapshot of the current session metrics
    pub fn snapshot(&self) -> SessionMetrics {
        self.metrics.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{
        AnomalyKind, AnomalyResult, BodyRegion, HeatMap, Joint, MuscleGroup, ProcessMeta,
        WindowMetrics,
    };

    fn placement() -> SensorPlacement {
        SensorPlacement {
            muscle: MuscleGroup::Quadriceps,
            region: BodyRegion::LeftLower,
            joint: Joint::Knee,
        }
    }

    fn report_with(values: &[(MetricKey, f64)], anomaly: Option<f64>) -> WindowReport {
        let sensor: SensorId = "quad_left_imu".into();
        let mut metrics = WindowMetrics::new(sensor.clone(), 1.0);
        for (key, value) in values {
            metrics.values.insert(*key, *value);
        }
        WindowReport {
            sensor_id: sensor.clone(),
            t_window: 1.0,
            metrics,
            heat_map: HeatMap {
                sensor_id: sensor.clone(),
                timestamp: 1.0,
                resolution: 32,
                cells: vec![],
            },
            anomaly: anomaly.map(|confidence| AnomalyResult {
                sensor_id: sensor,
                timestamp: 1.0,
                confidence,
                kind: AnomalyKind::Drift,
                magnitude: 0.0,
                baseline_deviation: 0.0,
            }),
            meta: ProcessMeta::default(),
        }
    }

    fn tracker() -> SessionTracker {
        let mut placements = HashMap::new();
        placements.insert("quad_left_imu".into(), placement());
        SessionTracker::new(placements)
    }

    #[test]
    fn test_range_of_motion_keeps_peak() {
        let mut tracker = tracker();

        tracker.fold(&report_with(&[(MetricKey::JointAngle, 0.8)], None));
        tracker.fold(&report_with(&[(MetricKey::JointAngle, 1.2)], None));
        tracker.fold(&report_with(&[(MetricKey::JointAngle, 0.5)], None));

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.range_of_motion.get(&Joint::Knee).copied(), Some(1.2));
    }

    #[test]
    fn test_muscle_activity_prefers_load() {
        let mut tracker = tracker();
        tracker.fold(&report_with(
            &[
                (MetricKey::MovementIntensity, 0.3),
                (MetricKey::MuscleLoad, 2.5),
            ],
            None,
        ));

        let snapshot = tracker.snapshot();
        assert_eq!(
            snapshot.muscle_activity.get(&MuscleGroup::Quadriceps).copied(),
            Some(2.5)
        );
        assert_eq!(
            snapshot.force_distribution.get(&BodyRegion::LeftLower).copied(),
            Some(2.5)
        );
    }

    #[test]
    fn test_anomaly_scores_track_latest() {
        let mut tracker = tracker();
        tracker.fold(&report_with(&[], Some(0.4)));
        tracker.fold(&report_with(&[], Some(0.9)));

        let snapshot = tracker.snapshot();
        assert_eq!(
            snapshot.anomaly_scores.get("quad_left_imu").copied(),
            Some(0.9)
        );
    }

    #[test]
    fn test_unknown_sensor_only_tracks_anomaly() {
        let mut tracker = SessionTracker::new(HashMap::new());
        tracker.fold(&report_with(&[(MetricKey::JointAngle, 1.0)], Some(0.7)));

        let snapshot = tracker.snapshot();
        assert!(snapshot.range_of_motion.is_empty());
        assert_eq!(snapshot.anomaly_scores.len(), 1);
    }
}
