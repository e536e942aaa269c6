//! Statistical anomaly detection over processing windows.
//!
//! Compares window statistics against the sensor's baseline profile and
//! classifies deviations into anomaly kinds. Degenerate windows (flat signal)
//! yield confidence 0, never NaN.

use contracts::{
    AnomalyKind, AnomalyResult, BaselineProfile, DetectorConfig, PipelineError, SensorId,
};
use nalgebra::DVector;

/// Window anomaly detector
///
/// Stateless between passes; all history lives in the baseline profile.
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    config: DetectorConfig,
}

impl AnomalyDetector {
    /// Create a detector with the given tuning
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Run one detection pass over a window of scalar samples.
    ///
    /// * `window` - filtered magnitude series, oldest first
    /// * `baseline` - reference statistics for classification
    ///
    /// # Errors
    /// Returns a processing error for windows too short to carry statistics;
    /// the caller skips the cycle and retains prior state.
    pub fn detect(
        &self,
        sensor_id: &SensorId,
        timestamp: f64,
        window: &[f64],
        baseline: &BaselineProfile,
    ) -> Result<AnomalyResult, PipelineError> {
        if window.len() < 2 {
            return Err(PipelineError::processing(
                "detect",
                sensor_id.as_str(),
                format!("window too short: {} samples", window.len()),
            ));
        }

        let series = DVector::from_column_slice(window);
        let stddev = series.variance().sqrt();
        let max = series.max();
        let max_deviation = max - stddev;

        // Flat window: no spread to measure deviation against
        let confidence = if stddev > 0.0 {
            max_deviation / stddev
        } else {
            0.0
        };

        let sub = self.config.sub_window.min(window.len());
        let moving_avg = window[window.len() - sub..].iter().sum::<f64>() / sub as f64;

        let baseline_std = baseline.pooled_std();
        let kind = classify(max_deviation, baseline_std);
        let baseline_deviation = if baseline_std > 0.0 {
            max_deviation / baseline_std
        } else {
            0.0
        };

        Ok(AnomalyResult {
            sensor_id: sensor_id.clone(),
            timestamp,
            confidence,
            kind,
            magnitude: moving_avg,
            baseline_deviation,
        })
    }

    /// Confidence floor for forwarding results to the alert pipeline
    pub fn threshold(&self) -> f64 {
        self.config.anomaly_threshold
    }
}

/// Classify a deviation against the baseline spread
fn classify(deviation: f64, baseline_std: f64) -> AnomalyKind {
    if deviation > 3.0 * baseline_std {
        AnomalyKind::SpikePattern
    } else if deviation > 2.0 * baseline_std {
        AnomalyKind::Outlier
    } else if deviation < 0.5 * baseline_std {
        AnomalyKind::Discontinuity
    } else {
        AnomalyKind::Drift
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baseline_with_std(std: f64) -> BaselineProfile {
        BaselineProfile {
            sensor_id: "quad_left_imu".into(),
            mean: vec![10.0],
            variance: vec![std * std],
            last_updated: 0.0,
        }
    }

    fn detect(window: &[f64], baseline: &BaselineProfile) -> AnomalyResult {
        let detector = AnomalyDetector::new(DetectorConfig::default());
        detector
            .detect(&"quad_left_imu".into(), 1.0, window, baseline)
            .unwrap()
    }

    #[test]
    fn test_flat_window_yields_zero_confidence() {
        let window = vec![5.0; 100];
        let result = detect(&window, &baseline_with_std(1.0));
        assert_eq!(result.confidence, 0.0);
        assert!(result.confidence.is_finite());
    }

    #[test]
    fn test_spike_classification() {
        // Deviation far above 3x a small baseline spread
        let mut window = vec![10.0; 90];
        window.extend(vec![100.0; 10]);
        let result = detect(&window, &baseline_with_std(1.0));
        assert_eq!(result.kind, AnomalyKind::SpikePattern);
        assert!(result.confidence >= 0.85, "got {}", result.confidence);
    }

    #[test]
    fn test_outlier_classification() {
        // Same window, baseline spread wide enough that 2x < deviation <= 3x
        let mut window = vec![10.0; 90];
        window.extend(vec![100.0; 10]);

        // max ~= 100, stddev ~= 27, deviation ~= 73
        let result = detect(&window, &baseline_with_std(30.0));
        assert_eq!(result.kind, AnomalyKind::Outlier);
    }

    #[test]
    fn test_discontinuity_classification() {
        // Tiny deviation against a wide baseline spread
        let window: Vec<f64> = (0..100).map(|i| 10.0 + (i % 2) as f64 * 0.01).collect();
        let result = detect(&window, &baseline_with_std(50.0));
        assert_eq!(result.kind, AnomalyKind::Discontinuity);
    }

    #[test]
    fn test_drift_classification() {
        // Deviation between 0.5x and 2x the baseline spread
        let mut window = vec![10.0; 90];
        window.extend(vec![100.0; 10]);

        // deviation ~= 73; baseline_std 45 -> 0.5x=22.5, 2x=90
        let result = detect(&window, &baseline_with_std(45.0));
        assert_eq!(result.kind, AnomalyKind::Drift);
    }

    #[test]
    fn test_outlier_scenario_confidence() {
        // 90 values around 10, 10 values around 100: confidence >= 0.85 and
        // kind is Outlier or SpikePattern
        let mut window: Vec<f64> = (0..90).map(|i| 10.0 + (i % 3) as f64 * 0.1).collect();
        window.extend((0..10).map(|i| 100.0 + i as f64 * 0.1));

        let result = detect(&window, &baseline_with_std(5.0));
        assert!(result.confidence >= 0.85, "got {}", result.confidence);
        assert!(matches!(
            result.kind,
            AnomalyKind::Outlier | AnomalyKind::SpikePattern
        ));
    }

    #[test]
    fn test_short_window_is_processing_error() {
        let detector = AnomalyDetector::new(DetectorConfig::default());
        let result = detector.detect(&"s".into(), 0.0, &[1.0], &baseline_with_std(1.0));
        assert!(matches!(result, Err(PipelineError::Processing { .. })));
    }

    #[test]
    fn test_magnitude_is_sub_window_average() {
        let mut window = vec![0.0; 90];
        window.extend(vec![8.0; 10]);
        let result = detect(&window, &baseline_with_std(1.0));
        // Default sub-window is the trailing 10 samples
        assert!((result.magnitude - 8.0).abs() < 1e-9);
    }
}
