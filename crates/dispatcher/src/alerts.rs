//! Alert pipeline state machine.
//!
//! Each `(sensor, category)` pair moves Idle -> Eligible -> Dispatched ->
//! Cooling-down -> Idle. The pair table stores the last dispatch timestamp:
//! an absent or expired entry is Idle, a live entry is Cooling-down.
//! Triggers during cooldown are suppressed (not queued, not lost as data -
//! the next trigger after expiry alerts again) to prevent alert storms.

use std::collections::HashMap;

use contracts::{
    Alert, AlertCategory, AlertPayload, AlertSeverity, CalibrationStore, MetricKey, SensorId,
    WindowReport,
};
use tracing::debug;

/// Alert pipeline
///
/// Driven by the sample clock (report timestamps) rather than wall time, so
/// replayed sessions dedup exactly like live ones.
#[derive(Debug)]
pub struct AlertPipeline {
    /// Confidence floor; sub-threshold anomalies never become eligible
    anomaly_threshold: f64,
    /// Last dispatch time per (sensor, category) pair
    last_dispatch: HashMap<(SensorId, AlertCategory), f64>,
    /// Next alert id
    next_id: u64,
    /// Triggers suppressed by cooldown
    suppressed_count: u64,
}

impl AlertPipeline {
    /// Create a pipeline with the given anomaly confidence threshold
    pub fn new(anomaly_threshold: f64) -> Self {
        Self {
            anomaly_threshold,
            last_dispatch: HashMap::new(),
            next_id: 0,
            suppressed_count: 0,
        }
    }

    /// Evaluate one window report, dispatching any eligible alerts
    pub fn evaluate(
        &mut self,
        report: &WindowReport,
        calibration: &CalibrationStore,
    ) -> Vec<Alert> {
        let mut alerts = Vec::new();

        if let Some(anomaly) = &report.anomaly {
            if anomaly.is_actionable(self.anomaly_threshold) {
                let severity = severity_for_confidence(anomaly.confidence);
                let category = if severity == AlertSeverity::Critical {
                    AlertCategory::Medical
                } else {
                    AlertCategory::General
                };

                if let Some(alert) = self.try_dispatch(
                    category,
                    severity,
                    report.sensor_id.clone(),
                    anomaly.timestamp,
                    AlertPayload::Anomaly(anomaly.clone()),
                ) {
                    alerts.push(alert);
                }
            }
        }

        // Threshold crossing: muscle load against the calibrated pressure limit
        if let Some(&load) = report.metrics.values.get(&MetricKey::MuscleLoad) {
            let threshold = calibration.get(&report.sensor_id).pressure_threshold;
            if load > threshold {
                let severity = if load >= 2.0 * threshold {
                    AlertSeverity::Medium
                } else {
                    AlertSeverity::Low
                };

                if let Some(alert) = self.try_dispatch(
                    AlertCategory::General,
                    severity,
                    report.sensor_id.clone(),
                    report.t_window,
                    AlertPayload::MetricThreshold {
                        key: MetricKey::MuscleLoad,
                        value: load,
                        threshold,
                    },
                ) {
                    alerts.push(alert);
                }
            }
        }

        alerts
    }

    /// Dispatch a sensor-fault alert (stale stream, rejected readings, ...)
    pub fn sensor_fault(
        &mut self,
        sensor_id: SensorId,
        timestamp: f64,
        message: impl Into<String>,
    ) -> Option<Alert> {
        self.try_dispatch(
            AlertCategory::SensorFault,
            AlertSeverity::High,
            sensor_id,
            timestamp,
            AlertPayload::SensorError {
                message: message.into(),
            },
        )
    }

    /// Triggers suppressed by cooldown so far
    pub fn suppressed_count(&self) -> u64 {
        self.suppressed_count
    }

    /// Eligible -> Dispatched, unless the pair is cooling down
    fn try_dispatch(
        &mut self,
        category: AlertCategory,
        severity: AlertSeverity,
        sensor_id: SensorId,
        timestamp: f64,
        payload: AlertPayload,
    ) -> Option<Alert> {
        let key = (sensor_id.clone(), category);
        let cooldown = category.cooldown().as_secs_f64();

        if let Some(&last) = self.last_dispatch.get(&key) {
            if timestamp - last < cooldown {
                self.suppressed_count += 1;
                metrics::counter!(
                    "biosync_alerts_suppressed_total",
                    "sensor_id" => sensor_id.to_string()
                )
                .increment(1);
                debug!(
                    sensor_id = %sensor_id,
                    category = ?category,
                    remaining_s = cooldown - (timestamp - last),
                    "alert suppressed by cooldown"
                );
                return None;
            }
        }

        self.last_dispatch.insert(key, timestamp);
        self.next_id += 1;

        Some(Alert {
            id: self.next_id,
            category,
            severity,
            sensor_id,
            timestamp,
            payload,
            acknowledged: false,
        })
    }
}

/// Fixed confidence-to-severity mapping for anomalies
fn severity_for_confidence(confidence: f64) -> AlertSeverity {
    if confidence >= 0.95 {
        AlertSeverity::Critical
    } else {
        // Only actionable (>= threshold) anomalies reach this mapping
        AlertSeverity::High
    }
}
