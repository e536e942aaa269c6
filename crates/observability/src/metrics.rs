//! Pipeline metric collection
//!
//! Records Prometheus metrics from `WindowReport`s and aggregates them in
//! memory for the end-of-run summary.

use contracts::{Alert, AlertSeverity, WindowReport};
use metrics::{counter, gauge, histogram};

/// Record metrics from a window report
///
/// Call once per report produced by the analytics engine.
///
/// # Example
///
/// ```ignore
/// use observability::record_window_report;
///
/// if let Some(report) = engine.push(reading) {
///     record_window_report(&report);
///     // ...
/// }
/// ```
pub fn record_window_report(report: &WindowReport) {
    counter!("biosync_windows_total").increment(1);

    // Pass latency against the 100ms budget
    histogram!("biosync_pass_latency_ms").record(report.meta.pass_ms);
    if report.meta.over_budget {
        counter!("biosync_budget_exceeded_total").increment(1);
    }

    // Window fill and eviction pressure
    gauge!(
        "biosync_window_len",
        "sensor_id" => report.sensor_id.to_string()
    )
    .set(report.meta.window_len as f64);

    if report.meta.evicted_count > 0 {
        counter!(
            "biosync_samples_evicted_total",
            "sensor_id" => report.sensor_id.to_string()
        )
        .increment(report.meta.evicted_count);
    }

    if report.meta.rejected_count > 0 {
        counter!(
            "biosync_window_rejected_total",
            "sensor_id" => report.sensor_id.to_string()
        )
        .increment(report.meta.rejected_count);
    }

    // Detection outcome
    if let Some(anomaly) = &report.anomaly {
        histogram!(
            "biosync_anomaly_confidence",
            "sensor_id" => report.sensor_id.to_string()
        )
        .record(anomaly.confidence);
        counter!(
            "biosync_anomalies_total",
            "kind" => format!("{:?}", anomaly.kind)
        )
        .increment(1);
    }
}

/// Record a reading accepted at ingress
pub fn record_reading_received(sensor_id: &str, channel: &str) {
    counter!(
        "biosync_readings_received_total",
        "sensor_id" => sensor_id.to_string(),
        "channel" => channel.to_string()
    )
    .increment(1);
}

/// Record a reading rejected at the quality gate
pub fn record_reading_rejected(sensor_id: &str, reason: &str) {
    counter!(
        "biosync_readings_rejected_total",
        "sensor_id" => sensor_id.to_string(),
        "reason" => reason.to_string()
    )
    .increment(1);
}

/// Record an update handed to a sink
pub fn record_update_dispatched(sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "biosync_updates_dispatched_total",
        "sink" => sink_name.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a dispatched alert
pub fn record_alert_dispatched(alert: &Alert) {
    counter!(
        "biosync_alerts_total",
        "category" => format!("{:?}", alert.category),
        "severity" => format!("{:?}", alert.severity)
    )
    .increment(1);
}

/// Pipeline metrics aggregator
///
/// Aggregates report metadata in memory for run-level statistics.
#[derive(Debug, Clone, Default)]
pub struct PipelineMetricsAggregator {
    /// Windows processed
    pub total_windows: u64,

    /// Samples evicted from window buffers
    pub total_evicted: u64,

    /// Readings rejected at the quality gate
    pub total_rejected: u64,

    /// Passes that exceeded the latency budget
    pub windows_over_budget: u64,

    /// Anomalies computed (any confidence)
    pub total_anomalies: u64,

    /// Alerts dispatched
    pub total_alerts: u64,

    /// Critical alerts dispatched
    pub critical_alerts: u64,

    /// Pass latency statistics (milliseconds)
    pub pass_latency_ms: RunningStats,

    /// Anomaly confidence statistics
    pub confidence: RunningStats,
}

impl PipelineMetricsAggregator {
    /// Create a new aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one window report into the aggregate
    pub fn update(&mut self, report: &WindowReport) {
        self.total_windows += 1;
        self.total_evicted += report.meta.evicted_count;
        self.total_rejected += report.meta.rejected_count;

        if report.meta.over_budget {
            self.windows_over_budget += 1;
        }

        self.pass_latency_ms.push(report.meta.pass_ms);

        if let Some(anomaly) = &report.anomaly {
            self.total_anomalies += 1;
            self.confidence.push(anomaly.confidence);
        }
    }

    /// Fold one dispatched alert into the aggregate
    pub fn record_alert(&mut self, alert: &Alert) {
        self.total_alerts += 1;
        if alert.severity == AlertSeverity::Critical {
            self.critical_alerts += 1;
        }
    }

    /// Generate a summary report
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            total_windows: self.total_windows,
            total_evicted: self.total_evicted,
            total_rejected: self.total_rejected,
            windows_over_budget: self.windows_over_budget,
            total_anomalies: self.total_anomalies,
            total_alerts: self.total_alerts,
            critical_alerts: self.critical_alerts,
            budget_miss_rate: if self.total_windows > 0 {
                self.windows_over_budget as f64 / self.total_windows as f64 * 100.0
            } else {
                0.0
            },
            pass_latency_ms: StatsSummary::from(&self.pass_latency_ms),
            confidence: StatsSummary::from(&self.confidence),
        }
    }

    /// Reset the aggregate
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Metrics summary
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub total_windows: u64,
    pub total_evicted: u64,
    pub total_rejected: u64,
    pub windows_over_budget: u64,
    pub total_anomalies: u64,
    pub total_alerts: u64,
    pub critical_alerts: u64,
    pub budget_miss_rate: f64,
    pub pass_latency_ms: StatsSummary,
    pub confidence: StatsSummary,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Pipeline Metrics Summary ===")?;
        writeln!(f, "Windows processed: {}", self.total_windows)?;
        writeln!(f, "Samples evicted: {}", self.total_evicted)?;
        writeln!(f, "Readings rejected: {}", self.total_rejected)?;
        writeln!(
            f,
            "Budget misses: {} ({:.2}%)",
            self.windows_over_budget, self.budget_miss_rate
        )?;
        writeln!(f, "Anomalies: {}", self.total_anomalies)?;
        writeln!(
            f,
            "Alerts: {} ({} critical)",
            self.total_alerts, self.critical_alerts
        )?;
        writeln!(f, "Pass latency (ms): {}", self.pass_latency_ms)?;
        writeln!(f, "Anomaly confidence: {}", self.confidence)?;
        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics calculator (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a new value
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// Sample count
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Mean
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// Standard deviation
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Minimum value
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Maximum value
    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{AnomalyKind, AnomalyResult, HeatMap, ProcessMeta, WindowMetrics};

    fn sample_report(over_budget: bool, with_anomaly: bool) -> WindowReport {
        WindowReport {
            sensor_id: "quad_left_imu".into(),
            t_window: 1.0,
            metrics: WindowMetrics::new("quad_left_imu".into(), 1.0),
            heat_map: HeatMap {
                sensor_id: "quad_left_imu".into(),
                timestamp: 1.0,
                resolution: 32,
                cells: vec![],
            },
            anomaly: with_anomaly.then(|| AnomalyResult {
                sensor_id: "quad_left_imu".into(),
                timestamp: 1.0,
                confidence: 0.9,
                kind: AnomalyKind::Outlier,
                magnitude: 10.0,
                baseline_deviation: 2.5,
            }),
            meta: ProcessMeta {
                window_len: 1024,
                pass_ms: if over_budget { 120.0 } else { 4.0 },
                over_budget,
                evicted_count: 2,
                rejected_count: 1,
            },
        }
    }

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();

        stats.push(1.0);
        stats.push(2.0);
        stats.push(3.0);
        stats.push(4.0);
        stats.push(5.0);

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_update() {
        let mut aggregator = PipelineMetricsAggregator::new();

        aggregator.update(&sample_report(false, true));
        aggregator.update(&sample_report(true, false));

        assert_eq!(aggregator.total_windows, 2);
        assert_eq!(aggregator.total_evicted, 4);
        assert_eq!(aggregator.total_rejected, 2);
        assert_eq!(aggregator.windows_over_budget, 1);
        assert_eq!(aggregator.total_anomalies, 1);
    }

    #[test]
    fn test_summary_display() {
        let mut aggregator = PipelineMetricsAggregator::new();
        aggregator.update(&sample_report(false, true));

        let output = format!("{}", aggregator.summary());
        assert!(output.contains("Windows processed: 1"));
        assert!(output.contains("Anomalies: 1"));
    }
}
