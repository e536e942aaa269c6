//! Pipeline statistics and metrics.

use std::time::Duration;

use observability::PipelineMetricsAggregator;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Total window reports produced
    pub windows_processed: u64,

    /// Total readings received from sensors
    pub readings_received: u64,

    /// Total alerts dispatched
    pub alerts_dispatched: u64,

    /// Total duration of the pipeline run
    pub duration: Duration,

    /// Number of sensors that were active
    pub active_sensors: usize,

    /// Number of sinks that received data
    pub active_sinks: usize,

    /// Window-level metrics aggregator
    pub pipeline_metrics: PipelineMetricsAggregator,
}

impl PipelineStats {
    /// Calculate window reports per second
    pub fn windows_per_second(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.windows_processed as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Pipeline Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Windows processed: {}", self.windows_processed);
        println!("   ├─ Readings received: {}", self.readings_received);
        println!("   ├─ Windows/s: {:.2}", self.windows_per_second());
        println!("   ├─ Active sensors: {}", self.active_sensors);
        println!("   └─ Active sinks: {}", self.active_sinks);

        let summary = self.pipeline_metrics.summary();

        println!("\n📈 Analytics Metrics");
        println!("   ├─ Samples evicted: {}", summary.total_evicted);
        println!("   ├─ Readings rejected: {}", summary.total_rejected);
        println!(
            "   ├─ Budget misses: {} ({:.2}%)",
            summary.windows_over_budget, summary.budget_miss_rate
        );
        println!("   ├─ Anomalies: {}", summary.total_anomalies);
        println!(
            "   ├─ Alerts: {} ({} critical)",
            summary.total_alerts, summary.critical_alerts
        );
        println!("   ├─ Pass latency (ms): {}", summary.pass_latency_ms);
        println!("   └─ Anomaly confidence: {}", summary.confidence);

        println!();
    }
}
