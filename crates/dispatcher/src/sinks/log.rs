//! LogSink - logs update summaries via tracing

use contracts::{PipelineError, PipelineUpdate, UpdateSink};
use tracing::{info, instrument};

/// Sink that logs update summaries for debugging
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn log_update_summary(&self, update: &PipelineUpdate) {
        match update {
            PipelineUpdate::Metrics(m) => {
                info!(
                    sink = %self.name,
                    sensor_id = %m.sensor_id,
                    t_window = m.timestamp,
                    metrics = m.values.len(),
                    "WindowMetrics received"
                );
            }
            PipelineUpdate::Session(s) => {
                info!(
                    sink = %self.name,
                    muscles = s.muscle_activity.len(),
                    joints = s.range_of_motion.len(),
                    "SessionMetrics received"
                );
            }
            PipelineUpdate::HeatMap(h) => {
                info!(
                    sink = %self.name,
                    sensor_id = %h.sensor_id,
                    cells = h.cells.len(),
                    "HeatMap received"
                );
            }
            PipelineUpdate::Alert(a) => {
                info!(
                    sink = %self.name,
                    alert_id = a.id,
                    sensor_id = %a.sensor_id,
                    category = ?a.category,
                    severity = ?a.severity,
                    "Alert received"
                );
            }
            PipelineUpdate::Baseline(b) => {
                info!(
                    sink = %self.name,
                    sensor_id = %b.sensor_id,
                    last_updated = b.last_updated,
                    "Baseline received"
                );
            }
        }
    }
}

impl UpdateSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "log_sink_write",
        skip(self, update),
        fields(sink = %self.name, kind = update.kind())
    )]
    async fn write(&mut self, update: &PipelineUpdate) -> Result<(), PipelineError> {
        self.log_update_summary(update);
        Ok(())
    }

    #[instrument(name = "log_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), PipelineError> {
        // Nothing to flush for log sink
        Ok(())
    }

    #[instrument(name = "log_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), PipelineError> {
        info!(sink = %self.name, "LogSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::WindowMetrics;

    #[tokio::test]
    async fn test_log_sink_write() {
        let mut sink = LogSink::new("test_log");
        let update = PipelineUpdate::Metrics(WindowMetrics::new("pelvis_imu".into(), 1.0));

        let result = sink.write(&update).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_log_sink_name() {
        let sink = LogSink::new("my_logger");
        assert_eq!(sink.name(), "my_logger");
    }
}
