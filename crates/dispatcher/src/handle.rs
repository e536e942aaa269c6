//! SinkHandle - manages a sink with isolated queue and worker task

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use contracts::{PipelineUpdate, UpdateSink};

use crate::metrics::SinkMetrics;

/// Handle to a running sink worker
pub struct SinkHandle {
    /// Sink name
    name: String,
    /// Channel to send updates to worker
    tx: mpsc::Sender<PipelineUpdate>,
    /// Shared metrics
    metrics: Arc<SinkMetrics>,
    /// Worker task handle
    worker_handle: JoinHandle<()>,
}

impl SinkHandle {
    /// Create a new SinkHandle and spawn the worker task
    pub fn spawn<S: UpdateSink + Send + 'static>(sink: S, queue_capacity: usize) -> Self {
        let name = sink.name().to_string();
        let (tx, rx) = mpsc::channel(queue_capacity);
        let metrics = Arc::new(SinkMetrics::new());

        let worker_metrics = Arc::clone(&metrics);
        let worker_name = name.clone();

        let worker_handle = tokio::spawn(async move {
            sink_worker(sink, rx, worker_metrics, worker_name).await;
        });

        Self {
            name,
            tx,
            metrics,
            worker_handle,
        }
    }

    /// Get sink name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }

    /// Send an update to the sink (non-blocking)
    ///
    /// Returns true if sent, false if queue full (update dropped)
    pub fn try_send(&self, update: PipelineUpdate) -> bool {
        match self.tx.try_send(update) {
            Ok(()) => {
                // Update queue length approximation
                self.metrics.set_queue_len(self.tx.capacity());
                true
            }
            Err(mpsc::error::TrySendError::Full(u)) => {
                self.metrics.inc_dropped_count();
                warn!(
                    sink = %self.name,
                    kind = u.kind(),
                    "Queue full, update dropped"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!(sink = %self.name, "Sink worker closed unexpectedly");
                false
            }
        }
    }

    /// Shutdown the sink worker gracefully
    #[instrument(name = "sink_handle_shutdown", skip(self))]
    pub async fn shutdown(self) {
        // Drop sender to signal worker to stop
        drop(self.tx);
        // Wait for worker to finish
        if let Err(e) = self.worker_handle.await {
            error!(sink = %self.name, error = ?e, "Worker task panicked");
        }
        debug!(sink = %self.name, "SinkHandle shutdown complete");
    }
}

/// Worker task that consumes updates and writes to sink
#[instrument(
    name = "sink_worker_loop",
    skip(sink, rx, metrics),
    fields(sink = %name)
)]
async fn sink_worker<S: UpdateSink>(
    mut sink: S,
    mut rx: mpsc::Receiver<PipelineUpdate>,
    metrics: Arc<SinkMetrics>,
    name: String,
) {
    debug!(sink = %name, "Sink worker started");

    while let Some(update) = rx.recv().await {
        // Update queue length
        metrics.set_queue_len(rx.len());

        match sink.write(&update).await {
            Ok(()) => {
                metrics.inc_write_count();
                if matches!(update, PipelineUpdate::Alert(_)) {
                    metrics.inc_alert_count();
                }
            }
            Err(e) => {
                metrics.inc_failure_count();
                error!(
                    sink = %name,
                    kind = update.kind(),
                    error = %e,
                    "Write failed"
                );
                // Continue processing - don't crash on single failure
            }
        }
    }

    // Cleanup
    if let Err(e) = sink.flush().await {
        error!(sink = %name, error = %e, "Flush failed on shutdown");
    }
    if let Err(e) = sink.close().await {
        error!(sink = %name, error = %e, "Close failed on shutdown");
    }

    debug!(sink = %name, "Sink worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{PipelineError, SessionMetrics, WindowMetrics};
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::time::{sleep, Duration};

    fn metrics_update(i: u64) -> PipelineUpdate {
        PipelineUpdate::Metrics(WindowMetrics::new("pelvis_imu".into(), i as f64))
    }

    /// Mock sink for testing
    struct MockSink {
        name: String,
        write_count: Arc<AtomicU64>,
        should_fail: bool,
        delay_ms: u64,
    }

    impl UpdateSink for MockSink {
        fn name(&self) -> &str {
            &self.name
        }

        async fn write(&mut self, _update: &PipelineUpdate) -> Result<(), PipelineError> {
            if self.delay_ms > 0 {
                sleep(Duration::from_millis(self.delay_ms)).await;
            }
            if self.should_fail {
                return Err(PipelineError::sink_write(&self.name, "mock failure"));
            }
            self.write_count.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }

        async fn flush(&mut self) -> Result<(), PipelineError> {
            Ok(())
        }

        async fn close(&mut self) -> Result<(), PipelineError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_sink_handle_basic() {
        let write_count = Arc::new(AtomicU64::new(0));
        let sink = MockSink {
            name: "test".to_string(),
            write_count: Arc::clone(&write_count),
            should_fail: false,
            delay_ms: 0,
        };

        let handle = SinkHandle::spawn(sink, 10);

        for i in 0..5 {
            assert!(handle.try_send(metrics_update(i)));
        }

        handle.shutdown().await;
        assert_eq!(write_count.load(Ordering::Relaxed), 5);
    }

    #[tokio::test]
    async fn test_sink_handle_queue_full() {
        let write_count = Arc::new(AtomicU64::new(0));
        let sink = MockSink {
            name: "slow".to_string(),
            write_count: Arc::clone(&write_count),
            should_fail: false,
            delay_ms: 100, // Slow sink
        };

        // Small queue capacity
        let handle = SinkHandle::spawn(sink, 2);

        // Send more than queue can hold
        for i in 0..10 {
            handle.try_send(metrics_update(i));
        }

        // Some should have been dropped
        assert!(handle.metrics().dropped_count() > 0);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_sink_handle_failure_isolation() {
        let sink = MockSink {
            name: "failing".to_string(),
            write_count: Arc::new(AtomicU64::new(0)),
            should_fail: true,
            delay_ms: 0,
        };

        let handle = SinkHandle::spawn(sink, 10);

        for _ in 0..3 {
            handle.try_send(PipelineUpdate::Session(SessionMetrics::default()));
        }

        // Give worker time to process
        sleep(Duration::from_millis(50)).await;

        // Should have recorded failures
        assert!(handle.metrics().failure_count() > 0);

        handle.shutdown().await;
    }
}
