//! Generic sensor adapter
//!
//! Unified adapter over the `SensorSource` trait. Lets the ingestion
//! pipeline treat live transport streams and mock garments identically, and
//! applies the quality gate before anything reaches the channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_channel::Sender;
use contracts::{SensorChannel, SensorDataCallback, SensorReading, SensorSource};
use tracing::{debug, trace};

use crate::adapter::{send_reading, SensorAdapter};
use crate::config::{BackpressureConfig, IngestionMetrics};
use crate::quality::QualityGate;

/// Generic sensor adapter
///
/// Adapts a `SensorSource` into a `SensorAdapter`. This is the bridge
/// between data producers and the ingestion channel.
pub struct GenericSensorAdapter {
    sensor_id: String,
    source: Box<dyn SensorSource>,
    config: BackpressureConfig,
    gate: QualityGate,
    listening: Arc<AtomicBool>,
}

impl GenericSensorAdapter {
    /// Create a new generic adapter
    pub fn new(
        sensor_id: String,
        source: Box<dyn SensorSource>,
        config: BackpressureConfig,
        gate: QualityGate,
    ) -> Self {
        Self {
            sensor_id,
            source,
            config,
            gate,
            listening: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl SensorAdapter for GenericSensorAdapter {
    fn sensor_id(&self) -> &str {
        &self.sensor_id
    }

    fn channel(&self) -> SensorChannel {
        self.source.channel()
    }

    fn start(&self, tx: Sender<SensorReading>, metrics: Arc<IngestionMetrics>) {
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        let sensor_id = self.sensor_id.clone();
        let drop_policy = self.config.drop_policy;
        let gate = self.gate;
        let listening = self.listening.clone();

        debug!(sensor_id = %sensor_id, "starting generic adapter");

        let callback: SensorDataCallback = Arc::new(move |reading| {
            if !listening.load(Ordering::Relaxed) {
                return;
            }

            metrics.record_received();

            if let Err(e) = gate.check(&reading) {
                metrics.record_rejected();
                metrics::counter!(
                    "biosync_ingestion_rejected_total",
                    "sensor_id" => sensor_id.to_string()
                )
                .increment(1);
                trace!(sensor_id = %sensor_id, error = %e, "reading rejected");
                return;
            }

            trace!(sensor_id = %sensor_id, "generic adapter received reading");
            send_reading(&tx, reading, &metrics, &sensor_id, drop_policy);
        });

        self.source.listen(callback);
    }

    fn stop(&self) {
        if self.listening.swap(false, Ordering::SeqCst) {
            debug!(sensor_id = %self.sensor_id, "stopping generic adapter");
            self.source.stop();
        }
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}
