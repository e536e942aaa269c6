//! Ingestion Pipeline main entry

use std::collections::HashMap;
use std::sync::Arc;

use async_channel::{bounded, Receiver, Sender};
use contracts::{SensorReading, SensorSource};
use tracing::{debug, info, instrument};

use crate::adapter::SensorAdapter;
use crate::config::{BackpressureConfig, IngestionMetrics};
use crate::generic_adapter::GenericSensorAdapter;
use crate::quality::QualityGate;

/// Ingestion Pipeline
///
/// Manages the sensor adapters and provides one unified, quality-gated
/// reading stream. Mock garments and live transport streams register the
/// same way.
pub struct IngestionPipeline {
    /// Registered adapters
    adapters: HashMap<String, Box<dyn SensorAdapter>>,

    /// Shared metrics
    metrics: Arc<IngestionMetrics>,

    /// Reading sender (shared by all adapters)
    tx: Sender<SensorReading>,

    /// Reading receiver
    rx: Option<Receiver<SensorReading>>,

    /// Quality gate applied by every adapter
    gate: QualityGate,

    /// Default backpressure configuration
    default_config: BackpressureConfig,
}

impl IngestionPipeline {
    /// Create new Ingestion Pipeline
    ///
    /// # Arguments
    /// * `channel_capacity` - shared channel capacity
    /// * `quality_floor` - readings scoring below are rejected
    pub fn new(channel_capacity: usize, quality_floor: u8) -> Self {
        let (tx, rx) = bounded(channel_capacity);

        Self {
            adapters: HashMap::new(),
            metrics: Arc::new(IngestionMetrics::new()),
            tx,
            rx: Some(rx),
            gate: QualityGate::new(quality_floor),
            default_config: BackpressureConfig {
                channel_capacity,
                ..Default::default()
            },
        }
    }

    /// Register a sensor data source
    ///
    /// # Arguments
    /// * `sensor_id` - sensor configuration ID
    /// * `source` - data source implementing `SensorSource`
    /// * `config` - optional backpressure configuration
    #[instrument(
        name = "ingestion_register_source",
        skip(self, source, config),
        fields(sensor_id = %sensor_id)
    )]
    pub fn register_source(
        &mut self,
        sensor_id: String,
        source: Box<dyn SensorSource>,
        config: Option<BackpressureConfig>,
    ) {
        let adapter = GenericSensorAdapter::new(
            sensor_id.clone(),
            source,
            config.unwrap_or_else(|| self.default_config.clone()),
            self.gate,
        );
        debug!(sensor_id = %sensor_id, "registered sensor source");
        self.adapters.insert(sensor_id, Box::new(adapter));
    }

    /// Start all registered sensors
    #[instrument(name = "ingestion_start_all", skip(self))]
    pub fn start_all(&self) {
        info!(count = self.adapters.len(), "starting all sensor adapters");
        for (sensor_id, adapter) in &self.adapters {
            self.start_adapter(sensor_id, adapter.as_ref());
        }
    }

    /// Stop all sensors
    #[instrument(name = "ingestion_stop_all", skip(self))]
    pub fn stop_all(&self) {
        info!(count = self.adapters.len(), "stopping all sensor adapters");
        for (sensor_id, adapter) in &self.adapters {
            self.stop_adapter(sensor_id, adapter.as_ref());
        }
    }

    fn start_adapter(&self, sensor_id: &str, adapter: &dyn SensorAdapter) {
        if !adapter.is_listening() {
            debug!(sensor_id = %sensor_id, "starting adapter");
            adapter.start(self.tx.clone(), self.metrics.clone());
        }
    }

    fn stop_adapter(&self, sensor_id: &str, adapter: &dyn SensorAdapter) {
        if adapter.is_listening() {
            debug!(sensor_id = %sensor_id, "stopping adapter");
            adapter.stop();
        }
    }

    /// Sender side of the reading channel
    ///
    /// Used to feed externally produced readings (transport link) through
    /// the same channel as adapter-produced ones.
    pub fn sender(&self) -> Sender<SensorReading> {
        self.tx.clone()
    }

    /// Get the reading stream receiver
    ///
    /// Note: can only be called once, subsequent calls return None
    pub fn take_receiver(&mut self) -> Option<Receiver<SensorReading>> {
        self.rx.take()
    }

    /// Get metrics reference
    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        self.metrics.clone()
    }

    /// Get registered sensor count
    pub fn sensor_count(&self) -> usize {
        self.adapters.len()
    }

    /// Check if the specified sensor is listening
    pub fn is_sensor_listening(&self, sensor_id: &str) -> bool {
        self.adapters
            .get(sensor_id)
            .map(|a| a.is_listening())
            .unwrap_or(false)
    }
}

impl Drop for IngestionPipeline {
    fn drop(&mut self) {
        self.stop_all();
    }
}
