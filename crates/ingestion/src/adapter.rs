//! Sensor adapter trait and backpressure helper.

use std::sync::Arc;

use async_channel::{Sender, TrySendError};
use contracts::{DropPolicy, SensorChannel, SensorReading};
use tracing::trace;

use crate::config::IngestionMetrics;

/// Sensor adapter trait
///
/// One adapter per registered sensor, responsible for:
/// 1. Attaching to the sensor's data source callback
/// 2. Validating readings at the quality gate
/// 3. Sending to the shared channel (handling backpressure)
pub trait SensorAdapter: Send + Sync {
    /// Get sensor ID
    fn sensor_id(&self) -> &str;

    /// Get channel kind
    fn channel(&self) -> SensorChannel;

    /// Start collecting readings
    ///
    /// # Arguments
    /// * `tx` - reading output channel
    /// * `metrics` - shared ingestion metrics
    fn start(&self, tx: Sender<SensorReading>, metrics: Arc<IngestionMetrics>);

    /// Stop collecting readings
    fn stop(&self);

    /// Check if currently listening
    fn is_listening(&self) -> bool;
}

/// Send a reading, handling the backpressure policy
#[inline]
pub fn send_reading(
    tx: &Sender<SensorReading>,
    reading: SensorReading,
    metrics: &Arc<IngestionMetrics>,
    sensor_id: &str,
    drop_policy: DropPolicy,
) {
    match tx.try_send(reading) {
        Ok(_) => {
            trace!(sensor_id = %sensor_id, "reading sent");
        }
        Err(TrySendError::Full(reading)) => {
            metrics.record_dropped();
            metrics::counter!(
                "biosync_ingestion_dropped_total",
                "sensor_id" => sensor_id.to_string()
            )
            .increment(1);
            match drop_policy {
                DropPolicy::DropNewest => {
                    trace!(sensor_id = %sensor_id, "reading dropped (newest)");
                }
                DropPolicy::DropOldest => {
                    // TODO: needs a channel with sender-side pop for true
                    // drop-oldest; until then the incoming reading is dropped
                    trace!(sensor_id = %sensor_id, "reading dropped (oldest fallback)");
                }
            }
        }
        Err(TrySendError::Closed(_)) => {
            tracing::warn!(sensor_id = %sensor_id, "channel closed");
        }
    }
}
