//! SensorSource trait - Sensor data source abstraction
//!
//! Defines a unified interface for sensor data sources, decoupling the
//! ingestion adapters from concrete producers. The same interface serves the
//! transport layer's live streams and the mock garment sources used in tests.

use std::sync::Arc;

use crate::{SensorChannel, SensorReading};

/// Sensor data callback type
///
/// When a source produces data, it sends `SensorReading` through this
/// callback. Uses `Arc` to allow callback sharing across multiple contexts.
pub type SensorDataCallback = Arc<dyn Fn(SensorReading) + Send + Sync>;

/// Sensor data source trait
///
/// Abstracts the common behavior of live and mock sensor streams. All sensor
/// data sources implement this trait for use by the ingestion pipeline.
///
/// # Example
///
/// ```ignore
/// let source: Box<dyn SensorSource> = garment.sensor_source("quad_left_imu");
/// source.listen(Arc::new(|reading| {
///     println!("Received reading: {:?}", reading.sensor_id);
/// }));
/// // ... use source ...
/// source.stop();
/// ```
pub trait SensorSource: Send + Sync {
    /// Get sensor ID
    fn sensor_id(&self) -> &str;

    /// Get channel kind
    fn channel(&self) -> SensorChannel;

    /// Register data callback
    ///
    /// When the source produces data, it calls the callback function with
    /// each `SensorReading`. If already listening, repeated calls are
    /// idempotent (won't register multiple callbacks).
    fn listen(&self, callback: SensorDataCallback);

    /// Stop listening
    fn stop(&self);

    /// Check if currently listening
    fn is_listening(&self) -> bool;
}
