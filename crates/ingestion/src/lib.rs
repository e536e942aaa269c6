//! # Ingestion Pipeline
//!
//! Sensor data ingestion module.
//!
//! Responsibilities:
//! - Register sensor data sources (live transport streams or mock garments)
//! - Reject malformed and low-quality readings at the door
//! - Backpressure management and drop policy
//! - Send to downstream via async-channel
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::IngestionPipeline;
//!
//! let mut pipeline = IngestionPipeline::new(100, 50);
//! pipeline.register_source(sensor_id, source, None);
//!
//! pipeline.start_all();
//! let rx = pipeline.take_receiver().unwrap();
//! while let Ok(reading) = rx.recv().await {
//!     // Process validated reading
//! }
//! ```
//!
//! ## Mock Testing
//!
//! ```ignore
//! use ingestion::MockGarmentSource;
//!
//! let source = MockGarmentSource::imu("pelvis_imu", 200.0);
//! ```

mod adapter;
mod config;
mod error;
mod generic_adapter;
mod mock;
mod pipeline;
mod quality;

// Re-exports
pub use adapter::{send_reading, SensorAdapter};
pub use config::{BackpressureConfig, DropPolicy, IngestionMetrics, MetricsSnapshot};
pub use contracts::SensorReading;
pub use error::{IngestionError, Result};
pub use generic_adapter::GenericSensorAdapter;
pub use mock::{MockGarmentSource, MockSourceConfig};
pub use pipeline::IngestionPipeline;
pub use quality::QualityGate;
