//! # Dispatcher
//!
//! Alert pipeline and update distribution.
//!
//! Responsibilities:
//! - Convert anomaly/metric events into rate-limited, deduplicated alerts
//! - Consume `PipelineUpdate`s and fan out to sinks
//! - Isolate slow sinks so they never block the numeric pipeline

pub mod alerts;
pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod metrics;
pub mod sinks;

pub use alerts::AlertPipeline;
pub use contracts::{PipelineUpdate, UpdateSink};
pub use dispatcher::{create_dispatcher, Dispatcher, DispatcherBuilder, DispatcherConfig};
pub use error::DispatcherError;
pub use handle::SinkHandle;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sinks::{FileSink, LogSink, TransportSink};
