//! UpdateSink trait - Dispatcher output interface
//!
//! Defines the abstract interface for sinks.

use crate::{PipelineError, PipelineUpdate};

/// Update output trait
///
/// All sink implementations must implement this trait.
#[trait_variant::make(UpdateSink: Send)]
pub trait LocalUpdateSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Write one pipeline update
    ///
    /// # Errors
    /// Returns write error (should include context)
    async fn write(&mut self, update: &PipelineUpdate) -> Result<(), PipelineError>;

    /// Flush buffer (if any)
    async fn flush(&mut self) -> Result<(), PipelineError>;

    /// Close sink
    async fn close(&mut self) -> Result<(), PipelineError>;
}
