//! TransportSink - hands updates to the transport reliability layer
//!
//! The sink owns no socket; it forwards into the transport link's bounded
//! outbound channel and the link handles framing, compression, reconnects
//! and replay.

use contracts::{PipelineError, PipelineUpdate, UpdateSink};
use tokio::sync::mpsc;
use tracing::{debug, instrument, warn};

/// Sink that forwards updates to the transport link
pub struct TransportSink {
    name: String,
    tx: mpsc::Sender<PipelineUpdate>,
}

impl TransportSink {
    /// Create a new TransportSink over the link's outbound channel
    pub fn new(name: impl Into<String>, tx: mpsc::Sender<PipelineUpdate>) -> Self {
        Self {
            name: name.into(),
            tx,
        }
    }
}

impl UpdateSink for TransportSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "transport_sink_write",
        skip(self, update),
        fields(sink = %self.name, kind = update.kind())
    )]
    async fn write(&mut self, update: &PipelineUpdate) -> Result<(), PipelineError> {
        // Non-blocking hand-off; the link's own queue policy takes it from here
        match self.tx.try_send(update.clone()) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(u)) => {
                warn!(sink = %self.name, kind = u.kind(), "transport channel full, update dropped");
                metrics::counter!("biosync_transport_sink_dropped_total").increment(1);
                Ok(())
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(PipelineError::TransportSend {
                message: "transport link closed".to_string(),
            }),
        }
    }

    #[instrument(name = "transport_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), PipelineError> {
        // The link drains its own queue
        Ok(())
    }

    #[instrument(name = "transport_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), PipelineError> {
        debug!(sink = %self.name, "TransportSink closed");
        Ok(())
    }
}
