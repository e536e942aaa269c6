//! Dispatcher - main loop for fan-out to sinks

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use contracts::{PipelineUpdate, SinkConfig, SinkType};

use crate::error::DispatcherError;
use crate::handle::SinkHandle;
use crate::metrics::MetricsSnapshot;
use crate::sinks::{FileSink, LogSink, TransportSink};

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Sink configurations
    pub sinks: Vec<SinkConfig>,
}

/// Builder for creating a Dispatcher
pub struct DispatcherBuilder {
    config: DispatcherConfig,
    input_rx: mpsc::Receiver<PipelineUpdate>,
    /// Outbound channel of the transport link, when one is running
    transport_tx: Option<mpsc::Sender<PipelineUpdate>>,
}

impl DispatcherBuilder {
    /// Create a new DispatcherBuilder
    pub fn new(config: DispatcherConfig, input_rx: mpsc::Receiver<PipelineUpdate>) -> Self {
        Self {
            config,
            input_rx,
            transport_tx: None,
        }
    }

    /// Route `transport` sinks into the given transport outbound channel
    pub fn with_transport(mut self, transport_tx: mpsc::Sender<PipelineUpdate>) -> Self {
        self.transport_tx = Some(transport_tx);
        self
    }

    /// Build and start the dispatcher
    #[instrument(name = "dispatcher_builder_build", skip(self))]
    pub fn build(self) -> Result<Dispatcher, DispatcherError> {
        let handles = Self::initialize_handles(&self.config, self.transport_tx.as_ref())?;

        Ok(Dispatcher {
            handles,
            input_rx: self.input_rx,
        })
    }

    #[instrument(
        name = "dispatcher_initialize_handles",
        skip(config, transport_tx),
        fields(sink_count = config.sinks.len())
    )]
    fn initialize_handles(
        config: &DispatcherConfig,
        transport_tx: Option<&mpsc::Sender<PipelineUpdate>>,
    ) -> Result<Vec<SinkHandle>, DispatcherError> {
        let mut handles = Vec::with_capacity(config.sinks.len());
        for sink_config in &config.sinks {
            handles.push(create_sink_handle(sink_config, transport_tx)?);
        }
        Ok(handles)
    }
}

/// Create a SinkHandle from configuration
#[instrument(
    name = "dispatcher_create_sink_handle",
    skip(config, transport_tx),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
fn create_sink_handle(
    config: &SinkConfig,
    transport_tx: Option<&mpsc::Sender<PipelineUpdate>>,
) -> Result<SinkHandle, DispatcherError> {
    match config.sink_type {
        SinkType::Log => {
            let sink = LogSink::new(&config.name);
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
        SinkType::File => {
            let sink = FileSink::from_params(&config.name, &config.params)
                .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?;
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
        SinkType::Transport => {
            let tx = transport_tx.ok_or_else(|| {
                DispatcherError::sink_creation(&config.name, "no transport link running")
            })?;
            let sink = TransportSink::new(&config.name, tx.clone());
            Ok(SinkHandle::spawn(sink, config.queue_capacity))
        }
    }
}

/// The main Dispatcher that fans out updates to sinks
pub struct Dispatcher {
    handles: Vec<SinkHandle>,
    input_rx: mpsc::Receiver<PipelineUpdate>,
}

impl Dispatcher {
    /// Create a dispatcher with custom sink handles (for testing)
    pub fn with_handles(
        handles: Vec<SinkHandle>,
        input_rx: mpsc::Receiver<PipelineUpdate>,
    ) -> Self {
        Self { handles, input_rx }
    }

    /// Get metrics for all sinks
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.handles
            .iter()
            .map(|h| (h.name().to_string(), h.metrics().snapshot()))
            .collect()
    }

    /// Run the dispatcher main loop
    ///
    /// Consumes updates from input and fans out to all sinks.
    /// Returns when input channel is closed.
    #[instrument(name = "dispatcher_run", skip(self))]
    pub async fn run(mut self) {
        info!(sinks = self.handles.len(), "Dispatcher started");

        let mut update_count: u64 = 0;

        while let Some(update) = self.input_rx.recv().await {
            update_count += 1;
            self.dispatch_update(&update);

            if update_count.is_multiple_of(100) {
                debug!(updates = update_count, "Dispatcher progress");
            }
        }

        info!(
            updates = update_count,
            "Dispatcher input closed, shutting down"
        );

        Self::shutdown_handles(self.handles).await;

        info!("Dispatcher shutdown complete");
    }

    /// Spawn the dispatcher as a background task
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    fn dispatch_update(&self, update: &PipelineUpdate) {
        for handle in &self.handles {
            handle.try_send(update.clone());
        }
    }

    async fn shutdown_handles(handles: Vec<SinkHandle>) {
        for handle in handles {
            handle.shutdown().await;
        }
    }
}

/// Convenience function to create a dispatcher from sink configs
#[instrument(name = "dispatcher_create", skip(sink_configs, input_rx))]
pub fn create_dispatcher(
    sink_configs: Vec<SinkConfig>,
    input_rx: mpsc::Receiver<PipelineUpdate>,
) -> Result<Dispatcher, DispatcherError> {
    let config = DispatcherConfig {
        sinks: sink_configs,
    };
    DispatcherBuilder::new(config, input_rx).build()
}
