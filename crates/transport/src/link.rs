//! Transport link: connection state machine, heartbeat supervision,
//! reconnect with backoff, ordered outbound replay.
//!
//! The link owns the socket on a dedicated task. Inbound sample batches are
//! decoded and handed to the ingestion channel; outbound updates arrive on a
//! bounded channel, pass through the outbound queue and are written in FIFO
//! order. A connection loss keeps the queue intact, so unsent updates are
//! replayed in original order after the next successful connect.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use contracts::{PipelineUpdate, SensorReading, TransportConfig};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, Instant, MissedTickBehavior};
use tracing::{debug, error, info, instrument, warn};

use crate::backoff::ExponentialBackoff;
use crate::queue::OutboundQueue;
use crate::wire::{Envelope, FrameCodec};

/// Connection state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// No connection and none being attempted
    Disconnected,
    /// Connection attempt in flight
    Connecting,
    /// Live connection with heartbeat supervision
    Connected,
    /// Connection lost, backoff before the next attempt
    Reconnecting,
    /// Retry budget exhausted; external intervention required
    Failed,
}

/// Link counters shared with the orchestrator
#[derive(Debug, Default)]
pub struct TransportMetrics {
    /// Envelopes written to the wire
    pub sent_count: AtomicU64,
    /// Sample readings received
    pub received_count: AtomicU64,
    /// Inbound readings dropped because the ingestion channel was full
    pub inbound_dropped_count: AtomicU64,
    /// Reconnect cycles
    pub reconnect_count: AtomicU64,
    /// Heartbeat timeouts
    pub heartbeat_timeout_count: AtomicU64,
}

/// Handle to a running transport link
pub struct TransportHandle {
    outbound_tx: mpsc::Sender<PipelineUpdate>,
    state_rx: watch::Receiver<LinkState>,
    metrics: Arc<TransportMetrics>,
    task: JoinHandle<()>,
}

impl TransportHandle {
    /// Channel for updates to be delivered over the link
    pub fn outbound(&self) -> mpsc::Sender<PipelineUpdate> {
        self.outbound_tx.clone()
    }

    /// Current connection state
    pub fn state(&self) -> LinkState {
        *self.state_rx.borrow()
    }

    /// Watch receiver for state transitions
    pub fn state_watch(&self) -> watch::Receiver<LinkState> {
        self.state_rx.clone()
    }

    /// Shared counters
    pub fn metrics(&self) -> &Arc<TransportMetrics> {
        &self.metrics
    }

    /// Drop the outbound channel and wait for the link task to finish
    pub async fn shutdown(self) {
        drop(self.outbound_tx);
        if let Err(e) = self.task.await {
            error!(error = ?e, "transport task panicked");
        }
    }
}

/// Spawn the transport link task.
///
/// Decoded inbound readings are forwarded to `inbound_tx` (the ingestion
/// channel); a full channel drops the reading with a counted metric rather
/// than blocking the socket reader.
pub fn spawn_link(
    config: TransportConfig,
    inbound_tx: async_channel::Sender<SensorReading>,
) -> TransportHandle {
    let (outbound_tx, outbound_rx) = mpsc::channel(config.queue_capacity);
    let (state_tx, state_rx) = watch::channel(LinkState::Disconnected);
    let metrics = Arc::new(TransportMetrics::default());

    let task_metrics = Arc::clone(&metrics);
    let task = tokio::spawn(async move {
        run_link(config, inbound_tx, outbound_rx, state_tx, task_metrics).await;
    });

    TransportHandle {
        outbound_tx,
        state_rx,
        metrics,
        task,
    }
}

/// Why a connected session ended
enum SessionEnd {
    /// Producer side shut down; drain and exit
    Shutdown,
    /// Socket error or heartbeat timeout; reconnect
    Lost,
}

#[instrument(name = "transport_link", skip_all, fields(endpoint = %config.endpoint))]
async fn run_link(
    config: TransportConfig,
    inbound_tx: async_channel::Sender<SensorReading>,
    mut outbound_rx: mpsc::Receiver<PipelineUpdate>,
    state_tx: watch::Sender<LinkState>,
    metrics: Arc<TransportMetrics>,
) {
    let codec = FrameCodec::new(config.compression);
    let mut queue = OutboundQueue::new(config.queue_capacity);
    let mut backoff = ExponentialBackoff::new(
        Duration::from_millis(config.backoff_base_ms),
        Duration::from_secs(config.backoff_cap_s),
        config.max_attempts,
    );

    loop {
        let _ = state_tx.send(LinkState::Connecting);

        match TcpStream::connect(&config.endpoint).await {
            Ok(stream) => {
                info!("transport connected");
                backoff.reset();
                let _ = state_tx.send(LinkState::Connected);

                let end = run_session(
                    stream,
                    &codec,
                    &config,
                    &mut queue,
                    &mut outbound_rx,
                    &inbound_tx,
                    &metrics,
                )
                .await;

                match end {
                    SessionEnd::Shutdown => {
                        let _ = state_tx.send(LinkState::Disconnected);
                        info!("transport shut down");
                        return;
                    }
                    SessionEnd::Lost => {
                        metrics.reconnect_count.fetch_add(1, Ordering::Relaxed);
                        warn!("transport connection lost");
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "transport connect failed");
            }
        }

        let Some(delay) = backoff.next_delay() else {
            error!(
                attempts = backoff.attempt(),
                "transport retry budget exhausted"
            );
            let _ = state_tx.send(LinkState::Failed);
            return;
        };

        let _ = state_tx.send(LinkState::Reconnecting);
        debug!(delay_ms = delay.as_millis() as u64, "backing off before reconnect");

        // Keep absorbing outbound updates into the queue while waiting, so
        // nothing upstream ever blocks on a down link
        let deadline = Instant::now() + delay;
        loop {
            tokio::select! {
                _ = sleep_until_deadline(deadline) => break,
                item = outbound_rx.recv() => match item {
                    Some(update) => queue.push(Envelope::Update(Box::new(update))),
                    None => {
                        let _ = state_tx.send(LinkState::Disconnected);
                        info!("transport shut down while disconnected");
                        return;
                    }
                },
            }
        }
    }
}

async fn sleep_until_deadline(deadline: Instant) {
    let now = Instant::now();
    if deadline > now {
        sleep(deadline - now).await;
    }
}

/// Drive one live connection until it ends
async fn run_session<S: AsyncRead + AsyncWrite + Unpin + Send + 'static>(
    stream: S,
    codec: &FrameCodec,
    config: &TransportConfig,
    queue: &mut OutboundQueue,
    outbound_rx: &mut mpsc::Receiver<PipelineUpdate>,
    inbound_tx: &async_channel::Sender<SensorReading>,
    metrics: &TransportMetrics,
) -> SessionEnd {
    let (mut reader, mut writer) = tokio::io::split(stream);

    // Frames are read on a dedicated task: select! cancellation must never
    // abandon a half-read frame, or the stream desyncs
    let (frame_tx, mut frame_rx) = mpsc::channel(64);
    let read_codec = *codec;
    let reader_task = tokio::spawn(async move {
        loop {
            let result = read_codec.read_frame(&mut reader).await;
            let failed = result.is_err();
            if frame_tx.send(result).await.is_err() || failed {
                break;
            }
        }
    });

    let heartbeat_period = Duration::from_secs_f64(config.heartbeat_interval_s.max(0.1));
    let mut heartbeat = interval(heartbeat_period);
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut heartbeat_seq: u64 = 0;
    let mut last_ack = Instant::now();

    // Replay everything still queued from before the reconnect, in order
    if let Err(end) = drain_queue(queue, codec, &mut writer, metrics).await {
        reader_task.abort();
        return end;
    }

    let end = session_loop(
        codec,
        queue,
        outbound_rx,
        inbound_tx,
        metrics,
        &mut writer,
        &mut frame_rx,
        &mut heartbeat,
        heartbeat_period,
        &mut heartbeat_seq,
        &mut last_ack,
    )
    .await;

    reader_task.abort();
    end
}

#[allow(clippy::too_many_arguments)]
async fn session_loop<W: AsyncWrite + Unpin>(
    codec: &FrameCodec,
    queue: &mut OutboundQueue,
    outbound_rx: &mut mpsc::Receiver<PipelineUpdate>,
    inbound_tx: &async_channel::Sender<SensorReading>,
    metrics: &TransportMetrics,
    writer: &mut W,
    frame_rx: &mut mpsc::Receiver<Result<Envelope, contracts::PipelineError>>,
    heartbeat: &mut tokio::time::Interval,
    heartbeat_period: Duration,
    heartbeat_seq: &mut u64,
    last_ack: &mut Instant,
) -> SessionEnd {
    loop {
        tokio::select! {
            frame = frame_rx.recv() => match frame {
                Some(Ok(Envelope::Samples(readings))) => {
                    for reading in readings {
                        metrics.received_count.fetch_add(1, Ordering::Relaxed);
                        if inbound_tx.try_send(reading).is_err() {
                            metrics.inbound_dropped_count.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
                Some(Ok(Envelope::HeartbeatAck { seq })) => {
                    debug!(seq, "heartbeat ack");
                    *last_ack = Instant::now();
                }
                Some(Ok(Envelope::Heartbeat { seq })) => {
                    // Peer-initiated probe; answer immediately
                    if codec
                        .write_frame(writer, &Envelope::HeartbeatAck { seq })
                        .await
                        .is_err()
                    {
                        return SessionEnd::Lost;
                    }
                }
                Some(Ok(Envelope::Update(_))) => {
                    debug!("ignoring inbound update envelope");
                }
                Some(Err(e)) => {
                    warn!(error = %e, "transport read failed");
                    return SessionEnd::Lost;
                }
                None => {
                    warn!("transport reader stopped");
                    return SessionEnd::Lost;
                }
            },

            item = outbound_rx.recv() => match item {
                Some(update) => {
                    queue.push(Envelope::Update(Box::new(update)));
                    if let Err(end) = drain_queue(queue, codec, writer, metrics).await {
                        return end;
                    }
                }
                None => {
                    // Best-effort final drain before shutting down
                    let _ = drain_queue(queue, codec, writer, metrics).await;
                    return SessionEnd::Shutdown;
                }
            },

            _ = heartbeat.tick() => {
                if last_ack.elapsed() > 2 * heartbeat_period {
                    metrics.heartbeat_timeout_count.fetch_add(1, Ordering::Relaxed);
                    warn!("heartbeat ack overdue, forcing reconnect");
                    return SessionEnd::Lost;
                }

                *heartbeat_seq += 1;
                if codec
                    .write_frame(writer, &Envelope::Heartbeat { seq: *heartbeat_seq })
                    .await
                    .is_err()
                {
                    return SessionEnd::Lost;
                }
            },
        }
    }
}

/// Write queued envelopes FIFO; on failure the unsent head goes back first
async fn drain_queue<W: AsyncWrite + Unpin>(
    queue: &mut OutboundQueue,
    codec: &FrameCodec,
    writer: &mut W,
    metrics: &TransportMetrics,
) -> Result<(), SessionEnd> {
    while let Some(envelope) = queue.pop() {
        match codec.write_frame(writer, &envelope).await {
            Ok(()) => {
                metrics.sent_count.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                warn!(error = %e, "transport write failed");
                queue.requeue_front(envelope);
                return Err(SessionEnd::Lost);
            }
        }
    }
    Ok(())
}
