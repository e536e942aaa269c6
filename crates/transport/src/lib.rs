//! # Transport
//!
//! Transport reliability layer: the persistent bidirectional stream carrying
//! raw samples in and processed results out.
//!
//! Responsibilities:
//! - Connection state machine with exponential-backoff reconnects
//! - Heartbeat supervision (two missed acks force a reconnect)
//! - Bounded outbound queue with ordered replay across reconnects
//! - Gzip-compressed, length-prefixed bincode framing
//!
//! The link runs on its own task and talks to the numeric pipeline only
//! through bounded channels; a dead or flapping link degrades to "no new
//! data", never to a stalled pipeline.

mod backoff;
mod link;
mod queue;
mod wire;

pub use backoff::ExponentialBackoff;
pub use link::{spawn_link, LinkState, TransportHandle, TransportMetrics};
pub use queue::OutboundQueue;
pub use wire::{Envelope, FrameCodec};
