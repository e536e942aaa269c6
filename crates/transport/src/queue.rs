//! Bounded outbound queue with ordered replay.
//!
//! Holds envelopes that could not be sent yet (link down or writer behind).
//! Overflow drops the oldest entry with a counted metric; nothing blocks the
//! producer. Drain order is strictly FIFO, including across reconnects.

use std::collections::VecDeque;

use crate::wire::Envelope;

/// Bounded FIFO of unsent envelopes
#[derive(Debug)]
pub struct OutboundQueue {
    queue: VecDeque<Envelope>,
    capacity: usize,
    dropped_count: u64,
}

impl OutboundQueue {
    /// Create a queue with the given capacity
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            queue: VecDeque::with_capacity(capacity),
            capacity,
            dropped_count: 0,
        }
    }

    /// Enqueue an envelope, evicting the oldest on overflow
    pub fn push(&mut self, envelope: Envelope) {
        if self.queue.len() >= self.capacity {
            self.queue.pop_front();
            self.dropped_count += 1;
            metrics::counter!("biosync_transport_dropped_total").increment(1);
        }
        self.queue.push_back(envelope);
    }

    /// Next envelope to send (oldest first)
    pub fn pop(&mut self) -> Option<Envelope> {
        self.queue.pop_front()
    }

    /// Put a popped envelope back at the head after a failed send
    pub fn requeue_front(&mut self, envelope: Envelope) {
        self.queue.push_front(envelope);
    }

    /// Queued envelope count
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True when nothing is queued
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Envelopes dropped to overflow since creation
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count
    }
}
