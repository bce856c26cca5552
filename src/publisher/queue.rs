//! Bounded event queue between producer threads and the publisher worker
//!
//! `offer` never blocks: a full queue drops the event. `take` blocks the
//! single consumer until an event is available. Backed by a bounded tokio
//! mpsc channel, whose permit accounting is atomic across concurrent senders.

use super::stats::PublisherStats;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Semaphore;
use tracing::{debug, trace, warn};

/// Largest capacity the underlying channel accepts
pub const MAX_QUEUE_CAPACITY: usize = Semaphore::MAX_PERMITS;

/// An already-formatted event: `"<eventName> <payload>"`
pub type Event = String;

/// Create a queue holding at most `capacity` events.
///
/// Returns the producer handle (cloneable, shared by all producer threads)
/// and the consumer end owned by the publisher worker. `capacity` is clamped
/// to `1..=MAX_QUEUE_CAPACITY`.
pub fn event_queue(capacity: usize, stats: Arc<PublisherStats>) -> (EventQueue, EventReceiver) {
    let (sender, receiver) = mpsc::channel(capacity.clamp(1, MAX_QUEUE_CAPACITY));
    (EventQueue { sender, stats }, EventReceiver { receiver })
}

/// Producer side of the event queue
#[derive(Debug, Clone)]
pub struct EventQueue {
    sender: mpsc::Sender<Event>,
    stats: Arc<PublisherStats>,
}

impl EventQueue {
    /// Append `event` without blocking.
    ///
    /// Returns `false` if the event was dropped because the queue is full or
    /// the worker is gone.
    pub fn offer(&self, event: Event) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => {
                self.stats.record_enqueued();
                true
            }
            Err(TrySendError::Full(event)) => {
                self.stats.record_dropped_full();
                debug!(
                    capacity = self.capacity(),
                    "event queue full, dropping event"
                );
                trace!(%event, "dropped event");
                false
            }
            Err(TrySendError::Closed(_)) => {
                warn!("publisher worker is gone, dropping event");
                false
            }
        }
    }

    /// Number of events currently queued
    pub fn len(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.sender.max_capacity()
    }
}

/// Consumer side of the event queue. Owned by exactly one thread.
#[derive(Debug)]
pub struct EventReceiver {
    receiver: mpsc::Receiver<Event>,
}

impl EventReceiver {
    /// Block until an event is available and return the oldest one.
    ///
    /// Returns `None` once every [`EventQueue`] handle has been dropped and
    /// the queue is drained. Must not be called from inside an async runtime.
    pub fn take(&mut self) -> Option<Event> {
        self.receiver.blocking_recv()
    }

    /// Return the oldest event if one is ready.
    pub fn try_take(&mut self) -> Option<Event> {
        self.receiver.try_recv().ok()
    }
}
