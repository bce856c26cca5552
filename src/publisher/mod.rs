//! Asynchronous publish pipeline
//!
//! Producer threads hand formatted events to [`Publisher::offer`], which
//! never blocks. A single background thread drains the queue, keeps the PUB
//! socket bound to the configured port, and sends each event as one message.
//!
//! ```text
//! producer threads ──offer──▶ EventQueue ──take──▶ worker thread ──▶ PUB tcp://*:<port>
//! ```
//!
//! The worker is started once when the [`Publisher`] is built and is never
//! joined; it exits only when every `Publisher` clone has been dropped or the
//! process ends.

pub mod queue;
pub mod socket;
pub mod stats;
mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use queue::{event_queue, Event, EventQueue, EventReceiver, MAX_QUEUE_CAPACITY};
pub use socket::{PubSocket, SocketFactory, SocketManager, ZmqPubSocket, ZmqSocketFactory};
pub use stats::{PublisherStats, StatsSnapshot};

use crate::config::PublisherConfig;
use crate::error::{PublishError, Result};
use crate::settings::PublisherSettings;
use crate::transport;
use std::sync::Arc;
use std::thread;
use tracing::info;
use worker::PublisherWorker;

/// Handle to the running publish pipeline
#[derive(Debug, Clone)]
pub struct Publisher {
    queue: EventQueue,
    stats: Arc<PublisherStats>,
}

impl Publisher {
    /// Start the ZeroMQ publisher described by `config`.
    ///
    /// The worker thread binds `tcp://*:<port>` right away using whatever port
    /// `settings` reports at that moment.
    pub fn start(config: &PublisherConfig, settings: Arc<dyn PublisherSettings>) -> Result<Self> {
        let context = transport::init_with_threads(config.io_threads);
        let factory = ZmqSocketFactory::new(context, config.send_hwm);
        Self::with_factory(factory, settings, config.queue_capacity, &config.thread_name)
    }

    /// Start a publisher over any socket factory
    pub fn with_factory<F>(
        factory: F,
        settings: Arc<dyn PublisherSettings>,
        capacity: usize,
        thread_name: &str,
    ) -> Result<Self>
    where
        F: SocketFactory + 'static,
    {
        if capacity == 0 || capacity > MAX_QUEUE_CAPACITY {
            return Err(PublishError::Config(format!(
                "queue capacity must be between 1 and {}",
                MAX_QUEUE_CAPACITY
            )));
        }

        let stats = Arc::new(PublisherStats::new());
        let (queue, receiver) = event_queue(capacity, stats.clone());
        let sockets = SocketManager::new(factory, stats.clone());
        let worker = PublisherWorker::new(receiver, sockets, settings, stats.clone());

        // Detached: never joined, dies with the process
        thread::Builder::new()
            .name(thread_name.to_string())
            .spawn(move || worker.run())?;

        info!(capacity = queue.capacity(), thread = thread_name, "Publisher started");
        Ok(Self { queue, stats })
    }

    /// Queue `event` for publishing without blocking.
    ///
    /// Returns `false` if the event was dropped.
    pub fn offer(&self, event: Event) -> bool {
        self.queue.offer(event)
    }

    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}
