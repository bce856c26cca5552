//! The publisher loop
//!
//! Runs on one dedicated thread and is the only code that touches the PUB
//! socket. Each iteration is wrapped in a catch-all boundary: errors and
//! panics are logged and the loop moves on to the next event.

use super::queue::{Event, EventReceiver};
use super::socket::{SocketFactory, SocketManager};
use super::stats::PublisherStats;
use crate::error::{PublishError, Result};
use crate::settings::PublisherSettings;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, trace, warn};

pub(crate) struct PublisherWorker<F: SocketFactory> {
    receiver: EventReceiver,
    sockets: SocketManager<F>,
    settings: Arc<dyn PublisherSettings>,
    stats: Arc<PublisherStats>,
}

impl<F: SocketFactory> PublisherWorker<F> {
    pub(crate) fn new(
        receiver: EventReceiver,
        sockets: SocketManager<F>,
        settings: Arc<dyn PublisherSettings>,
        stats: Arc<PublisherStats>,
    ) -> Self {
        Self {
            receiver,
            sockets,
            settings,
            stats,
        }
    }

    /// Bind eagerly, then publish until every producer handle is gone.
    pub(crate) fn run(mut self) {
        self.guarded(|worker| {
            let port = worker.settings.current_port();
            worker.sockets.ensure_bound(port);
            Ok(())
        });

        while let Some(event) = self.receiver.take() {
            self.guarded(|worker| worker.publish_one(&event));
            self.stats.record_processed();
        }

        debug!("Publisher worker shutting down");
    }

    /// Run one iteration body, absorbing any error or panic.
    fn guarded<R>(&mut self, body: R)
    where
        R: FnOnce(&mut Self) -> Result<()>,
    {
        match panic::catch_unwind(AssertUnwindSafe(|| body(self))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                self.stats.record_loop_failure();
                error!(error = %e, "Unhandled error publishing events");
            }
            Err(payload) => {
                self.stats.record_loop_failure();
                error!(
                    reason = panic_message(payload.as_ref()),
                    "Unhandled panic publishing events"
                );
            }
        }
    }

    fn publish_one(&mut self, event: &Event) -> Result<()> {
        let port = self.settings.current_port();
        if !self.sockets.ensure_bound(port) {
            self.stats.record_skipped_unbound();
            warn!(port, "PUB socket is not bound, dropping event");
            return Ok(());
        }

        trace!(%event, "Publishing event");
        match self.sockets.publish(event.as_bytes()) {
            Ok(()) => {
                self.stats.record_published();
                Ok(())
            }
            Err(PublishError::NotBound) => Err(PublishError::NotBound),
            // logged by the socket manager
            Err(_) => {
                self.stats.record_send_failure();
                Ok(())
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
