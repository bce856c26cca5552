//! Host-facing lifecycle listener
//!
//! Called synchronously from host callback threads. Each callback checks
//! whether the job publishes at all, formats the payload and offers it to
//! the publisher queue. No socket I/O happens here and nothing blocks; a
//! dropped event is only visible in the logs and the publisher stats.

use crate::events::{format_event, BuildRun, LifecycleEvent, PayloadFormatter, Phase};
use crate::publisher::Publisher;
use crate::settings::PublisherSettings;
use std::sync::Arc;
use tracing::trace;

pub struct RunListener<F: PayloadFormatter> {
    publisher: Publisher,
    settings: Arc<dyn PublisherSettings>,
    formatter: F,
}

impl<F: PayloadFormatter> RunListener<F> {
    pub fn new(publisher: Publisher, settings: Arc<dyn PublisherSettings>, formatter: F) -> Self {
        Self {
            publisher,
            settings,
            formatter,
        }
    }

    pub fn on_started(&self, run: &BuildRun) {
        self.handle(run, Phase::Started);
    }

    pub fn on_completed(&self, run: &BuildRun) {
        self.handle(run, Phase::Completed);
    }

    pub fn on_finalized(&self, run: &BuildRun) {
        self.handle(run, Phase::Finished);
    }

    /// Route a host callback to the matching handler
    pub fn dispatch(&self, event: &LifecycleEvent) {
        self.handle(&event.run, event.event.phase());
    }

    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    fn handle(&self, run: &BuildRun, phase: Phase) {
        if !self.settings.is_publishing_enabled(&run.job) {
            trace!(job = %run.job.name, "publishing disabled for job");
            return;
        }

        let Some(payload) = self.formatter.format_payload(run, phase, run.status()) else {
            return;
        };

        self.publisher.offer(format_event(phase, &payload));
    }
}
