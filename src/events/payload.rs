//! Payload formatting
//!
//! The publisher treats payloads as opaque strings. [`PayloadFormatter`] is
//! the seam where the host decides what goes on the wire; the default
//! [`JsonPayloadFormatter`] writes a [`JobState`] as JSON.

use super::model::{BuildRun, JobState, Phase};
use tracing::warn;

/// Produces the message body for a lifecycle event
pub trait PayloadFormatter: Send + Sync {
    /// Format `run` in `phase`. `None` means nothing should be published.
    fn format_payload(&self, run: &BuildRun, phase: Phase, status: Option<&str>) -> Option<String>;
}

/// Serializes [`JobState`] with `serde_json`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPayloadFormatter;

impl PayloadFormatter for JsonPayloadFormatter {
    fn format_payload(&self, run: &BuildRun, phase: Phase, status: Option<&str>) -> Option<String> {
        let state = JobState::from_run(run, phase, status);
        match serde_json::to_string(&state) {
            Ok(json) => Some(json),
            Err(e) => {
                warn!(job = %run.job.name, number = run.number, error = %e, "failed to serialize job state");
                None
            }
        }
    }
}
