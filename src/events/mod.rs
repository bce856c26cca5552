//! Build lifecycle events
//!
//! Every message on the wire is a single frame:
//!
//! ```text
//! <eventName> <payload>
//! ```
//!
//! - `onStarted` - build started
//! - `onCompleted` - build completed, result known
//! - `onFinalized` - build finalized, logs and artifacts written
//!
//! Subscribers can filter on the event name with a ZeroMQ prefix
//! subscription.

pub mod model;
pub mod payload;

pub use model::{BuildParameter, BuildRun, BuildState, JobInfo, JobState, Phase};
pub use payload::{JsonPayloadFormatter, PayloadFormatter};

use serde::{Deserialize, Serialize};

/// Join an event name and its payload into the wire string
pub fn format_event(phase: Phase, payload: &str) -> String {
    format!("{} {}", phase.event_name(), payload)
}

/// Split a received message into event name and payload
pub fn parse_event(message: &str) -> Option<(&str, &str)> {
    message.split_once(' ')
}

/// Lifecycle callback kind, as delivered by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleKind {
    Started,
    Completed,
    Finalized,
}

impl LifecycleKind {
    pub fn phase(self) -> Phase {
        match self {
            LifecycleKind::Started => Phase::Started,
            LifecycleKind::Completed => Phase::Completed,
            LifecycleKind::Finalized => Phase::Finished,
        }
    }
}

/// One host callback: which lifecycle transition, and for which build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleEvent {
    pub event: LifecycleKind,
    pub run: BuildRun,
}
