//! Build lifecycle data
//!
//! [`BuildRun`] is what the host hands us for a lifecycle callback.
//! [`JobState`] / [`BuildState`] are the wire representation serialized into
//! the event payload.

use crate::settings::JobNotificationProperty;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Lifecycle phase of a build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Started,
    Completed,
    Finished,
}

impl Phase {
    /// Event name prefixed to the payload on the wire
    pub fn event_name(self) -> &'static str {
        match self {
            Phase::Started => "onStarted",
            Phase::Completed => "onCompleted",
            Phase::Finished => "onFinalized",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Started => write!(f, "STARTED"),
            Phase::Completed => write!(f, "COMPLETED"),
            Phase::Finished => write!(f, "FINISHED"),
        }
    }
}

/// The job a build belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInfo {
    pub name: String,
    /// Job url relative to the host root (`job/demo/`)
    pub url: String,
    /// Per-job opt-in; `None` if the job never configured one
    #[serde(default)]
    pub property: Option<JobNotificationProperty>,
}

/// A build parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildParameter {
    pub name: String,
    pub value: String,
    /// Sensitive values (passwords, tokens) are never published
    #[serde(default)]
    pub sensitive: bool,
}

/// A single build as reported by the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRun {
    pub job: JobInfo,
    pub number: u64,
    /// Build url relative to the host root (`job/demo/1/`)
    pub url: String,
    /// Result once known (`SUCCESS`, `FAILURE`, ...)
    #[serde(default)]
    pub result: Option<String>,
    /// Absolute root url of the host, if configured
    #[serde(default)]
    pub root_url: Option<String>,
    #[serde(default)]
    pub parameters: Vec<BuildParameter>,
    #[serde(default)]
    pub node_name: Option<String>,
    #[serde(default)]
    pub node_description: Option<String>,
    #[serde(default)]
    pub host_name: Option<String>,
}

impl BuildRun {
    /// Status string for the payload: the result if one is known
    pub fn status(&self) -> Option<&str> {
        self.result.as_deref()
    }
}

/// Serialized job state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobState {
    pub name: String,
    pub url: String,
    pub build: BuildState,
}

/// Serialized build state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,
    pub number: u64,
    pub phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,
}

impl JobState {
    /// Build the wire state of `run` in `phase`
    pub fn from_run(run: &BuildRun, phase: Phase, status: Option<&str>) -> Self {
        let full_url = run
            .root_url
            .as_ref()
            .map(|root| format!("{}{}", root, run.url));

        // Present whenever the run carried parameters, even if all were sensitive
        let parameters = (!run.parameters.is_empty()).then(|| {
            run.parameters
                .iter()
                .filter(|p| !p.sensitive)
                .map(|p| (p.name.clone(), p.value.clone()))
                .collect::<BTreeMap<String, String>>()
        });

        JobState {
            name: run.job.name.clone(),
            url: run.job.url.clone(),
            build: BuildState {
                full_url,
                number: run.number,
                phase,
                status: status.map(str::to_string),
                url: run.url.clone(),
                parameters,
                node_name: run.node_name.clone(),
                node_description: run.node_description.clone(),
                host_name: run.host_name.clone(),
            },
        }
    }
}
