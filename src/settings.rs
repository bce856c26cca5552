//! Publisher settings as seen by the core
//!
//! The publisher never caches these. It polls [`PublisherSettings`] before
//! every publish, so an administrator changing the port through
//! [`SharedSettings::configure`] takes effect on the next event (or the one
//! after, if the update races with a publish).

use crate::config::PublisherConfig;
use crate::constants::defaults;
use crate::events::model::JobInfo;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Read-only view of the global publisher settings
pub trait PublisherSettings: Send + Sync {
    /// Port the PUB socket should be bound to
    fn current_port(&self) -> u16;

    /// Global on/off switch for every job
    fn is_globally_enabled(&self) -> bool;

    /// Whether events for `job` should be published: the job's own property
    /// OR the global switch.
    fn is_publishing_enabled(&self, job: &JobInfo) -> bool {
        job.property.map(|p| p.enabled).unwrap_or(false) || self.is_globally_enabled()
    }
}

/// Per-job opt-in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobNotificationProperty {
    pub enabled: bool,
}

impl JobNotificationProperty {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

/// Current global values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalSettings {
    pub globally_enabled: bool,
    pub port: u16,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            globally_enabled: false,
            port: defaults::PORT,
        }
    }
}

/// Mutable, thread-safe settings store
///
/// Writers are administrators saving configuration; readers are producer
/// threads and the publisher worker. Last write wins.
#[derive(Debug, Default)]
pub struct SharedSettings {
    inner: RwLock<GlobalSettings>,
}

impl SharedSettings {
    pub fn new(settings: GlobalSettings) -> Self {
        Self {
            inner: RwLock::new(settings),
        }
    }

    pub fn from_config(config: &PublisherConfig) -> Self {
        Self::new(GlobalSettings {
            globally_enabled: config.globally_enabled,
            port: config.port,
        })
    }

    /// Replace both values at once
    pub fn configure(&self, globally_enabled: bool, port: u16) {
        *self.inner.write() = GlobalSettings {
            globally_enabled,
            port,
        };
    }

    pub fn set_port(&self, port: u16) {
        self.inner.write().port = port;
    }

    pub fn set_globally_enabled(&self, enabled: bool) {
        self.inner.write().globally_enabled = enabled;
    }

    pub fn snapshot(&self) -> GlobalSettings {
        *self.inner.read()
    }
}

impl PublisherSettings for SharedSettings {
    fn current_port(&self) -> u16 {
        self.inner.read().port
    }

    fn is_globally_enabled(&self) -> bool {
        self.inner.read().globally_enabled
    }
}
