//! Configuration management for buildcast.
//!
//! Configuration is layered, later sources overriding earlier ones:
//! 1. Built-in defaults
//! 2. System-wide configuration file (`/etc/buildcast/config.toml`)
//! 3. User-specified configuration file (`--config`)
//! 4. Environment variables (prefixed with `BUILDCAST_`)
//! 5. Command-line arguments
//!
//! # Environment Variables
//!
//! - `BUILDCAST_PORT` - PUB socket port
//! - `BUILDCAST_GLOBALLY_ENABLED` - publish events for every job
//! - `BUILDCAST_QUEUE_CAPACITY` - event queue capacity
//! - `BUILDCAST_SEND_HWM` - PUB socket send high-water-mark
//! - `BUILDCAST_IO_THREADS` - ZMQ context IO threads

use crate::constants::{defaults, env};
use crate::error::{PublishError, Result};
use crate::publisher::MAX_QUEUE_CAPACITY;
use clap::Args;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const SYSTEM_CONFIG: &str = "/etc/buildcast/config.toml";

/// Command-line configuration overrides
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Port for the PUB socket (tcp://*:<port>)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Publish events for every job, regardless of per-job settings
    #[arg(long)]
    pub enable: bool,

    /// Event queue capacity
    #[arg(long)]
    pub queue_capacity: Option<usize>,
}

/// Publisher configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublisherConfig {
    /// PUB socket port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Publish for every job
    #[serde(default)]
    pub globally_enabled: bool,
    /// Maximum queued events before new ones are dropped
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// PUB socket send high-water-mark
    #[serde(default = "default_send_hwm")]
    pub send_hwm: i32,
    /// ZMQ context IO threads
    #[serde(default = "default_io_threads")]
    pub io_threads: i32,
    /// Publisher thread name
    #[serde(default = "default_thread_name")]
    pub thread_name: String,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            globally_enabled: false,
            queue_capacity: default_queue_capacity(),
            send_hwm: default_send_hwm(),
            io_threads: default_io_threads(),
            thread_name: default_thread_name(),
        }
    }
}

impl PublisherConfig {
    /// Load configuration from all sources
    pub fn load(args: &ConfigArgs) -> Result<Self> {
        Self::load_with_env(args, Environment::with_prefix(env::PREFIX).try_parsing(true))
    }

    pub(crate) fn load_with_env(args: &ConfigArgs, environment: Environment) -> Result<Self> {
        let mut builder = Config::builder()
            .add_source(Config::try_from(&PublisherConfig::default())?)
            .add_source(File::with_name(SYSTEM_CONFIG).required(false));

        if let Some(path) = &args.config {
            builder = builder.add_source(File::from(path.as_path()));
        }

        builder = builder.add_source(environment);

        let mut config: PublisherConfig = builder.build()?.try_deserialize()?;

        if let Some(port) = args.port {
            config.port = port;
        }
        if args.enable {
            config.globally_enabled = true;
        }
        if let Some(capacity) = args.queue_capacity {
            config.queue_capacity = capacity;
        }

        config.validate()?;
        debug!(?config, "loaded publisher configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(PublishError::Config("port must be between 1 and 65535".into()));
        }
        if self.queue_capacity == 0 || self.queue_capacity > MAX_QUEUE_CAPACITY {
            return Err(PublishError::Config(format!(
                "queue_capacity must be between 1 and {}",
                MAX_QUEUE_CAPACITY
            )));
        }
        if self.io_threads < 1 {
            return Err(PublishError::Config("io_threads must be at least 1".into()));
        }
        Ok(())
    }
}

fn default_port() -> u16 {
    defaults::PORT
}

fn default_queue_capacity() -> usize {
    defaults::QUEUE_CAPACITY
}

fn default_send_hwm() -> i32 {
    defaults::SEND_HWM
}

fn default_io_threads() -> i32 {
    defaults::IO_THREADS
}

fn default_thread_name() -> String {
    defaults::THREAD_NAME.to_string()
}
