//! buildcast: non-blocking publication of build lifecycle events over ZeroMQ.
//!
//! Host callbacks go through [`listener::RunListener`], which formats each
//! event and offers it to the bounded queue of a [`publisher::Publisher`].
//! A single background thread owns the PUB socket, rebinds it when the
//! configured port changes, and absorbs every I/O failure.

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod listener;
pub mod logging;
pub mod publisher;
pub mod settings;
pub mod transport;

// Re-export commonly used types
pub use config::PublisherConfig;
pub use error::{PublishError, Result};
pub use events::{BuildRun, JsonPayloadFormatter, PayloadFormatter, Phase};
pub use listener::RunListener;
pub use publisher::{Publisher, StatsSnapshot};
pub use settings::{PublisherSettings, SharedSettings};
