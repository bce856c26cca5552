//! Error types for buildcast.
//!
//! None of these ever reach a producer thread. They flow only inside the
//! publisher worker and the config/CLI layers.

use thiserror::Error;

/// Errors raised while configuring or driving the publisher.
#[derive(Debug, Error)]
pub enum PublishError {
    /// ZMQ error.
    #[error("zmq error: {0}")]
    Zmq(#[from] zmq::Error),

    /// Binding the PUB socket failed.
    #[error("failed to bind {endpoint}: {source}")]
    Bind {
        endpoint: String,
        #[source]
        source: zmq::Error,
    },

    /// A publish was attempted with no bound socket.
    #[error("publisher socket is not bound")]
    NotBound,

    /// Payload serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid or unreadable configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for PublishError {
    fn from(err: config::ConfigError) -> Self {
        PublishError::Config(err.to_string())
    }
}

/// Result type alias for publisher operations.
pub type Result<T> = std::result::Result<T, PublishError>;
