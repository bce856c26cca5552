//! Shared constants for buildcast
//!
//! Centralizes defaults so the config layer, the publisher and the CLI agree
//! on the same values.

/// Publisher defaults
pub mod defaults {
    /// Listen port used when nothing else is configured
    pub const PORT: u16 = 8888;

    /// Event queue capacity.
    /// Matches `SEND_HWM` so the queue is never the binding constraint.
    pub const QUEUE_CAPACITY: usize = 1024;

    /// PUB socket send high-water-mark
    pub const SEND_HWM: i32 = 1024;

    /// ZMQ context IO threads
    pub const IO_THREADS: i32 = 1;

    /// Name of the dedicated publisher thread
    pub const THREAD_NAME: &str = "buildcast-publisher";
}

/// Endpoint formatting
pub mod endpoints {
    /// Wildcard TCP bind on the given port
    pub fn wildcard(port: u16) -> String {
        format!("tcp://*:{}", port)
    }

    /// TCP endpoint a subscriber connects to
    pub fn connect(host: &str, port: u16) -> String {
        format!("tcp://{}:{}", host, port)
    }
}

/// Environment variable names
pub mod env {
    /// Prefix for config overrides (`BUILDCAST_PORT`, `BUILDCAST_QUEUE_CAPACITY`, ...)
    pub const PREFIX: &str = "BUILDCAST";

    /// ZMQ IO thread count
    pub const ZMQ_IO_THREADS: &str = "BUILDCAST_ZMQ_IO_THREADS";

    pub const LOG_LEVEL: &str = "BUILDCAST_LOG_LEVEL";
    pub const LOG_FILTER: &str = "BUILDCAST_LOG_FILTER";
}
