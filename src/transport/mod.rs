//! ZeroMQ plumbing for buildcast
//!
//! - Global singleton context with configurable IO threads
//! - PUB socket construction for the publisher
//! - SUB socket construction for consumers of the event stream
//!
//! # Usage
//!
//! ```rust,ignore
//! use buildcast_core::transport::{global_context, open_publisher};
//!
//! let ctx = global_context();
//! let socket = open_publisher(&ctx, "tcp://*:8888", 1024)?;
//! socket.send("onStarted {}", 0)?;
//! ```

mod context;

pub use context::{global_context, init_with_threads, io_thread_count};

use crate::error::{PublishError, Result};
use tracing::{debug, warn};

/// Create a PUB socket and bind it to `endpoint`.
///
/// Linger is zero so closing the socket never waits on queued messages.
pub fn open_publisher(ctx: &zmq::Context, endpoint: &str, send_hwm: i32) -> Result<zmq::Socket> {
    let socket = ctx.socket(zmq::PUB)?;

    if let Err(e) = socket.set_sndhwm(send_hwm) {
        warn!("Failed to set send HWM to {}: {}", send_hwm, e);
    }
    socket.set_linger(0)?;

    socket.bind(endpoint).map_err(|source| PublishError::Bind {
        endpoint: endpoint.to_string(),
        source,
    })?;

    debug!(endpoint, "PUB socket bound");
    Ok(socket)
}

/// Create a SUB socket connected to `endpoint`, filtered by `prefix`.
///
/// An empty prefix receives every event.
pub fn open_subscriber(ctx: &zmq::Context, endpoint: &str, prefix: &str) -> Result<zmq::Socket> {
    let socket = ctx.socket(zmq::SUB)?;
    socket.set_linger(0)?;
    socket.connect(endpoint)?;
    socket.set_subscribe(prefix.as_bytes())?;

    debug!(endpoint, prefix, "SUB socket connected");
    Ok(socket)
}
