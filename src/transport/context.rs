//! Global ZMQ context management
//!
//! Provides a global singleton ZMQ context with configurable IO thread count.
//! Every PUB socket the publisher opens, and every socket it later rebinds,
//! comes from this one context.

use crate::constants::{defaults, env};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::{debug, warn};

/// Global ZMQ context singleton.
///
/// Configuration, first match wins:
/// - [`init_with_threads`] (the `io_threads` config field)
/// - Environment variable: `BUILDCAST_ZMQ_IO_THREADS`
/// - Default: 1
static ZMQ_CONTEXT: OnceCell<Arc<zmq::Context>> = OnceCell::new();

fn new_context(io_threads: i32) -> zmq::Context {
    debug!("initializing global ZMQ context with {} IO thread(s)", io_threads);

    let ctx = zmq::Context::new();
    if let Err(e) = ctx.set_io_threads(io_threads) {
        warn!("Failed to set ZMQ IO threads to {}: {}, using default", io_threads, e);
    }
    ctx
}

/// Get the global ZMQ context.
///
/// Initialized on first access with [`io_thread_count`] IO threads.
pub fn global_context() -> Arc<zmq::Context> {
    ZMQ_CONTEXT
        .get_or_init(|| Arc::new(new_context(io_thread_count())))
        .clone()
}

/// Get the global ZMQ context, creating it with `io_threads` IO threads.
///
/// Only the first initializer decides the thread count; later calls return
/// the existing context unchanged.
pub fn init_with_threads(io_threads: i32) -> Arc<zmq::Context> {
    let mut created = false;
    let ctx = ZMQ_CONTEXT
        .get_or_init(|| {
            created = true;
            Arc::new(new_context(io_threads))
        })
        .clone();
    if !created {
        debug!("ZMQ context already initialized, ignoring io_threads={}", io_threads);
    }
    ctx
}

/// IO thread count from `BUILDCAST_ZMQ_IO_THREADS`, or the default (1).
pub fn io_thread_count() -> i32 {
    std::env::var(env::ZMQ_IO_THREADS)
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|n: &i32| *n > 0)
        .unwrap_or(defaults::IO_THREADS)
}
