//! Common test utilities for publisher integration tests

#![allow(dead_code)]

use buildcast_core::{
    config::PublisherConfig,
    constants::endpoints,
    publisher::Publisher,
    settings::SharedSettings,
    transport,
};
use std::net::TcpListener;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Find an unused TCP port
pub fn free_port() -> u16 {
    let listener = TcpListener::bind("0.0.0.0:0").expect("bind ephemeral port");
    listener.local_addr().expect("local addr").port()
}

/// Start a ZeroMQ publisher on `port` with publishing enabled globally
pub fn start_publisher(port: u16, capacity: usize) -> (Publisher, Arc<SharedSettings>) {
    let config = PublisherConfig {
        port,
        globally_enabled: true,
        queue_capacity: capacity,
        ..Default::default()
    };
    let settings = Arc::new(SharedSettings::from_config(&config));
    let publisher = Publisher::start(&config, settings.clone()).expect("start publisher");
    (publisher, settings)
}

/// SUB socket connected to a local port
pub struct TestSubscriber {
    socket: zmq::Socket,
}

impl TestSubscriber {
    pub fn connect(port: u16) -> Self {
        let ctx = transport::global_context();
        let socket = transport::open_subscriber(&ctx, &endpoints::connect("127.0.0.1", port), "")
            .expect("open subscriber");
        socket.set_rcvtimeo(50).expect("set rcvtimeo");
        Self { socket }
    }

    /// Next message, or `None` after the receive timeout.
    /// Returns the frame and whether more frames followed it.
    pub fn try_recv(&self) -> Option<(Vec<u8>, bool)> {
        let bytes = self.socket.recv_bytes(0).ok()?;
        let more = self.socket.get_rcvmore().unwrap_or(false);
        Some((bytes, more))
    }

    /// Collect every message arriving within `window`
    pub fn drain(&self, window: Duration) -> Vec<String> {
        let deadline = Instant::now() + window;
        let mut messages = Vec::new();
        while Instant::now() < deadline {
            if let Some((bytes, _)) = self.try_recv() {
                messages.push(String::from_utf8_lossy(&bytes).into_owned());
            }
        }
        messages
    }
}

/// Offer `event` until the subscriber sees it.
///
/// PUB/SUB drops messages until the subscription has propagated, so the
/// first few offers may be lost by design.
pub fn publish_until_received(
    publisher: &Publisher,
    subscriber: &TestSubscriber,
    event: &str,
) -> Option<(Vec<u8>, bool)> {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        publisher.offer(event.to_string());
        if let Some(received) = subscriber.try_recv() {
            if received.0 == event.as_bytes() {
                return Some(received);
            }
        }
    }
    None
}

pub fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    false
}
