//! In-memory socket factory for exercising the publisher without a network

use super::socket::{PubSocket, SocketFactory};
use crate::error::{PublishError, Result};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct Record {
    binds: Vec<String>,
    closed: Vec<String>,
    sent: Vec<(u16, String)>,
    live: usize,
    max_live: usize,
    failing_ports: HashSet<u16>,
    fail_sends: bool,
    fail_unbind: bool,
    panic_on_send: Option<String>,
    send_delay: Option<Duration>,
}

/// Factory whose sockets record every bind, send and close
#[derive(Clone, Default)]
pub struct RecordingFactory {
    record: Arc<Mutex<Record>>,
}

pub struct RecordingSocket {
    port: u16,
    endpoint: String,
    record: Arc<Mutex<Record>>,
}

impl RecordingFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_port(&self, port: u16) {
        self.record.lock().failing_ports.insert(port);
    }

    pub fn clear_failures(&self) {
        self.record.lock().failing_ports.clear();
    }

    pub fn fail_sends(&self, fail: bool) {
        self.record.lock().fail_sends = fail;
    }

    pub fn fail_unbind(&self, fail: bool) {
        self.record.lock().fail_unbind = fail;
    }

    /// Panic inside `send` when the message equals `message`
    pub fn panic_on(&self, message: &str) {
        self.record.lock().panic_on_send = Some(message.to_string());
    }

    /// Sleep this long inside every `send`
    pub fn delay_sends(&self, delay: Duration) {
        self.record.lock().send_delay = Some(delay);
    }

    pub fn binds(&self) -> Vec<String> {
        self.record.lock().binds.clone()
    }

    pub fn closed(&self) -> Vec<String> {
        self.record.lock().closed.clone()
    }

    pub fn sent(&self) -> Vec<(u16, String)> {
        self.record.lock().sent.clone()
    }

    pub fn live_sockets(&self) -> usize {
        self.record.lock().live
    }

    pub fn max_live_sockets(&self) -> usize {
        self.record.lock().max_live
    }
}

impl SocketFactory for RecordingFactory {
    type Socket = RecordingSocket;

    fn bind(&self, endpoint: &str) -> Result<Self::Socket> {
        let port: u16 = endpoint
            .rsplit(':')
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(|| PublishError::Config(format!("bad endpoint {}", endpoint)))?;

        let mut record = self.record.lock();
        record.binds.push(endpoint.to_string());
        if record.failing_ports.contains(&port) {
            return Err(PublishError::Bind {
                endpoint: endpoint.to_string(),
                source: zmq::Error::EADDRINUSE,
            });
        }
        record.live += 1;
        record.max_live = record.max_live.max(record.live);

        Ok(RecordingSocket {
            port,
            endpoint: endpoint.to_string(),
            record: self.record.clone(),
        })
    }
}

impl PubSocket for RecordingSocket {
    fn send(&self, bytes: &[u8]) -> Result<()> {
        let message = String::from_utf8_lossy(bytes).into_owned();
        let delay = self.record.lock().send_delay;
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        let mut record = self.record.lock();
        if record.panic_on_send.as_deref() == Some(message.as_str()) {
            drop(record);
            panic!("socket exploded on {}", message);
        }
        if record.fail_sends {
            return Err(PublishError::Zmq(zmq::Error::EAGAIN));
        }
        record.sent.push((self.port, message));
        Ok(())
    }

    fn unbind(&self) -> Result<()> {
        if self.record.lock().fail_unbind {
            return Err(PublishError::Zmq(zmq::Error::ENOENT));
        }
        Ok(())
    }
}

impl Drop for RecordingSocket {
    fn drop(&mut self) {
        let mut record = self.record.lock();
        record.live -= 1;
        record.closed.push(self.endpoint.clone());
    }
}
