//! PUB socket lifecycle
//!
//! [`SocketManager`] owns at most one bound socket and moves between two
//! states:
//!
//! ```text
//! Unbound --ensure_bound(P) ok--> Bound(P)
//! Bound(P) --ensure_bound(Q), Q != P--> Unbound --bind ok--> Bound(Q)
//!                                               \--bind err--> Unbound
//! ```
//!
//! The old socket is always unbound and closed before the new one is
//! opened, so two sockets are never live at once. Nothing here ever
//! returns a bind or teardown failure to the caller; they are logged and
//! the manager stays usable.

use super::stats::PublisherStats;
use crate::constants::endpoints;
use crate::error::{PublishError, Result};
use crate::transport;
use std::sync::Arc;
use tracing::{error, info, trace, warn};

/// A bound publish socket
pub trait PubSocket: Send {
    /// Send `bytes` as a single message
    fn send(&self, bytes: &[u8]) -> Result<()>;

    /// Stop listening. The socket is closed when dropped.
    fn unbind(&self) -> Result<()>;
}

/// Opens publish sockets bound to an endpoint
pub trait SocketFactory: Send {
    type Socket: PubSocket;

    fn bind(&self, endpoint: &str) -> Result<Self::Socket>;
}

/// ZeroMQ PUB socket
pub struct ZmqPubSocket {
    socket: zmq::Socket,
    /// Resolved endpoint (`tcp://0.0.0.0:8888`), needed for unbind
    resolved: Option<String>,
}

impl PubSocket for ZmqPubSocket {
    fn send(&self, bytes: &[u8]) -> Result<()> {
        self.socket.send(bytes, 0)?;
        Ok(())
    }

    fn unbind(&self) -> Result<()> {
        match &self.resolved {
            Some(endpoint) => Ok(self.socket.unbind(endpoint)?),
            None => Ok(()),
        }
    }
}

/// Creates [`ZmqPubSocket`]s from a shared context
#[derive(Clone)]
pub struct ZmqSocketFactory {
    context: Arc<zmq::Context>,
    send_hwm: i32,
}

impl ZmqSocketFactory {
    pub fn new(context: Arc<zmq::Context>, send_hwm: i32) -> Self {
        Self { context, send_hwm }
    }
}

impl SocketFactory for ZmqSocketFactory {
    type Socket = ZmqPubSocket;

    fn bind(&self, endpoint: &str) -> Result<Self::Socket> {
        let socket = transport::open_publisher(&self.context, endpoint, self.send_hwm)?;
        let resolved = socket.get_last_endpoint().ok().and_then(|e| e.ok());
        Ok(ZmqPubSocket { socket, resolved })
    }
}

enum SocketState<S> {
    Unbound,
    Bound { port: u16, endpoint: String, socket: S },
}

/// Owns the single publish socket and keeps it bound to the configured port
pub struct SocketManager<F: SocketFactory> {
    factory: F,
    state: SocketState<F::Socket>,
    stats: Arc<PublisherStats>,
}

impl<F: SocketFactory> SocketManager<F> {
    pub fn new(factory: F, stats: Arc<PublisherStats>) -> Self {
        Self {
            factory,
            state: SocketState::Unbound,
            stats,
        }
    }

    /// Port of the currently bound socket, if any
    pub fn bound_port(&self) -> Option<u16> {
        match &self.state {
            SocketState::Bound { port, .. } => Some(*port),
            SocketState::Unbound => None,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.bound_port().is_some()
    }

    /// Make sure a socket is bound to `port`.
    ///
    /// No-op when already bound to `port`. Returns whether a socket is bound
    /// afterwards.
    pub fn ensure_bound(&mut self, port: u16) -> bool {
        match self.bound_port() {
            Some(bound) if bound == port => return true,
            Some(bound) => {
                info!(from = bound, to = port, "Changing PUB port");
                self.close();
                self.stats.record_rebind();
            }
            None => info!(port, "Binding PUB socket"),
        }
        self.bind(port)
    }

    fn bind(&mut self, port: u16) -> bool {
        let endpoint = endpoints::wildcard(port);
        match self.factory.bind(&endpoint) {
            Ok(socket) => {
                self.state = SocketState::Bound {
                    port,
                    endpoint,
                    socket,
                };
                true
            }
            Err(e) => {
                error!(%endpoint, error = %e, "Unable to bind PUB socket");
                self.stats.record_bind_failure();
                false
            }
        }
    }

    /// Unbind and close the current socket. Teardown errors are logged only.
    pub fn close(&mut self) {
        if let SocketState::Bound {
            endpoint, socket, ..
        } = std::mem::replace(&mut self.state, SocketState::Unbound)
        {
            if let Err(e) = socket.unbind() {
                info!(%endpoint, error = %e, "Unable to unbind PUB socket");
            }
            drop(socket);
        }
    }

    /// Send `bytes` as one message on the bound socket.
    ///
    /// A send failure is logged and returned but leaves the socket bound.
    pub fn publish(&self, bytes: &[u8]) -> Result<()> {
        let SocketState::Bound { socket, endpoint, .. } = &self.state else {
            return Err(PublishError::NotBound);
        };

        socket.send(bytes).map_err(|e| {
            warn!(%endpoint, error = %e, "Unable to send event");
            e
        })?;
        trace!(%endpoint, len = bytes.len(), "sent event");
        Ok(())
    }
}

impl<F: SocketFactory> Drop for SocketManager<F> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publisher::testing::RecordingFactory;

    fn manager(factory: &RecordingFactory) -> SocketManager<RecordingFactory> {
        SocketManager::new(factory.clone(), Arc::new(PublisherStats::new()))
    }

    #[test]
    fn test_initially_unbound() {
        let factory = RecordingFactory::new();
        let sockets = manager(&factory);
        assert!(!sockets.is_bound());
        assert_eq!(factory.live_sockets(), 0);
    }

    #[test]
    fn test_ensure_bound_binds_wildcard() {
        let factory = RecordingFactory::new();
        let mut sockets = manager(&factory);

        assert!(sockets.ensure_bound(8888));
        assert_eq!(sockets.bound_port(), Some(8888));
        assert_eq!(factory.binds(), vec!["tcp://*:8888".to_string()]);
        assert_eq!(factory.live_sockets(), 1);
    }

    #[test]
    fn test_ensure_bound_same_port_is_noop() {
        let factory = RecordingFactory::new();
        let mut sockets = manager(&factory);

        assert!(sockets.ensure_bound(8888));
        assert!(sockets.ensure_bound(8888));

        assert_eq!(factory.binds().len(), 1);
        assert!(factory.closed().is_empty());
    }

    #[test]
    fn test_port_change_closes_before_rebinding() {
        let factory = RecordingFactory::new();
        let mut sockets = manager(&factory);

        assert!(sockets.ensure_bound(8888));
        assert!(sockets.ensure_bound(9999));

        assert_eq!(sockets.bound_port(), Some(9999));
        assert_eq!(factory.closed(), vec!["tcp://*:8888".to_string()]);
        assert_eq!(factory.live_sockets(), 1);
        assert_eq!(factory.max_live_sockets(), 1);
        assert_eq!(sockets.stats.snapshot().rebinds, 1);
    }

    #[test]
    fn test_failed_rebind_leaves_unbound() {
        let factory = RecordingFactory::new();
        factory.fail_port(9999);
        let mut sockets = manager(&factory);

        assert!(sockets.ensure_bound(8888));
        assert!(!sockets.ensure_bound(9999));

        assert!(!sockets.is_bound());
        assert_eq!(factory.live_sockets(), 0);
        assert!(matches!(sockets.publish(b"x"), Err(PublishError::NotBound)));
        assert_eq!(sockets.stats.snapshot().bind_failures, 1);
    }

    #[test]
    fn test_bind_retried_on_next_call() {
        let factory = RecordingFactory::new();
        factory.fail_port(8888);
        let mut sockets = manager(&factory);

        assert!(!sockets.ensure_bound(8888));
        factory.clear_failures();
        assert!(sockets.ensure_bound(8888));
        assert_eq!(factory.binds().len(), 2);
    }

    #[test]
    fn test_unbind_failure_still_closes() {
        let factory = RecordingFactory::new();
        factory.fail_unbind(true);
        let mut sockets = manager(&factory);

        assert!(sockets.ensure_bound(8888));
        assert!(sockets.ensure_bound(9999));
        assert_eq!(factory.live_sockets(), 1);
        assert_eq!(sockets.bound_port(), Some(9999));
    }

    #[test]
    fn test_publish_requires_bound_socket() {
        let factory = RecordingFactory::new();
        let sockets = manager(&factory);
        assert!(matches!(sockets.publish(b"onStarted {}"), Err(PublishError::NotBound)));
    }

    #[test]
    fn test_publish_sends_single_message() {
        let factory = RecordingFactory::new();
        let mut sockets = manager(&factory);
        sockets.ensure_bound(8888);

        sockets.publish(b"onStarted {\"job\":\"demo\"}").unwrap();
        assert_eq!(
            factory.sent(),
            vec![(8888, "onStarted {\"job\":\"demo\"}".to_string())]
        );
    }

    #[test]
    fn test_send_failure_keeps_socket() {
        let factory = RecordingFactory::new();
        factory.fail_sends(true);
        let mut sockets = manager(&factory);
        sockets.ensure_bound(8888);

        assert!(sockets.publish(b"lost").is_err());
        assert_eq!(sockets.bound_port(), Some(8888));
        assert!(factory.closed().is_empty());

        factory.fail_sends(false);
        sockets.publish(b"kept").unwrap();
        assert_eq!(factory.sent().len(), 1);
    }

    #[test]
    fn test_drop_closes_socket() {
        let factory = RecordingFactory::new();
        {
            let mut sockets = manager(&factory);
            sockets.ensure_bound(8888);
            assert_eq!(factory.live_sockets(), 1);
        }
        assert_eq!(factory.live_sockets(), 0);
    }

    #[test]
    fn test_zmq_factory_rebind_releases_port() {
        let factory = ZmqSocketFactory::new(transport::global_context(), 16);
        let mut sockets = SocketManager::new(factory, Arc::new(PublisherStats::new()));

        let first = free_port();
        let second = free_port();
        assert!(sockets.ensure_bound(first));
        assert!(sockets.ensure_bound(second));
        assert_eq!(sockets.bound_port(), Some(second));
        sockets.publish(b"onStarted {}").unwrap();
    }

    #[test]
    fn test_zmq_factory_bind_conflict_is_absorbed() {
        let listener = std::net::TcpListener::bind("0.0.0.0:0").unwrap();
        let taken = listener.local_addr().unwrap().port();

        let factory = ZmqSocketFactory::new(transport::global_context(), 16);
        let mut sockets = SocketManager::new(factory, Arc::new(PublisherStats::new()));

        assert!(!sockets.ensure_bound(taken));
        assert!(!sockets.is_bound());
    }

    fn free_port() -> u16 {
        let listener = std::net::TcpListener::bind("0.0.0.0:0").unwrap();
        listener.local_addr().unwrap().port()
    }
}
