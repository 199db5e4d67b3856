//! Connection registry.
//!
//! The registry is the only owner of client sockets. A socket enters on
//! [`ConnectionRegistry::register`] and leaves on
//! [`ConnectionRegistry::unregister`], which the WebSocket actor calls when
//! the transport reports a disconnect. Broadcast never removes anything.

use std::fmt;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

/// Transport half of a client connection.
pub trait ClientSocket: Send {
    /// Whether the transport can still carry outbound frames.
    fn is_open(&self) -> bool;

    /// Send one text frame.
    fn send_text(&mut self, text: &str) -> anyhow::Result<()>;

    /// Poll for a transport-level disconnect without blocking.
    fn poll_closed(&mut self) -> bool;

    /// Start a graceful close.
    fn close(&mut self) {}
}

/// Opaque connection identifier (16 random bytes, hex encoded).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    fn random() -> Self {
        let bytes: [u8; 16] = rand::random();
        Self(hex::encode(bytes))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Live client connections keyed by id.
pub struct ConnectionRegistry<S> {
    connections: Mutex<FxHashMap<ConnectionId, S>>,
}

impl<S: ClientSocket> Default for ConnectionRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ClientSocket> ConnectionRegistry<S> {
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(FxHashMap::default()),
        }
    }

    /// Store a newly connected socket under a fresh id.
    pub fn register(&self, socket: S) -> ConnectionId {
        let mut connections = self.connections.lock();
        let id = loop {
            let id = ConnectionId::random();
            if !connections.contains_key(&id) {
                break id;
            }
        };
        connections.insert(id.clone(), socket);
        crate::debug!("ws"; "client {} registered (total: {})", id, connections.len());
        id
    }

    /// Remove a connection. Returns `false` if it was already gone.
    pub fn unregister(&self, id: &ConnectionId) -> bool {
        let mut connections = self.connections.lock();
        let removed = connections.remove(id).is_some();
        if removed {
            crate::debug!("ws"; "client {} unregistered (total: {})", id, connections.len());
        }
        removed
    }

    /// Send `message` to every open connection. Returns how many got it.
    ///
    /// Connections that are not open are skipped; send failures are logged
    /// and skipped.
    pub fn broadcast(&self, message: &str) -> usize {
        let mut connections = self.connections.lock();
        let mut delivered = 0;

        for (id, socket) in connections.iter_mut() {
            if !socket.is_open() {
                crate::debug!("ws"; "skip {}: not open", id);
                continue;
            }
            match socket.send_text(message) {
                Ok(()) => delivered += 1,
                Err(e) => crate::debug!("ws"; "send to {} failed: {}", id, e),
            }
        }

        crate::debug!("ws"; "broadcast {:?} to {}/{} clients", message, delivered, connections.len());
        delivered
    }

    /// Ids of connections whose transport reports a disconnect.
    pub fn closed(&self) -> Vec<ConnectionId> {
        let mut connections = self.connections.lock();
        connections
            .iter_mut()
            .filter_map(|(id, socket)| socket.poll_closed().then(|| id.clone()))
            .collect()
    }

    /// Close and drop every connection.
    pub fn close_all(&self) {
        let mut connections = self.connections.lock();
        for (_, mut socket) in connections.drain() {
            socket.close();
        }
    }

    pub fn len(&self) -> usize {
        self.connections.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    /// In-memory socket recording what it was sent.
    #[derive(Clone, Default)]
    struct FakeSocket {
        sent: Arc<Mutex<Vec<String>>>,
        open: Arc<Mutex<bool>>,
        fail: bool,
        disconnected: Arc<Mutex<bool>>,
    }

    impl FakeSocket {
        fn open() -> Self {
            let socket = Self::default();
            *socket.open.lock() = true;
            socket
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::open()
            }
        }

        fn sent(&self) -> Vec<String> {
            self.sent.lock().clone()
        }
    }

    impl ClientSocket for FakeSocket {
        fn is_open(&self) -> bool {
            *self.open.lock()
        }

        fn send_text(&mut self, text: &str) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("broken pipe");
            }
            self.sent.lock().push(text.to_string());
            Ok(())
        }

        fn poll_closed(&mut self) -> bool {
            *self.disconnected.lock()
        }

        fn close(&mut self) {
            *self.open.lock() = false;
        }
    }

    #[test]
    fn test_broadcast_reaches_each_once() {
        let registry = ConnectionRegistry::new();
        let sockets: Vec<_> = (0..3).map(|_| FakeSocket::open()).collect();
        for socket in &sockets {
            registry.register(socket.clone());
        }

        assert_eq!(registry.broadcast("refresh"), 3);
        for socket in &sockets {
            assert_eq!(socket.sent(), vec!["refresh"]);
        }
    }

    #[test]
    fn test_unregistered_gets_nothing() {
        let registry = ConnectionRegistry::new();
        let socket = FakeSocket::open();
        let id = registry.register(socket.clone());
        assert!(registry.unregister(&id));

        assert_eq!(registry.broadcast("refresh"), 0);
        assert!(socket.sent().is_empty());
    }

    #[test]
    fn test_unregister_idempotent() {
        let registry = ConnectionRegistry::new();
        let id = registry.register(FakeSocket::open());
        assert!(registry.unregister(&id));
        assert!(!registry.unregister(&id));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_ids_unique() {
        let registry = ConnectionRegistry::new();
        let ids: rustc_hash::FxHashSet<_> = (0..100)
            .map(|_| registry.register(FakeSocket::open()))
            .collect();
        assert_eq!(ids.len(), 100);
        assert_eq!(registry.len(), 100);
        assert!(ids.iter().all(|id| id.to_string().len() == 32));
    }

    #[test]
    fn test_not_open_skipped_not_removed() {
        let registry = ConnectionRegistry::new();
        let closed = FakeSocket::default();
        let open = FakeSocket::open();
        registry.register(closed.clone());
        registry.register(open.clone());

        assert_eq!(registry.broadcast("refresh"), 1);
        assert!(closed.sent().is_empty());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_send_failure_does_not_stop_broadcast() {
        let registry = ConnectionRegistry::new();
        let good = FakeSocket::open();
        registry.register(FakeSocket::failing());
        registry.register(good.clone());

        assert_eq!(registry.broadcast("refresh"), 1);
        assert_eq!(good.sent(), vec!["refresh"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_closed_reports_disconnects() {
        let registry = ConnectionRegistry::new();
        let gone = FakeSocket::open();
        let gone_id = registry.register(gone.clone());
        registry.register(FakeSocket::open());

        assert!(registry.closed().is_empty());
        *gone.disconnected.lock() = true;
        assert_eq!(registry.closed(), vec![gone_id.clone()]);

        registry.unregister(&gone_id);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_close_all() {
        let registry = ConnectionRegistry::new();
        let socket = FakeSocket::open();
        registry.register(socket.clone());

        registry.close_all();
        assert!(registry.is_empty());
        assert!(!socket.is_open());
    }
}
