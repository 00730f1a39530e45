//! In-process transport pairs, for driving connections without sockets.

use crate::connection::transport::{Connector, Transport, TransportEvent};
use crate::error::connection::ConnectionError;

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Server end of an in-memory connection.
pub struct MemoryPeer {
    address: String,
    inbound: UnboundedReceiver<Vec<u8>>,
    outbound: UnboundedSender<TransportEvent>,
}

impl MemoryPeer {
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Next frame the client sent; `None` once the client side is gone.
    pub async fn recv(&mut self) -> Option<Vec<u8>> {
        self.inbound.recv().await
    }

    /// Returns false once the client side is gone.
    pub fn send(&self, frame: Vec<u8>) -> bool {
        self.outbound.send(TransportEvent::Message(frame)).is_ok()
    }

    pub fn close(&self, code: Option<u16>) {
        let _ = self.outbound.send(TransportEvent::Closed { code });
    }

    pub fn fail(&self, reason: impl Into<String>) {
        let _ = self.outbound.send(TransportEvent::Failed(reason.into()));
    }
}

#[derive(Default)]
struct Tracker {
    open: AtomicUsize,
    peak: AtomicUsize,
    total: AtomicUsize,
}

/// Client end of an in-memory connection.
pub struct MemoryTransport {
    outbound: UnboundedSender<Vec<u8>>,
    inbound: UnboundedReceiver<TransportEvent>,
    tracker: Arc<Tracker>,
    closed: bool,
}

impl Transport for MemoryTransport {
    async fn send(&mut self, frame: Vec<u8>) -> Result<(), ConnectionError> {
        self.outbound
            .send(frame)
            .map_err(|_| ConnectionError::send("peer dropped"))
    }

    async fn recv(&mut self) -> TransportEvent {
        match self.inbound.recv().await {
            Some(event) => event,
            None => TransportEvent::Closed { code: None },
        }
    }

    async fn close(&mut self) {
        self.release();
    }
}

impl MemoryTransport {
    fn release(&mut self) {
        if !self.closed {
            self.closed = true;
            self.tracker.open.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Drop for MemoryTransport {
    fn drop(&mut self) {
        self.release();
    }
}

/// Hands the server end of every connection to a [`MemoryPeer`] receiver.
#[derive(Clone)]
pub struct MemoryConnector {
    peers: UnboundedSender<MemoryPeer>,
    refused: Arc<Mutex<HashSet<String>>>,
    tracker: Arc<Tracker>,
}

impl MemoryConnector {
    pub fn new() -> (Self, UnboundedReceiver<MemoryPeer>) {
        let (peers, accepted) = mpsc::unbounded_channel();
        let connector = Self {
            peers,
            refused: Arc::new(Mutex::new(HashSet::new())),
            tracker: Arc::new(Tracker::default()),
        };
        (connector, accepted)
    }

    /// Make connects to `address` fail.
    pub fn refuse(&self, address: impl Into<String>) {
        if let Ok(mut refused) = self.refused.lock() {
            refused.insert(address.into());
        }
    }

    pub fn open_connections(&self) -> usize {
        self.tracker.open.load(Ordering::SeqCst)
    }

    /// Most connections ever open at once.
    pub fn peak_connections(&self) -> usize {
        self.tracker.peak.load(Ordering::SeqCst)
    }

    pub fn total_connections(&self) -> usize {
        self.tracker.total.load(Ordering::SeqCst)
    }

    fn is_refused(&self, address: &str) -> bool {
        self.refused
            .lock()
            .map(|refused| refused.contains(address))
            .unwrap_or(false)
    }
}

impl Connector for MemoryConnector {
    type Transport = MemoryTransport;

    async fn connect(&self, address: &str) -> Result<MemoryTransport, ConnectionError> {
        if self.is_refused(address) {
            return Err(ConnectionError::connect(address, "connection refused"));
        }
        let (client_tx, server_rx) = mpsc::unbounded_channel();
        let (server_tx, client_rx) = mpsc::unbounded_channel();
        let peer = MemoryPeer {
            address: address.to_string(),
            inbound: server_rx,
            outbound: server_tx,
        };
        self.peers
            .send(peer)
            .map_err(|_| ConnectionError::connect(address, "no listener"))?;

        let open = self.tracker.open.fetch_add(1, Ordering::SeqCst) + 1;
        self.tracker.peak.fetch_max(open, Ordering::SeqCst);
        self.tracker.total.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryTransport {
            outbound: client_tx,
            inbound: client_rx,
            tracker: Arc::clone(&self.tracker),
            closed: false,
        })
    }
}
