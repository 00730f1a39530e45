//! Bounded pool of reusable connections probing known servers.
//!
//! Probe requests wait in a FIFO queue. While the queue is non-empty and a
//! connection is idle, the next address is bound to that connection. A
//! finished probe returns its connection to the back of the idle queue and the
//! queue is re-checked at once, so no more than `capacity` probes are ever in
//! flight.

pub mod entry;
pub mod ping;

pub use entry::{ProbeState, ServerEntry};
pub use ping::{PingHandler, PingReport, PingResult, ProbeFailure};

use crate::connection::{Connection, Connector};
use crate::identity::IdentityProvider;
use crate::protocol::HelloFlags;
use crate::server_list::ServerRecord;

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use log::{debug, info};

pub const DEFAULT_POOL_SIZE: usize = 3;
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

pub struct ProbePool<C: Connector> {
    idle: VecDeque<Connection<C>>,
    capacity: usize,
    queue: VecDeque<String>,
    entries: Vec<ServerEntry>,
    timeout: Duration,
}

impl<C: Connector + Clone> ProbePool<C> {
    /// `capacity` is clamped to at least one connection.
    pub fn new(connector: C, identity: Arc<dyn IdentityProvider>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let idle = (0..capacity)
            .map(|_| Connection::new(connector.clone(), Arc::clone(&identity)))
            .collect();
        Self {
            idle,
            capacity,
            queue: VecDeque::new(),
            entries: Vec::new(),
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }
}

impl<C: Connector> ProbePool<C> {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_device(mut self, device: HelloFlags) -> Self {
        self.idle = self
            .idle
            .drain(..)
            .map(|connection| connection.with_device(device))
            .collect();
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn idle_connections(&self) -> usize {
        self.idle.len()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn entries(&self) -> &[ServerEntry] {
        &self.entries
    }

    pub fn entry(&self, address: &str) -> Option<&ServerEntry> {
        self.entries.iter().find(|entry| entry.address == address)
    }

    /// Records for the persistent server list, in entry order.
    pub fn records(&self) -> Vec<ServerRecord> {
        self.entries.iter().map(ServerEntry::to_record).collect()
    }

    /// Add entries for records not already known.
    pub fn seed(&mut self, records: impl IntoIterator<Item = ServerRecord>) {
        for record in records {
            if self.entry(&record.address).is_none() {
                self.entries.push(ServerEntry::from_record(record));
            }
        }
    }

    /// Returns false if the address was already known.
    pub fn add_server(&mut self, address: impl Into<String>) -> bool {
        let address = address.into();
        if self.entry(&address).is_some() {
            return false;
        }
        self.entries.push(ServerEntry::new(address));
        true
    }

    pub fn remove_server(&mut self, address: &str) -> Option<ServerEntry> {
        self.queue.retain(|queued| queued != address);
        let index = self
            .entries
            .iter()
            .position(|entry| entry.address == address)?;
        Some(self.entries.remove(index))
    }

    /// Queue a probe of `address`, adding it if unknown. No-op while already queued or pinging.
    pub fn enqueue(&mut self, address: &str) -> bool {
        if self.entry(address).is_none() {
            self.entries.push(ServerEntry::new(address));
        }
        let Some(entry) = self
            .entries
            .iter_mut()
            .find(|entry| entry.address == address)
        else {
            return false;
        };
        if entry.state.is_in_flight() {
            return false;
        }
        entry.state = ProbeState::Queued;
        self.queue.push_back(address.to_string());
        true
    }

    /// Queue every known server, in entry order.
    pub fn refresh_all(&mut self) -> usize {
        let addresses: Vec<String> = self
            .entries
            .iter()
            .map(|entry| entry.address.clone())
            .collect();
        addresses
            .iter()
            .filter(|address| self.enqueue(address))
            .count()
    }

    /// Probe until the queue is drained, calling `on_result` as each probe settles.
    pub async fn run(&mut self, mut on_result: impl FnMut(&ServerEntry)) {
        let mut in_flight = FuturesUnordered::new();
        let timeout = self.timeout;
        loop {
            while !self.queue.is_empty() && !self.idle.is_empty() {
                let (Some(address), Some(mut connection)) =
                    (self.queue.pop_front(), self.idle.pop_front())
                else {
                    break;
                };
                let Some(entry) = self
                    .entries
                    .iter_mut()
                    .find(|entry| entry.address == address)
                else {
                    debug!("Skipping probe of removed server {}", address);
                    self.idle.push_front(connection);
                    continue;
                };
                entry.state = ProbeState::Pinging;
                debug!("Probing {}", address);
                in_flight.push(async move {
                    let outcome = match tokio::time::timeout(timeout, connection.ping(&address)).await
                    {
                        Ok(outcome) => outcome,
                        Err(_) => {
                            connection.disconnect().await;
                            Err(ProbeFailure::TimedOut)
                        }
                    };
                    (connection, address, outcome)
                });
            }

            let Some((connection, address, outcome)) = in_flight.next().await else {
                break;
            };
            self.idle.push_back(connection);
            if let Some(entry) = self
                .entries
                .iter_mut()
                .find(|entry| entry.address == address)
            {
                entry.apply(outcome);
                info!("Probe of {} finished: {}", address, entry.state);
                on_result(entry);
            }
        }
    }
}
