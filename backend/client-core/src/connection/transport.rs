use crate::error::connection::ConnectionError;

use std::future::Future;

/// What a transport delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// One binary message, i.e. one packet.
    Message(Vec<u8>),
    /// Remote side closed the channel.
    Closed { code: Option<u16> },
    Failed(String),
}

/// Ordered, reliable, message-oriented duplex channel.
///
/// `recv` must be cancel-safe: the connection polls it alongside other work.
pub trait Transport: Send {
    fn send(&mut self, frame: Vec<u8>) -> impl Future<Output = Result<(), ConnectionError>> + Send;

    /// After `Closed` or `Failed` the transport is not polled again.
    fn recv(&mut self) -> impl Future<Output = TransportEvent> + Send;

    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

/// Opens transports by address.
pub trait Connector: Send + Sync {
    type Transport: Transport;

    fn connect(
        &self,
        address: &str,
    ) -> impl Future<Output = Result<Self::Transport, ConnectionError>> + Send;
}
