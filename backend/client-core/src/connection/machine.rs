use crate::connection::handler::{ConnectionHandler, FailureCause, Link, LinkCommand, LocalCommand};
use crate::error::identity::IdentityError;
use crate::protocol::ServerPacket;

use std::fmt::{Display, Formatter, Result as FormatResult};

use log::{debug, error, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    AwaitingHello,
    /// Server hello received.
    Handshaking,
    AwaitingIdentity,
    Ready,
    Closing,
    Closed,
    Failed,
}

impl Display for ConnectionState {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        let name = match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting",
            ConnectionState::AwaitingHello => "awaiting hello",
            ConnectionState::Handshaking => "handshaking",
            ConnectionState::AwaitingIdentity => "awaiting identity",
            ConnectionState::Ready => "ready",
            ConnectionState::Closing => "closing",
            ConnectionState::Closed => "closed",
            ConnectionState::Failed => "failed",
        };
        write!(formatter, "{}", name)
    }
}

/// Handshake state and handler routing, free of any I/O.
///
/// Inputs are transport events; outputs are [`LinkCommand`]s for the driver.
/// The handler is dropped as soon as the session ends, so anything arriving
/// afterwards is a no-op.
pub struct ConnectionMachine {
    state: ConnectionState,
    handler: Option<Box<dyn ConnectionHandler>>,
}

impl Default for ConnectionMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionMachine {
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Idle,
            handler: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Install the handler for a new session.
    pub fn begin(&mut self, handler: Box<dyn ConnectionHandler>) {
        if self.handler.is_some() {
            warn!("Replacing a live connection handler without a disconnect");
        }
        self.handler = Some(handler);
        self.state = ConnectionState::Connecting;
    }

    pub fn on_open(&mut self) -> Vec<LinkCommand> {
        self.state = ConnectionState::AwaitingHello;
        let mut link = Link::new();
        if let Some(handler) = self.handler.as_mut() {
            handler.on_join(&mut link);
        }
        self.apply(link)
    }

    pub fn on_connect_failed(&mut self, reason: impl Into<String>) {
        self.fail(FailureCause::Transport(reason.into()));
    }

    /// Decode and route one inbound frame. Decode errors end the session.
    pub fn on_frame(&mut self, frame: &[u8]) -> Vec<LinkCommand> {
        if self.handler.is_none() {
            trace!("Dropping frame with no handler installed");
            return Vec::new();
        }
        match ServerPacket::decode(frame) {
            Ok(packet) => self.on_packet(packet),
            Err(decode_error) => {
                error!("Protocol error, closing connection: {}", decode_error);
                self.fail(FailureCause::Protocol(decode_error.to_string()));
                Vec::new()
            }
        }
    }

    pub fn on_packet(&mut self, packet: ServerPacket) -> Vec<LinkCommand> {
        debug!("Received {} packet in state {}", packet.name(), self.state);
        match &packet {
            ServerPacket::Hello { .. } if self.state == ConnectionState::AwaitingHello => {
                self.state = ConnectionState::Handshaking;
            }
            ServerPacket::Welcome { .. } => self.state = ConnectionState::Ready,
            _ => {}
        }
        let mut link = Link::new();
        if let Some(handler) = self.handler.as_mut() {
            handler.on_packet(packet, &mut link);
        }
        self.apply(link)
    }

    pub fn on_identity_result(&mut self, result: Result<(), IdentityError>) -> Vec<LinkCommand> {
        if self.state == ConnectionState::AwaitingIdentity {
            self.state = ConnectionState::Handshaking;
        }
        let mut link = Link::new();
        match self.handler.as_mut() {
            Some(handler) => handler.on_identity_result(result, &mut link),
            None => debug!("Identity result arrived after the session ended"),
        }
        self.apply(link)
    }

    pub fn on_local(&mut self, command: LocalCommand) -> Vec<LinkCommand> {
        let mut link = Link::new();
        if let Some(handler) = self.handler.as_mut() {
            handler.on_local(command, &mut link);
        }
        self.apply(link)
    }

    /// Remote side closed the transport.
    pub fn on_remote_close(&mut self, code: Option<u16>) {
        if let Some(mut handler) = self.handler.take() {
            handler.on_terminate(code);
        }
        self.state = ConnectionState::Closed;
    }

    /// An outbound packet could not be encoded; the peer would wait for it forever.
    pub fn on_encode_error(&mut self, reason: impl Into<String>) {
        self.fail(FailureCause::Protocol(reason.into()));
    }

    pub fn on_transport_error(&mut self, reason: impl Into<String>) {
        self.fail(FailureCause::Transport(reason.into()));
    }

    /// This side closed the transport. Never reported as terminate or fail.
    pub fn on_local_close(&mut self) {
        if let Some(mut handler) = self.handler.take() {
            handler.on_disconnect();
        }
        self.state = ConnectionState::Closed;
    }

    fn fail(&mut self, cause: FailureCause) {
        if let Some(mut handler) = self.handler.take() {
            handler.on_fail(cause);
        }
        self.state = ConnectionState::Failed;
    }

    fn apply(&mut self, link: Link) -> Vec<LinkCommand> {
        let mut commands = link.into_commands();
        if let Some(close) = commands
            .iter()
            .position(|command| *command == LinkCommand::Close)
        {
            commands.truncate(close + 1);
        }
        for command in &commands {
            match command {
                LinkCommand::VerifyIdentity { .. } => {
                    self.state = ConnectionState::AwaitingIdentity;
                }
                LinkCommand::Close => self.state = ConnectionState::Closing,
                LinkCommand::Send(_) => {}
            }
        }
        commands
    }
}
