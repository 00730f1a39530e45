use crate::error::identity::IdentityError;
use crate::protocol::{ActionValue, ClientPacket, ServerPacket};

use std::fmt::{Display, Formatter, Result as FormatResult};

use log::warn;

/// Side effects a handler asks the connection to perform, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkCommand {
    Send(ClientPacket),
    /// Start out-of-band identity verification for this challenge.
    VerifyIdentity { challenge_key: String },
    /// Close the connection locally; later commands are dropped.
    Close,
}

/// Collects a handler's commands during one callback.
#[derive(Debug, Default)]
pub struct Link {
    commands: Vec<LinkCommand>,
}

impl Link {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send(&mut self, packet: ClientPacket) {
        self.commands.push(LinkCommand::Send(packet));
    }

    pub fn verify_identity(&mut self, challenge_key: impl Into<String>) {
        self.commands.push(LinkCommand::VerifyIdentity {
            challenge_key: challenge_key.into(),
        });
    }

    pub fn close(&mut self) {
        self.commands.push(LinkCommand::Close);
    }

    pub fn commands(&self) -> &[LinkCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<LinkCommand> {
        self.commands
    }
}

/// Requests from the rendering surface while a session runs.
#[derive(Debug, Clone, PartialEq)]
pub enum LocalCommand {
    RequestPage(String),
    RequestDefaultPage,
    Action {
        component_id: u32,
        action: String,
        value: ActionValue,
    },
    Disconnect,
}

/// Why a connection failed rather than closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    Transport(String),
    Protocol(String),
}

impl Display for FailureCause {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        match self {
            FailureCause::Transport(reason) => write!(formatter, "transport: {}", reason),
            FailureCause::Protocol(reason) => write!(formatter, "protocol: {}", reason),
        }
    }
}

/// Receives a connection's events for one logical session.
///
/// Exactly one of `on_disconnect`, `on_terminate` or `on_fail` ends a
/// session, after which the handler is dropped.
pub trait ConnectionHandler: Send {
    /// Transport is open; send the hello.
    fn on_join(&mut self, link: &mut Link);

    fn on_packet(&mut self, packet: ServerPacket, link: &mut Link);

    fn on_identity_result(&mut self, result: Result<(), IdentityError>, link: &mut Link) {
        let _ = (result, link);
    }

    fn on_local(&mut self, command: LocalCommand, link: &mut Link) {
        let _ = link;
        warn!("Local command {:?} ignored by this handler", command);
    }

    /// Closed from this side.
    fn on_disconnect(&mut self) {}

    /// Closed by the remote side.
    fn on_terminate(&mut self, code: Option<u16>);

    fn on_fail(&mut self, cause: FailureCause);
}
