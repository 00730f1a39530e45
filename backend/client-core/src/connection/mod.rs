//! One client connection: a transport, the handshake state machine and the
//! handler for the current logical session.
//!
//! [`Connection`] is reusable. Starting a session while one is live first
//! disconnects the old one. The handler is installed exactly while a transport
//! is open, and any result that arrives for a finished session is dropped.

pub mod handler;
pub mod machine;
pub mod memory;
pub mod transport;
pub mod ws;

pub use handler::{ConnectionHandler, FailureCause, Link, LinkCommand, LocalCommand};
pub use machine::{ConnectionMachine, ConnectionState};
pub use memory::{MemoryConnector, MemoryPeer, MemoryTransport};
pub use transport::{Connector, Transport, TransportEvent};
pub use ws::{WsConnector, WsTransport};

use crate::error::connection::ConnectionError;
use crate::error::identity::IdentityError;
use crate::identity::{Credential, IdentityProvider};
use crate::probe::ping::{PingHandler, PingReport, ProbeFailure};
use crate::protocol::{ClientPacket, HelloFlags};
use crate::session::SessionHandler;
use crate::sync::{RenderSink, Synchronizer};

use std::future::pending;
use std::sync::Arc;

use futures_util::future::{BoxFuture, ready};
use log::{debug, error, info, warn};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::oneshot;

/// Build the client hello. Without a credential the client is a guest.
pub fn hello_packet(
    login: bool,
    device: HelloFlags,
    credential: Option<&Credential>,
) -> ClientPacket {
    let mut flags = device;
    if login {
        flags |= HelloFlags::LOGIN;
    }
    match credential {
        Some(credential) => ClientPacket::Hello {
            flags,
            profile_id: Some(credential.user_id.clone()),
        },
        None => ClientPacket::Hello {
            flags: flags | HelloFlags::GUEST,
            profile_id: None,
        },
    }
}

enum DriverEvent {
    Transport(TransportEvent),
    Identity(Result<(), IdentityError>),
    Local(Option<LocalCommand>),
}

pub struct Connection<C: Connector> {
    connector: C,
    identity: Arc<dyn IdentityProvider>,
    device: HelloFlags,
    machine: ConnectionMachine,
    transport: Option<C::Transport>,
    pending_identity: Option<BoxFuture<'static, Result<(), IdentityError>>>,
}

impl<C: Connector> Connection<C> {
    pub fn new(connector: C, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            connector,
            identity,
            device: HelloFlags::device(false),
            machine: ConnectionMachine::new(),
            transport: None,
            pending_identity: None,
        }
    }

    /// Device bits sent in every hello. LOGIN and GUEST are added per session.
    pub fn with_device(mut self, device: HelloFlags) -> Self {
        self.device = device;
        self
    }

    pub fn state(&self) -> ConnectionState {
        self.machine.state()
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    pub fn identity(&self) -> &Arc<dyn IdentityProvider> {
        &self.identity
    }

    pub fn device(&self) -> HelloFlags {
        self.device
    }

    /// Connect to `address` and hand the session to `handler`.
    ///
    /// Connect failures are reported to the handler and returned.
    pub async fn open(
        &mut self,
        address: &str,
        handler: Box<dyn ConnectionHandler>,
    ) -> Result<(), ConnectionError> {
        if self.is_connected() || self.machine.has_handler() {
            debug!("Connection busy, disconnecting before opening {}", address);
            self.disconnect().await;
        }
        self.machine.begin(handler);
        match self.connector.connect(address).await {
            Ok(transport) => {
                self.transport = Some(transport);
                let commands = self.machine.on_open();
                self.execute(commands).await;
                Ok(())
            }
            Err(e) => {
                warn!("Failed to connect to {}: {}", address, e);
                self.machine.on_connect_failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Drive the session until the transport is gone.
    ///
    /// `commands` feeds local requests to the handler; when its sender is
    /// dropped the session keeps running without it.
    pub async fn run(
        &mut self,
        mut commands: Option<&mut UnboundedReceiver<LocalCommand>>,
    ) -> ConnectionState {
        loop {
            let Some(transport) = self.transport.as_mut() else {
                break;
            };
            let event = tokio::select! {
                result = wait_identity(&mut self.pending_identity) => DriverEvent::Identity(result),
                command = next_command(&mut commands) => DriverEvent::Local(command),
                event = transport.recv() => DriverEvent::Transport(event),
            };

            match event {
                DriverEvent::Transport(TransportEvent::Message(frame)) => {
                    let commands = self.machine.on_frame(&frame);
                    self.execute(commands).await;
                }
                DriverEvent::Transport(TransportEvent::Closed { code }) => {
                    info!("Connection closed by server (code {:?})", code);
                    self.pending_identity = None;
                    self.transport = None;
                    self.machine.on_remote_close(code);
                }
                DriverEvent::Transport(TransportEvent::Failed(reason)) => {
                    error!("Connection failed: {}", reason);
                    self.pending_identity = None;
                    self.transport = None;
                    self.machine.on_transport_error(reason);
                }
                DriverEvent::Identity(result) => {
                    self.pending_identity = None;
                    let commands = self.machine.on_identity_result(result);
                    self.execute(commands).await;
                }
                DriverEvent::Local(Some(LocalCommand::Disconnect)) => {
                    self.disconnect().await;
                }
                DriverEvent::Local(Some(command)) => {
                    let commands = self.machine.on_local(command);
                    self.execute(commands).await;
                }
                DriverEvent::Local(None) => {
                    debug!("Local command channel closed");
                    commands = None;
                }
            }

            if !self.machine.has_handler() {
                self.release_transport().await;
            }
        }
        self.machine.state()
    }

    /// Close locally. The handler sees `on_disconnect`, never terminate or fail.
    pub async fn disconnect(&mut self) {
        self.pending_identity = None;
        self.machine.on_local_close();
        self.release_transport().await;
    }

    /// Probe `address`: hello, ping, pong, close.
    pub async fn ping(&mut self, address: &str) -> Result<PingReport, ProbeFailure> {
        let (resolve, result) = oneshot::channel();
        let credential = self.identity.current_credential();
        let hello = hello_packet(false, self.device, credential.as_ref());
        let handler = PingHandler::new(hello, resolve);
        if self.open(address, Box::new(handler)).await.is_ok() {
            self.run(None).await;
        }
        result.await.unwrap_or(Err(ProbeFailure::Aborted))
    }

    /// Run a full session on `address`, mirroring the server UI into `sink`.
    pub async fn login<S: RenderSink + 'static>(
        &mut self,
        address: &str,
        sink: S,
        commands: Option<&mut UnboundedReceiver<LocalCommand>>,
    ) -> Result<ConnectionState, ConnectionError> {
        let credential = self.identity.current_credential();
        let hello = hello_packet(true, self.device, credential.as_ref());
        let handler = SessionHandler::new(hello, credential.is_some(), Synchronizer::new(sink));
        self.open(address, Box::new(handler)).await?;
        Ok(self.run(commands).await)
    }

    async fn release_transport(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close().await;
        }
    }

    async fn execute(&mut self, commands: Vec<LinkCommand>) {
        for command in commands {
            match command {
                LinkCommand::Send(packet) => {
                    let Some(transport) = self.transport.as_mut() else {
                        debug!("Dropping {} packet, not connected", packet.name());
                        break;
                    };
                    let frame = match packet.compress() {
                        Ok(frame) => frame,
                        Err(e) => {
                            error!("Failed to encode {} packet, closing: {}", packet.name(), e);
                            self.pending_identity = None;
                            self.machine
                                .on_encode_error(format!("cannot encode {}: {}", packet.name(), e));
                            self.release_transport().await;
                            break;
                        }
                    };
                    debug!("Sending {} packet ({} bytes)", packet.name(), frame.len());
                    if let Err(e) = transport.send(frame).await {
                        error!("Failed to send {} packet: {}", packet.name(), e);
                        self.pending_identity = None;
                        self.transport = None;
                        self.machine.on_transport_error(e.to_string());
                        break;
                    }
                }
                LinkCommand::VerifyIdentity { challenge_key } => {
                    let verification = match self.identity.current_credential() {
                        Some(credential) => self
                            .identity
                            .verify_server_challenge(credential.access_token, challenge_key),
                        None => Box::pin(ready(Err(IdentityError::no_credential())))
                            as BoxFuture<'static, Result<(), IdentityError>>,
                    };
                    self.pending_identity = Some(verification);
                }
                LinkCommand::Close => {
                    self.disconnect().await;
                    break;
                }
            }
        }
    }
}

async fn wait_identity(
    pending_identity: &mut Option<BoxFuture<'static, Result<(), IdentityError>>>,
) -> Result<(), IdentityError> {
    match pending_identity.as_mut() {
        Some(verification) => verification.await,
        None => pending().await,
    }
}

async fn next_command(
    commands: &mut Option<&mut UnboundedReceiver<LocalCommand>>,
) -> Option<LocalCommand> {
    match commands.as_mut() {
        Some(receiver) => receiver.recv().await,
        None => pending().await,
    }
}
