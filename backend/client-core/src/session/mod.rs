//! Full login session: handshake, identity check, then UI synchronization.

use crate::connection::handler::{ConnectionHandler, FailureCause, Link, LocalCommand};
use crate::error::identity::IdentityError;
use crate::protocol::{ClientPacket, ServerPacket};
use crate::sync::{RenderSink, SessionEnd, Synchronizer, UiEvent};

use log::{debug, info, warn};

pub struct SessionHandler<S: RenderSink> {
    hello: Option<ClientPacket>,
    signed_in: bool,
    synchronizer: Synchronizer<S>,
    end: Option<SessionEnd>,
}

impl<S: RenderSink> SessionHandler<S> {
    pub fn new(hello: ClientPacket, signed_in: bool, synchronizer: Synchronizer<S>) -> Self {
        Self {
            hello: Some(hello),
            signed_in,
            synchronizer,
            end: None,
        }
    }

    pub fn synchronizer(&self) -> &Synchronizer<S> {
        &self.synchronizer
    }

    pub fn synchronizer_mut(&mut self) -> &mut Synchronizer<S> {
        &mut self.synchronizer
    }

    fn flush(&mut self, link: &mut Link) {
        for packet in self.synchronizer.drain_outbox() {
            link.send(packet);
        }
    }

    fn finish(&mut self, end: SessionEnd) {
        self.synchronizer
            .sink_mut()
            .emit(UiEvent::SessionEnded(end));
    }
}

impl<S: RenderSink> ConnectionHandler for SessionHandler<S> {
    fn on_join(&mut self, link: &mut Link) {
        if let Some(hello) = self.hello.take() {
            link.send(hello);
        }
    }

    fn on_packet(&mut self, packet: ServerPacket, link: &mut Link) {
        match packet {
            ServerPacket::Hello { server_name, motd } => {
                info!(
                    "Joined server {}",
                    server_name.as_deref().unwrap_or("<unnamed>")
                );
                self.synchronizer.sink_mut().emit(UiEvent::ServerInfo {
                    name: server_name,
                    motd,
                });
            }
            ServerPacket::IdentityRequest { challenge_key } => {
                if !self.signed_in {
                    warn!("Server requested identity from a guest session");
                }
                info!("Performing identity check");
                link.verify_identity(challenge_key.unwrap_or_default());
            }
            ServerPacket::Kick { reason } => {
                warn!(
                    "Kicked from server: {}",
                    reason.as_deref().unwrap_or("no reason given")
                );
                self.synchronizer
                    .sink_mut()
                    .emit(UiEvent::Kicked { reason });
            }
            ServerPacket::Pong { echo } => debug!("Ignoring pong {} in a login session", echo),
            ServerPacket::Welcome { user_id, nickname } => {
                info!(
                    "Welcomed as {}",
                    nickname.as_deref().unwrap_or("<guest>")
                );
                self.synchronizer.clear();
                self.synchronizer
                    .sink_mut()
                    .emit(UiEvent::Welcome { user_id, nickname });
            }
            ServerPacket::PageListChange(change) => self.synchronizer.on_page_list_change(change),
            ServerPacket::ChangePage { page_id } => self.synchronizer.on_change_page(page_id),
            ServerPacket::UpdatePage(update) => self.synchronizer.on_update_page(update),
            ServerPacket::PageAction(action) => self.synchronizer.on_server_action(action),
        }
        self.flush(link);
    }

    fn on_identity_result(&mut self, result: Result<(), IdentityError>, link: &mut Link) {
        match result {
            Ok(()) => {
                info!("Completed identity check");
                link.send(ClientPacket::IdentityComplete);
            }
            Err(e) => {
                warn!("Identity check failed, disconnecting: {}", e);
                self.end = Some(SessionEnd::IdentityRejected {
                    reason: e.to_string(),
                });
                link.close();
            }
        }
    }

    fn on_local(&mut self, command: LocalCommand, link: &mut Link) {
        match command {
            LocalCommand::RequestPage(page_id) => self.synchronizer.request_page(&page_id),
            LocalCommand::RequestDefaultPage => self.synchronizer.request_default_page(),
            LocalCommand::Action {
                component_id,
                action,
                value,
            } => {
                self.synchronizer.send_action(component_id, &action, value);
            }
            LocalCommand::Disconnect => link.close(),
        }
        self.flush(link);
    }

    fn on_disconnect(&mut self) {
        let end = self.end.take().unwrap_or(SessionEnd::Disconnected);
        self.finish(end);
    }

    fn on_terminate(&mut self, code: Option<u16>) {
        self.finish(SessionEnd::Terminated { code });
    }

    fn on_fail(&mut self, cause: FailureCause) {
        self.finish(SessionEnd::Failed {
            reason: cause.to_string(),
        });
    }
}
