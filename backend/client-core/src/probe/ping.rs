use crate::connection::handler::{ConnectionHandler, FailureCause, Link};
use crate::protocol::{ClientPacket, ServerPacket};

use std::fmt::{Display, Formatter, Result as FormatResult};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info, warn};
use tokio::sync::oneshot;

/// A measured, reachable server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingReport {
    pub ping_ms: u64,
    pub server_name: Option<String>,
    pub motd: Option<String>,
}

/// Why a probe did not produce a [`PingReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeFailure {
    /// Server closed the connection before answering.
    Terminated { code: Option<u16> },
    /// Transport-level error, including connect failure.
    Failed { reason: String },
    Kicked { reason: Option<String> },
    /// A frame could not be decoded, or the probe's own packet could not be encoded.
    Malformed { reason: String },
    TimedOut,
    /// Session ended locally before a result.
    Aborted,
}

impl Display for ProbeFailure {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        match self {
            ProbeFailure::Terminated { code } => write!(formatter, "terminated (code {:?})", code),
            ProbeFailure::Failed { reason } => write!(formatter, "failed: {}", reason),
            ProbeFailure::Kicked { reason } => write!(
                formatter,
                "kicked: {}",
                reason.as_deref().unwrap_or("no reason given")
            ),
            ProbeFailure::Malformed { reason } => write!(formatter, "malformed: {}", reason),
            ProbeFailure::TimedOut => write!(formatter, "timed out"),
            ProbeFailure::Aborted => write!(formatter, "aborted"),
        }
    }
}

pub type PingResult = Result<PingReport, ProbeFailure>;

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// Ping-only handshake: hello, ping with a timestamp, wait for the matching pong.
///
/// Resolves its channel at most once; whatever happens after is ignored.
pub struct PingHandler {
    hello: Option<ClientPacket>,
    server_name: Option<String>,
    motd: Option<String>,
    sent_echo: Option<u64>,
    resolve: Option<oneshot::Sender<PingResult>>,
}

impl PingHandler {
    pub fn new(hello: ClientPacket, resolve: oneshot::Sender<PingResult>) -> Self {
        Self {
            hello: Some(hello),
            server_name: None,
            motd: None,
            sent_echo: None,
            resolve: Some(resolve),
        }
    }

    fn resolve(&mut self, result: PingResult) {
        if let Some(resolve) = self.resolve.take() {
            let _ = resolve.send(result);
        }
    }
}

impl ConnectionHandler for PingHandler {
    fn on_join(&mut self, link: &mut Link) {
        if let Some(hello) = self.hello.take() {
            link.send(hello);
        }
    }

    fn on_packet(&mut self, packet: ServerPacket, link: &mut Link) {
        match packet {
            ServerPacket::Hello { server_name, motd } => {
                self.server_name = server_name;
                self.motd = motd;
                let echo = now_millis();
                self.sent_echo = Some(echo);
                link.send(ClientPacket::Ping { echo });
            }
            ServerPacket::Pong { echo } if self.sent_echo == Some(echo) => {
                let ping_ms = now_millis().saturating_sub(echo);
                info!(
                    "Pinged {} in {} ms",
                    self.server_name.as_deref().unwrap_or("<unnamed>"),
                    ping_ms
                );
                let report = PingReport {
                    ping_ms,
                    server_name: self.server_name.clone(),
                    motd: self.motd.clone(),
                };
                self.resolve(Ok(report));
                link.close();
            }
            ServerPacket::Pong { echo } => debug!("Ignoring stray pong {}", echo),
            ServerPacket::Kick { reason } => {
                warn!(
                    "Kicked while probing: {}",
                    reason.as_deref().unwrap_or("no reason given")
                );
                self.resolve(Err(ProbeFailure::Kicked { reason }));
                link.close();
            }
            other => debug!("Ignoring {} packet while probing", other.name()),
        }
    }

    fn on_terminate(&mut self, code: Option<u16>) {
        self.resolve(Err(ProbeFailure::Terminated { code }));
    }

    fn on_fail(&mut self, cause: FailureCause) {
        let failure = match cause {
            FailureCause::Transport(reason) => ProbeFailure::Failed { reason },
            FailureCause::Protocol(reason) => ProbeFailure::Malformed { reason },
        };
        self.resolve(Err(failure));
    }
}
