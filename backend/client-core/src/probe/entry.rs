use crate::probe::ping::{PingReport, ProbeFailure};
use crate::server_list::ServerRecord;

use std::fmt::{Display, Formatter, Result as FormatResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeState {
    Unknown,
    Queued,
    Pinging,
    Connectable,
    /// Transport error or no answer in time.
    PingFail,
    /// Server answered but the handshake did not complete.
    PingError,
}

impl ProbeState {
    pub fn is_settled(self) -> bool {
        matches!(
            self,
            ProbeState::Connectable | ProbeState::PingFail | ProbeState::PingError
        )
    }

    pub fn is_in_flight(self) -> bool {
        matches!(self, ProbeState::Queued | ProbeState::Pinging)
    }
}

impl Display for ProbeState {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        let name = match self {
            ProbeState::Unknown => "UNKNOWN",
            ProbeState::Queued => "QUEUED",
            ProbeState::Pinging => "PINGING",
            ProbeState::Connectable => "CONNECTABLE",
            ProbeState::PingFail => "PING_FAIL",
            ProbeState::PingError => "PING_ERROR",
        };
        write!(formatter, "{}", name)
    }
}

/// One known server and what the last probe learned about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEntry {
    pub address: String,
    pub last_known_name: Option<String>,
    pub last_known_motd: Option<String>,
    pub last_measured_ping: Option<u64>,
    pub state: ProbeState,
    pub last_failure: Option<ProbeFailure>,
}

impl ServerEntry {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            last_known_name: None,
            last_known_motd: None,
            last_measured_ping: None,
            state: ProbeState::Unknown,
            last_failure: None,
        }
    }

    pub fn from_record(record: ServerRecord) -> Self {
        let mut entry = Self::new(record.address);
        entry.last_known_name = record.last_known_name;
        entry
    }

    pub fn to_record(&self) -> ServerRecord {
        ServerRecord {
            address: self.address.clone(),
            last_known_name: self.last_known_name.clone(),
        }
    }

    pub(crate) fn apply(&mut self, outcome: Result<PingReport, ProbeFailure>) {
        match outcome {
            Ok(report) => {
                self.state = ProbeState::Connectable;
                if report.server_name.is_some() {
                    self.last_known_name = report.server_name;
                }
                self.last_known_motd = report.motd;
                self.last_measured_ping = Some(report.ping_ms);
                self.last_failure = None;
            }
            Err(failure) => {
                self.state = match failure {
                    ProbeFailure::Failed { .. } | ProbeFailure::TimedOut => ProbeState::PingFail,
                    ProbeFailure::Terminated { .. }
                    | ProbeFailure::Kicked { .. }
                    | ProbeFailure::Malformed { .. }
                    | ProbeFailure::Aborted => ProbeState::PingError,
                };
                self.last_measured_ping = None;
                self.last_failure = Some(failure);
            }
        }
    }
}
