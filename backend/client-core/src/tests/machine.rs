// Unit tests for the connection state machine

use crate::connection::{
    ConnectionHandler, ConnectionMachine, ConnectionState, FailureCause, Link, LinkCommand,
    LocalCommand,
};
use crate::error::identity::IdentityError;
use crate::protocol::{ClientPacket, HelloFlags, ServerPacket};
use crate::tests::frames;

use std::sync::{Arc, Mutex};

/// Records every callback by name.
struct Recorder {
    calls: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    fn install(machine: &mut ConnectionMachine) -> Arc<Mutex<Vec<String>>> {
        let calls = Arc::new(Mutex::new(Vec::new()));
        machine.begin(Box::new(Recorder {
            calls: Arc::clone(&calls),
        }));
        calls
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

impl ConnectionHandler for Recorder {
    fn on_join(&mut self, link: &mut Link) {
        self.record("join");
        link.send(ClientPacket::Hello {
            flags: HelloFlags::GUEST,
            profile_id: None,
        });
    }

    fn on_packet(&mut self, packet: ServerPacket, link: &mut Link) {
        self.record(format!("packet {}", packet.name()));
        if let ServerPacket::IdentityRequest { challenge_key } = packet {
            link.verify_identity(challenge_key.unwrap_or_default());
        }
    }

    fn on_identity_result(&mut self, result: Result<(), IdentityError>, link: &mut Link) {
        self.record(format!("identity ok={}", result.is_ok()));
        if result.is_err() {
            link.close();
            link.send(ClientPacket::IdentityComplete);
        }
    }

    fn on_local(&mut self, command: LocalCommand, _link: &mut Link) {
        self.record(format!("local {:?}", command));
    }

    fn on_disconnect(&mut self) {
        self.record("disconnect");
    }

    fn on_terminate(&mut self, code: Option<u16>) {
        self.record(format!("terminate {:?}", code));
    }

    fn on_fail(&mut self, cause: FailureCause) {
        self.record(format!("fail {}", cause));
    }
}

fn calls(recorded: &Arc<Mutex<Vec<String>>>) -> Vec<String> {
    recorded.lock().unwrap().clone()
}

/// **VALUE**: The handshake walks Connecting, AwaitingHello, Handshaking, Ready.
///
/// **WHY THIS MATTERS**: Callers gate page traffic on the Ready state.
///
/// **BUG THIS CATCHES**: Skipping the hello step or never reaching Ready.
#[test]
fn given_new_session_when_handshake_completes_then_states_progress() {
    // GIVEN
    let mut machine = ConnectionMachine::new();
    assert_eq!(machine.state(), ConnectionState::Idle);
    let recorded = Recorder::install(&mut machine);
    assert_eq!(machine.state(), ConnectionState::Connecting);

    // WHEN
    let join = machine.on_open();
    let after_open = machine.state();
    machine.on_frame(&frames::server_hello("S", "M"));
    let after_hello = machine.state();
    machine.on_frame(&frames::welcome("u", "n"));

    // THEN
    assert_eq!(
        join,
        vec![LinkCommand::Send(ClientPacket::Hello {
            flags: HelloFlags::GUEST,
            profile_id: None,
        })]
    );
    assert_eq!(after_open, ConnectionState::AwaitingHello);
    assert_eq!(after_hello, ConnectionState::Handshaking);
    assert_eq!(machine.state(), ConnectionState::Ready);
    assert_eq!(
        calls(&recorded),
        vec!["join", "packet Hello", "packet Welcome"]
    );
}

/// **VALUE**: An identity request parks the machine until the result arrives.
///
/// **WHY THIS MATTERS**: The driver keeps reading frames while verification runs.
///
/// **BUG THIS CATCHES**: Losing track of a pending verification.
#[test]
fn given_identity_request_when_verified_then_awaiting_identity_then_handshaking() {
    // GIVEN
    let mut machine = ConnectionMachine::new();
    let recorded = Recorder::install(&mut machine);
    machine.on_open();
    machine.on_frame(&frames::server_hello("S", "M"));

    // WHEN
    let commands = machine.on_frame(&frames::identity_request("key"));
    let waiting = machine.state();
    machine.on_identity_result(Ok(()));

    // THEN
    assert_eq!(
        commands,
        vec![LinkCommand::VerifyIdentity {
            challenge_key: "key".to_string()
        }]
    );
    assert_eq!(waiting, ConnectionState::AwaitingIdentity);
    assert_eq!(machine.state(), ConnectionState::Handshaking);
    assert!(calls(&recorded).contains(&"identity ok=true".to_string()));
}

/// **VALUE**: A Close command moves to Closing and ends the command list.
///
/// **WHY THIS MATTERS**: Nothing may be sent after a handler asks to close.
///
/// **BUG THIS CATCHES**: Sending packets queued after the close.
#[test]
fn given_handler_closes_when_applied_then_closing_state() {
    // GIVEN
    let mut machine = ConnectionMachine::new();
    Recorder::install(&mut machine);
    machine.on_open();

    // WHEN
    let commands = machine.on_identity_result(Err(IdentityError::no_credential()));

    // THEN
    assert_eq!(machine.state(), ConnectionState::Closing);
    assert_eq!(commands, vec![LinkCommand::Close]);
}

/// **VALUE**: A malformed frame fails the session once with a protocol cause.
///
/// **WHY THIS MATTERS**: Protocol violations are fatal and reported as failures.
///
/// **BUG THIS CATCHES**: Reporting a decode error as a remote close.
#[test]
fn given_malformed_frame_when_received_then_failed_with_protocol_cause() {
    // GIVEN
    let mut machine = ConnectionMachine::new();
    let recorded = Recorder::install(&mut machine);
    machine.on_open();

    // WHEN
    let commands = machine.on_frame(&[200]);

    // THEN
    assert!(commands.is_empty());
    assert_eq!(machine.state(), ConnectionState::Failed);
    assert!(!machine.has_handler());
    let recorded = calls(&recorded);
    assert_eq!(recorded.len(), 2);
    assert!(recorded[1].starts_with("fail protocol:"));
}

/// **VALUE**: An outbound encode failure ends the session like a decode failure.
///
/// **WHY THIS MATTERS**: The peer never receives the packet, so waiting is pointless.
///
/// **BUG THIS CATCHES**: Leaving the machine in AwaitingHello after the hello was dropped.
#[test]
fn given_awaiting_hello_when_encode_fails_then_failed_with_protocol_cause() {
    // GIVEN
    let mut machine = ConnectionMachine::new();
    let recorded = Recorder::install(&mut machine);
    machine.on_open();

    // WHEN
    machine.on_encode_error("cannot encode Hello: string too long");

    // THEN
    assert_eq!(machine.state(), ConnectionState::Failed);
    assert!(!machine.has_handler());
    assert_eq!(
        calls(&recorded),
        vec!["join", "fail protocol: cannot encode Hello: string too long"]
    );
}

/// **VALUE**: Exactly one ending callback fires; later events are dropped.
///
/// **WHY THIS MATTERS**: Probe results and session ends must be reported once.
///
/// **BUG THIS CATCHES**: A late frame or identity result reaching a finished handler.
#[test]
fn given_remote_close_when_later_events_arrive_then_handler_sees_nothing() {
    // GIVEN
    let mut machine = ConnectionMachine::new();
    let recorded = Recorder::install(&mut machine);
    machine.on_open();

    // WHEN
    machine.on_remote_close(Some(1000));
    let late_frame = machine.on_frame(&frames::welcome("u", "n"));
    let late_identity = machine.on_identity_result(Ok(()));
    let late_local = machine.on_local(LocalCommand::RequestDefaultPage);
    machine.on_transport_error("late");
    machine.on_local_close();

    // THEN
    assert!(late_frame.is_empty());
    assert!(late_identity.is_empty());
    assert!(late_local.is_empty());
    assert_eq!(calls(&recorded), vec!["join", "terminate Some(1000)"]);
}

/// **VALUE**: A local close reports disconnect, never terminate or fail.
///
/// **WHY THIS MATTERS**: User-initiated disconnects must not look like errors.
///
/// **BUG THIS CATCHES**: Routing local closes through the failure path.
#[test]
fn given_open_session_when_closed_locally_then_disconnect_only() {
    // GIVEN
    let mut machine = ConnectionMachine::new();
    let recorded = Recorder::install(&mut machine);
    machine.on_open();

    // WHEN
    machine.on_local_close();
    machine.on_remote_close(None);

    // THEN
    assert_eq!(machine.state(), ConnectionState::Closed);
    assert_eq!(calls(&recorded), vec!["join", "disconnect"]);
}

/// **VALUE**: A refused connection fails with a transport cause.
///
/// **WHY THIS MATTERS**: The probe pool maps this to an unreachable server.
///
/// **BUG THIS CATCHES**: Calling on_join for a transport that never opened.
#[test]
fn given_connect_refused_when_reported_then_transport_failure() {
    // GIVEN
    let mut machine = ConnectionMachine::new();
    let recorded = Recorder::install(&mut machine);

    // WHEN
    machine.on_connect_failed("refused");

    // THEN
    assert_eq!(machine.state(), ConnectionState::Failed);
    assert_eq!(calls(&recorded), vec!["fail transport: refused"]);
}
