// Unit tests for the ping-only connection handler

use crate::connection::{ConnectionHandler, FailureCause, Link, LinkCommand};
use crate::probe::ping::{PingHandler, PingResult, ProbeFailure};
use crate::protocol::{ClientPacket, HelloFlags, ServerPacket};

use tokio::sync::oneshot::{self, Receiver, error::TryRecvError};

fn handler() -> (PingHandler, Receiver<PingResult>) {
    let (resolve, result) = oneshot::channel();
    let hello = ClientPacket::Hello {
        flags: HelloFlags::GUEST,
        profile_id: None,
    };
    (PingHandler::new(hello, resolve), result)
}

/// Send the server hello and return the echo of the ping the handler answered with.
fn greet(handler: &mut PingHandler) -> u64 {
    let mut link = Link::new();
    handler.on_packet(
        ServerPacket::Hello {
            server_name: Some("MyServer".to_string()),
            motd: Some("Hi".to_string()),
        },
        &mut link,
    );
    match link.commands() {
        [LinkCommand::Send(ClientPacket::Ping { echo })] => *echo,
        other => panic!("Expected a single ping, got {:?}", other),
    }
}

/// **VALUE**: Only the pong echoing our ping resolves the probe.
///
/// **WHY THIS MATTERS**: A stale pong from an earlier exchange would report a bogus latency.
///
/// **BUG THIS CATCHES**: Resolving on any pong.
#[test]
fn given_stray_then_matching_pong_when_received_then_resolves_once_with_report() {
    // GIVEN
    let (mut handler, mut result) = handler();
    let mut join = Link::new();
    handler.on_join(&mut join);
    let echo = greet(&mut handler);

    // WHEN: A pong with the wrong echo
    let mut stray = Link::new();
    handler.on_packet(ServerPacket::Pong { echo: echo ^ 1 }, &mut stray);

    // THEN: Still pending
    assert!(stray.commands().is_empty());
    assert!(matches!(result.try_recv(), Err(TryRecvError::Empty)));

    // WHEN: The matching pong
    let mut matching = Link::new();
    handler.on_packet(ServerPacket::Pong { echo }, &mut matching);

    // THEN: Report carries hello info and the session closes
    assert_eq!(join.commands().len(), 1);
    assert_eq!(matching.commands(), &[LinkCommand::Close]);
    let report = result.try_recv().unwrap().unwrap();
    assert_eq!(report.server_name.as_deref(), Some("MyServer"));
    assert_eq!(report.motd.as_deref(), Some("Hi"));
}

/// **VALUE**: A kick resolves the probe as kicked and closes.
///
/// **WHY THIS MATTERS**: A full server answered but refused us; that is a ping error.
///
/// **BUG THIS CATCHES**: Waiting for a pong that will never come.
#[test]
fn given_kick_when_probing_then_kicked_failure() {
    // GIVEN
    let (mut handler, mut result) = handler();
    greet(&mut handler);

    // WHEN
    let mut link = Link::new();
    handler.on_packet(
        ServerPacket::Kick {
            reason: Some("full".to_string()),
        },
        &mut link,
    );

    // THEN
    assert_eq!(link.commands(), &[LinkCommand::Close]);
    assert_eq!(
        result.try_recv().unwrap(),
        Err(ProbeFailure::Kicked {
            reason: Some("full".to_string())
        })
    );
}

/// **VALUE**: Remote close and failures map to their probe failures, first one wins.
///
/// **WHY THIS MATTERS**: The pool maps failures to PING_FAIL or PING_ERROR.
///
/// **BUG THIS CATCHES**: Double resolution panicking on a consumed sender.
#[test]
fn given_session_ending_events_when_received_then_first_failure_reported() {
    // GIVEN
    let (mut terminated, mut terminated_result) = handler();
    let (mut failed, mut failed_result) = handler();
    let (mut malformed, mut malformed_result) = handler();

    // WHEN
    terminated.on_terminate(Some(1001));
    terminated.on_fail(FailureCause::Transport("late".to_string()));
    failed.on_fail(FailureCause::Transport("refused".to_string()));
    malformed.on_fail(FailureCause::Protocol("bad id".to_string()));

    // THEN
    assert_eq!(
        terminated_result.try_recv().unwrap(),
        Err(ProbeFailure::Terminated { code: Some(1001) })
    );
    assert_eq!(
        failed_result.try_recv().unwrap(),
        Err(ProbeFailure::Failed {
            reason: "refused".to_string()
        })
    );
    assert_eq!(
        malformed_result.try_recv().unwrap(),
        Err(ProbeFailure::Malformed {
            reason: "bad id".to_string()
        })
    );
}
