use crate::frames::{self, PageListFrame};
use crate::helpers::{TEST_ACCESS_TOKEN, drain_events, test_credential};

use hibiscus_core::connection::{Connection, ConnectionState, LocalCommand, MemoryConnector};
use hibiscus_core::error::identity::IdentityError;
use hibiscus_core::identity::{Credential, IdentityProvider, StaticIdentity};
use hibiscus_core::probe::ProbeFailure;
use hibiscus_core::protocol::ClientPacket;
use hibiscus_core::sync::{SessionEnd, UiEvent};

use common::RedactedToken;

use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::oneshot;

const ADDRESS: &str = "mem://server";

/// Signed-in identity whose verification waits until the test releases it.
struct GatedIdentity {
    gate: Mutex<Option<oneshot::Receiver<()>>>,
    seen: Arc<Mutex<Vec<(String, String)>>>,
}

impl IdentityProvider for GatedIdentity {
    fn current_credential(&self) -> Option<Credential> {
        Some(test_credential())
    }

    fn verify_server_challenge(
        &self,
        access_token: RedactedToken,
        challenge_key: String,
    ) -> BoxFuture<'static, Result<(), IdentityError>> {
        self.seen
            .lock()
            .unwrap()
            .push((access_token.expose().to_string(), challenge_key));
        let gate = self.gate.lock().unwrap().take();
        Box::pin(async move {
            match gate {
                Some(gate) => gate.await.map_err(|_| IdentityError::cancelled()),
                None => Ok(()),
            }
        })
    }
}

fn encoded(packet: ClientPacket) -> Vec<u8> {
    packet.compress().expect("Failed to encode packet")
}

/// **VALUE**: Frames keep flowing while an identity check is in progress.
///
/// **WHY THIS MATTERS**: Servers send the catalog before the welcome; blocking on the
/// identity core would stall the session.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The driver awaits verification instead of selecting over it
/// - IdentityComplete is sent before verification resolves
/// - The access token or challenge key are not passed through
#[tokio::test]
async fn given_pending_identity_check_when_catalog_arrives_then_handled_before_completion() {
    // GIVEN: A signed-in client whose verification is gated
    let (release, gate) = oneshot::channel();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let identity = GatedIdentity {
        gate: Mutex::new(Some(gate)),
        seen: Arc::clone(&seen),
    };
    let (connector, mut accepted) = MemoryConnector::new();
    let server = tokio::spawn(async move {
        let mut peer = accepted.recv().await.expect("No connection");
        let mut received = vec![peer.recv().await.expect("No hello")];
        peer.send(frames::server_hello("Secure", "motd"));
        peer.send(frames::identity_request("challenge-1"));
        peer.send(
            PageListFrame {
                pages_added: vec![("p1", None, "Home", "home")],
                ..PageListFrame::default()
            }
            .build(),
        );
        received.push(peer.recv().await.expect("No page request"));
        release.send(()).expect("Verification already dropped");
        received.push(peer.recv().await.expect("No identity completion"));
        peer.send(frames::welcome("user-1", "Tester"));
        peer.close(Some(1000));
        received
    });

    // WHEN
    let (sink, mut events) = unbounded_channel();
    let mut connection = Connection::new(connector, Arc::new(identity));
    let state = connection
        .login(ADDRESS, sink, None)
        .await
        .expect("Login failed to connect");
    let received = server.await.expect("Server task panicked");

    // THEN
    assert_eq!(state, ConnectionState::Closed);
    assert_eq!(received[1], encoded(ClientPacket::ChangePage { page_id: None }));
    assert_eq!(received[2], encoded(ClientPacket::IdentityComplete));
    assert_eq!(
        seen.lock().unwrap().as_slice(),
        &[(TEST_ACCESS_TOKEN.to_string(), "challenge-1".to_string())]
    );
    let events = drain_events(&mut events);
    assert!(events.contains(&UiEvent::Welcome {
        user_id: Some("user-1".to_string()),
        nickname: Some("Tester".to_string()),
    }));
}

/// **VALUE**: A rejected identity check disconnects and tells the user why.
///
/// **WHY THIS MATTERS**: Silent disconnects after login look like crashes.
///
/// **BUG THIS CATCHES**: Would catch if a rejection leaves the transport open.
#[tokio::test]
async fn given_rejecting_identity_when_challenged_then_disconnected_with_reason() {
    // GIVEN
    let (connector, mut accepted) = MemoryConnector::new();
    let server = tokio::spawn(async move {
        let mut peer = accepted.recv().await.expect("No connection");
        peer.recv().await.expect("No hello");
        peer.send(frames::server_hello("Secure", "motd"));
        peer.send(frames::identity_request("challenge-1"));
        peer.recv().await
    });
    let identity = StaticIdentity::signed_in(test_credential(), false);

    // WHEN
    let (sink, mut events) = unbounded_channel();
    let mut connection = Connection::new(connector.clone(), Arc::new(identity));
    let state = connection
        .login(ADDRESS, sink, None)
        .await
        .expect("Login failed to connect");
    let after_challenge = server.await.expect("Server task panicked");

    // THEN: Nothing sent after the challenge; the client hung up
    assert_eq!(after_challenge, None);
    assert_eq!(state, ConnectionState::Closed);
    assert_eq!(connector.open_connections(), 0);
    assert!(matches!(
        drain_events(&mut events).last(),
        Some(UiEvent::SessionEnded(SessionEnd::IdentityRejected { .. }))
    ));
}

/// **VALUE**: A guest that is challenged fails verification without calling the identity core.
///
/// **WHY THIS MATTERS**: Guests have no token to present.
///
/// **BUG THIS CATCHES**: Would catch if a guest session hangs waiting for verification.
#[tokio::test]
async fn given_guest_when_challenged_then_rejected_immediately() {
    // GIVEN
    let (connector, mut accepted) = MemoryConnector::new();
    let server = tokio::spawn(async move {
        let mut peer = accepted.recv().await.expect("No connection");
        peer.recv().await.expect("No hello");
        peer.send(frames::server_hello("Secure", "motd"));
        peer.send(frames::identity_request("challenge-1"));
        peer.recv().await
    });

    // WHEN
    let (sink, mut events) = unbounded_channel();
    let mut connection = Connection::new(connector, Arc::new(StaticIdentity::guest()));
    connection
        .login(ADDRESS, sink, None)
        .await
        .expect("Login failed to connect");

    // THEN
    assert_eq!(server.await.expect("Server task panicked"), None);
    match drain_events(&mut events).last() {
        Some(UiEvent::SessionEnded(SessionEnd::IdentityRejected { reason })) => {
            assert!(reason.contains("No Credential"), "{}", reason)
        }
        other => panic!("Expected identity rejection, got {:?}", other),
    }
}

/// **VALUE**: Local navigation and disconnect commands reach the server while the session runs.
///
/// **WHY THIS MATTERS**: The rendering surface drives navigation through this channel.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Local commands are only read between frames
/// - A local disconnect is reported as a failure
#[tokio::test]
async fn given_running_session_when_local_commands_sent_then_forwarded_and_disconnected() {
    // GIVEN: A server that hands the test's command sender a script
    let (connector, mut accepted) = MemoryConnector::new();
    let (commands, mut command_rx) = unbounded_channel();
    let server = tokio::spawn(async move {
        let mut peer = accepted.recv().await.expect("No connection");
        peer.recv().await.expect("No hello");
        peer.send(frames::server_hello("Local", "motd"));
        peer.send(frames::welcome("guest", "Guest"));
        peer.send(
            PageListFrame {
                pages_added: vec![("p1", None, "Home", "home"), ("p2", None, "Next", "next")],
                ..PageListFrame::default()
            }
            .build(),
        );
        peer.recv().await.expect("No default page request");
        peer.send(frames::change_page("p1"));
        commands
            .send(LocalCommand::RequestPage("p2".to_string()))
            .expect("Session stopped reading commands");
        let requested = peer.recv().await.expect("No local page request");
        commands
            .send(LocalCommand::Disconnect)
            .expect("Session stopped reading commands");
        let after = peer.recv().await;
        (requested, after)
    });

    // WHEN
    let (sink, mut events) = unbounded_channel();
    let mut connection = Connection::new(connector, Arc::new(StaticIdentity::guest()));
    let state = connection
        .login(ADDRESS, sink, Some(&mut command_rx))
        .await
        .expect("Login failed to connect");
    let (requested, after) = server.await.expect("Server task panicked");

    // THEN
    assert_eq!(
        requested,
        encoded(ClientPacket::ChangePage {
            page_id: Some("p2".to_string())
        })
    );
    assert_eq!(after, None);
    assert_eq!(state, ConnectionState::Closed);
    assert_eq!(
        drain_events(&mut events).last(),
        Some(&UiEvent::SessionEnded(SessionEnd::Disconnected))
    );
}

/// **VALUE**: Opening a new session on a busy connection ends the old one first.
///
/// **WHY THIS MATTERS**: Exactly one handler may own a transport at a time.
///
/// **BUG THIS CATCHES**: Would catch if the old transport leaks when a probe is reused.
#[tokio::test]
async fn given_finished_session_when_pinged_again_then_single_transport() {
    // GIVEN
    let (connector, mut accepted) = MemoryConnector::new();
    let server = tokio::spawn(async move {
        while let Some(mut peer) = accepted.recv().await {
            tokio::spawn(async move {
                peer.recv().await.expect("No hello");
                peer.send(frames::server_hello("Echo", "motd"));
                if let Some(ping) = peer.recv().await {
                    let echo = frames::ping_echo(&ping).expect("Not a ping");
                    peer.send(frames::pong(echo));
                }
                while peer.recv().await.is_some() {}
            });
        }
    });
    let mut connection = Connection::new(connector.clone(), Arc::new(StaticIdentity::guest()));

    // WHEN
    for _ in 0..3 {
        connection.ping(ADDRESS).await.expect("Ping failed");
    }

    // THEN
    assert_eq!(connector.total_connections(), 3);
    assert_eq!(connector.peak_connections(), 1);
    assert_eq!(connector.open_connections(), 0);
    server.abort();
}

/// Credential whose user id cannot fit a u8-length string field.
fn oversized_credential() -> Credential {
    Credential {
        user_id: "u".repeat(300),
        ..test_credential()
    }
}

/// **VALUE**: A hello that cannot be encoded ends the session instead of idling.
///
/// **WHY THIS MATTERS**: The server waits for the hello before saying anything, so a
/// skipped hello leaves both sides waiting until the timeout.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - An encode error is logged and skipped, leaving the machine in AwaitingHello
/// - The transport stays open after the session failed
#[tokio::test]
async fn given_unencodable_hello_when_pinged_then_fails_and_releases_transport() {
    // GIVEN
    let (connector, mut accepted) = MemoryConnector::new();
    let server = tokio::spawn(async move {
        let mut peer = accepted.recv().await.expect("No connection");
        peer.recv().await
    });
    let identity = StaticIdentity::signed_in(oversized_credential(), true);
    let mut connection = Connection::new(connector.clone(), Arc::new(identity));

    // WHEN
    let result = connection.ping(ADDRESS).await;
    let received = server.await.expect("Server task panicked");

    // THEN
    assert!(matches!(result, Err(ProbeFailure::Malformed { .. })));
    assert_eq!(received, None);
    assert_eq!(connection.state(), ConnectionState::Failed);
    assert!(!connection.is_connected());
    assert_eq!(connector.open_connections(), 0);
}

/// **VALUE**: A full session with an unencodable hello reports a failure to the surface.
///
/// **WHY THIS MATTERS**: The user must see why the session never started.
///
/// **BUG THIS CATCHES**: Would catch if login hangs or ends without a SessionEnded event.
#[tokio::test]
async fn given_unencodable_hello_when_logging_in_then_session_failed() {
    // GIVEN
    let (connector, mut accepted) = MemoryConnector::new();
    let server = tokio::spawn(async move {
        let mut peer = accepted.recv().await.expect("No connection");
        peer.recv().await
    });
    let identity = StaticIdentity::signed_in(oversized_credential(), true);
    let (sink, mut events) = unbounded_channel();
    let mut connection = Connection::new(connector.clone(), Arc::new(identity));

    // WHEN
    let state = connection
        .login(ADDRESS, sink, None)
        .await
        .expect("Login failed to connect");
    let received = server.await.expect("Server task panicked");

    // THEN
    assert_eq!(state, ConnectionState::Failed);
    assert_eq!(received, None);
    assert_eq!(connector.open_connections(), 0);
    match drain_events(&mut events).last() {
        Some(UiEvent::SessionEnded(SessionEnd::Failed { reason })) => {
            assert!(reason.contains("cannot encode"), "unexpected reason: {}", reason);
        }
        other => panic!("Expected a failed session end, got {:?}", other),
    }
}
