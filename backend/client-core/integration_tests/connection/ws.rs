use crate::frames::{self, PageListFrame};
use crate::helpers::{
    accept_client, bind_server, close_with, drain_events, recv_frame, send_frame,
};

use hibiscus_core::connection::{Connection, ConnectionState, WsConnector, hello_packet};
use hibiscus_core::identity::StaticIdentity;
use hibiscus_core::probe::ProbeFailure;
use hibiscus_core::protocol::{ClientPacket, HelloFlags};
use hibiscus_core::sync::{SessionEnd, UiEvent, catalog};

use std::sync::Arc;

use tokio::sync::mpsc::unbounded_channel;

fn find(events: &[UiEvent], wanted: impl Fn(&UiEvent) -> bool) -> usize {
    events
        .iter()
        .position(wanted)
        .unwrap_or_else(|| panic!("Missing event in {:?}", events))
}

// ============================================================================
// Public API tests for websocket sessions
// These drive a real Connection against a scripted websocket server
// ============================================================================

/// **VALUE**: A guest login runs the whole handshake and mirrors the server's first page.
///
/// **WHY THIS MATTERS**: This is the primary user journey: connect, get the catalog,
/// land on the default page, see its components.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The hello bits or layout are wrong
/// - The default page is not requested after the catalog
/// - Components are not created on the selected page
/// - A remote close is reported as anything but Terminated
#[tokio::test]
async fn given_scripted_server_when_guest_logs_in_then_first_page_rendered() {
    // GIVEN: A server that greets, welcomes, sends a catalog and a page
    let (listener, address) = bind_server().await;
    let server = tokio::spawn(async move {
        let mut ws = accept_client(&listener).await;
        let hello = recv_frame(&mut ws).await.expect("No client hello");
        send_frame(&mut ws, frames::server_hello("MyServer", "Hi")).await;
        send_frame(&mut ws, frames::welcome("guest-1", "Guest")).await;
        send_frame(
            &mut ws,
            PageListFrame {
                groups_added: vec![("g1", "Main")],
                pages_added: vec![
                    ("p1", Some("g1"), "Home", "home"),
                    ("p2", Some("g1"), "Other", "star"),
                ],
                ..PageListFrame::default()
            }
            .build(),
        )
        .await;
        let change = recv_frame(&mut ws).await.expect("No page request");
        send_frame(&mut ws, frames::change_page("p1")).await;
        send_frame(
            &mut ws,
            frames::update_page(
                &[frames::added_component(
                    1,
                    catalog::BUTTON,
                    &frames::button_properties("Go", 0),
                )],
                &[],
                &[],
            ),
        )
        .await;
        close_with(&mut ws, 1000).await;
        (hello, change)
    });

    // WHEN: A guest logs in
    let (sink, mut events) = unbounded_channel();
    let mut connection = Connection::new(WsConnector, Arc::new(StaticIdentity::guest()));
    let state = connection
        .login(&address, sink, None)
        .await
        .expect("Login failed to connect");
    let (hello, change) = server.await.expect("Server task panicked");

    // THEN: Guest hello, default page request, rendered page, terminated session
    let expected_hello = hello_packet(true, HelloFlags::WEB, None)
        .compress()
        .expect("Failed to encode hello");
    assert_eq!(hello, expected_hello);
    assert_eq!(hello[1], (HelloFlags::LOGIN | HelloFlags::WEB | HelloFlags::GUEST).bits());
    assert_eq!(
        change,
        ClientPacket::ChangePage { page_id: None }
            .compress()
            .expect("Failed to encode change page")
    );
    assert_eq!(state, ConnectionState::Closed);
    assert!(!connection.is_connected());

    let events = drain_events(&mut events);
    let info = find(&events, |event| matches!(event, UiEvent::ServerInfo { .. }));
    let welcome = find(&events, |event| matches!(event, UiEvent::Welcome { .. }));
    let page_added = find(&events, |event| {
        matches!(event, UiEvent::PageAdded { page_id, group_id: Some(group), .. }
            if page_id == "p1" && group == "g1")
    });
    let selected = find(&events, |event| {
        matches!(event, UiEvent::PageSelected { page_id, .. } if page_id == "p1")
    });
    let component = find(&events, |event| {
        matches!(event, UiEvent::ComponentAdded { component_id: 1, component_type }
            if *component_type == catalog::BUTTON)
    });
    assert!(info < welcome && welcome < page_added);
    assert!(page_added < selected && selected < component);
    assert_eq!(
        events.last(),
        Some(&UiEvent::SessionEnded(SessionEnd::Terminated {
            code: Some(1000)
        }))
    );
}

/// **VALUE**: Ping measures a server and closes, and the connection can be reused.
///
/// **WHY THIS MATTERS**: Probe pool connections ping many servers in turn.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The pong echo is not matched against the ping
/// - The connection stays open after the report
/// - A second session on the same connection sees state from the first
#[tokio::test]
async fn given_pinging_server_when_pinged_twice_then_two_reports_and_closed() {
    // GIVEN: A server answering two pings
    let (listener, address) = bind_server().await;
    let server = tokio::spawn(async move {
        for round in 0..2 {
            let mut ws = accept_client(&listener).await;
            recv_frame(&mut ws).await.expect("No client hello");
            send_frame(
                &mut ws,
                frames::server_hello(&format!("PingServer {}", round), "motd"),
            )
            .await;
            let ping = recv_frame(&mut ws).await.expect("No ping");
            let echo = frames::ping_echo(&ping).expect("Not a ping frame");
            send_frame(&mut ws, frames::pong(echo)).await;
            assert!(recv_frame(&mut ws).await.is_none());
        }
    });

    // WHEN: Pinging twice on one connection
    let mut connection = Connection::new(WsConnector, Arc::new(StaticIdentity::guest()));
    let first = connection.ping(&address).await.expect("First ping failed");
    let second = connection.ping(&address).await.expect("Second ping failed");
    server.await.expect("Server task panicked");

    // THEN
    assert_eq!(first.server_name.as_deref(), Some("PingServer 0"));
    assert_eq!(second.server_name.as_deref(), Some("PingServer 1"));
    assert_eq!(second.motd.as_deref(), Some("motd"));
    assert!(!connection.is_connected());
    assert_eq!(connection.state(), ConnectionState::Closed);
}

/// **VALUE**: Pinging a port with no listener fails at the transport level.
///
/// **WHY THIS MATTERS**: Offline servers must show as unreachable, not hang.
///
/// **BUG THIS CATCHES**: Would catch if a connect error leaves the result channel pending.
#[tokio::test]
async fn given_closed_port_when_pinged_then_failed() {
    // GIVEN: An address nothing listens on
    let (listener, address) = bind_server().await;
    drop(listener);

    // WHEN
    let mut connection = Connection::new(WsConnector, Arc::new(StaticIdentity::guest()));
    let result = connection.ping(&address).await;

    // THEN
    assert!(matches!(result, Err(ProbeFailure::Failed { .. })));
    assert_eq!(connection.state(), ConnectionState::Failed);
}

/// **VALUE**: Non-websocket addresses are rejected before connecting.
///
/// **WHY THIS MATTERS**: Typos in the server list must give a clear error.
///
/// **BUG THIS CATCHES**: Would catch if http:// addresses reach the websocket handshake.
#[tokio::test]
async fn given_http_address_when_pinged_then_failed_without_connecting() {
    // GIVEN
    let mut connection = Connection::new(WsConnector, Arc::new(StaticIdentity::guest()));

    // WHEN
    let result = connection.ping("http://127.0.0.1:1/").await;

    // THEN
    match result {
        Err(ProbeFailure::Failed { reason }) => assert!(reason.contains("scheme")),
        other => panic!("Expected a transport failure, got {:?}", other),
    }
}

/// **VALUE**: A malformed frame from the server fails the probe as malformed.
///
/// **WHY THIS MATTERS**: Incompatible servers must be told apart from offline ones.
///
/// **BUG THIS CATCHES**: Would catch if decode errors are reported as remote closes.
#[tokio::test]
async fn given_server_sending_garbage_when_pinged_then_malformed() {
    // GIVEN
    let (listener, address) = bind_server().await;
    let server = tokio::spawn(async move {
        let mut ws = accept_client(&listener).await;
        recv_frame(&mut ws).await.expect("No client hello");
        send_frame(&mut ws, vec![250, 1, 2]).await;
        while recv_frame(&mut ws).await.is_some() {}
    });

    // WHEN
    let mut connection = Connection::new(WsConnector, Arc::new(StaticIdentity::guest()));
    let result = connection.ping(&address).await;
    server.await.expect("Server task panicked");

    // THEN
    assert!(matches!(result, Err(ProbeFailure::Malformed { .. })));
}
