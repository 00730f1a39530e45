use crate::frames;

use hibiscus_core::connection::{MemoryConnector, MemoryPeer};
use hibiscus_core::identity::StaticIdentity;
use hibiscus_core::probe::{ProbeFailure, ProbePool, ProbeState};

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const OK_SERVERS: [&str; 3] = ["mem://ok-1", "mem://ok-2", "mem://ok-3"];
const KICKING: &str = "mem://kick";
const REFUSED: &str = "mem://refused";
const SILENT: &str = "mem://silent";

/// Test helper: Serve one probe the way the server at `peer.address()` behaves.
async fn serve(mut peer: MemoryPeer) {
    if peer.recv().await.is_none() {
        return;
    }
    match peer.address() {
        KICKING => {
            peer.send(frames::kick("server full"));
        }
        SILENT => {}
        _ => {
            peer.send(frames::server_hello("Ok", "welcome"));
            if let Some(ping) = peer.recv().await {
                tokio::time::sleep(Duration::from_millis(20)).await;
                let echo = frames::ping_echo(&ping).expect("Not a ping");
                peer.send(frames::pong(echo));
            }
        }
    }
    while peer.recv().await.is_some() {}
}

/// **VALUE**: The pool probes a mixed server list without exceeding its capacity.
///
/// **WHY THIS MATTERS**: Probing every known server at once would open an
/// unbounded number of sockets on large lists.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - More than `capacity` connections are ever open at once
/// - Connections leak after a timeout, kick or refusal
/// - Queue order is not FIFO
/// - Failures map to the wrong probe state
#[tokio::test]
async fn given_mixed_servers_when_pool_runs_then_bounded_and_all_settled() {
    // GIVEN: Three healthy servers, one that kicks, one refused, one silent
    let (connector, mut accepted) = MemoryConnector::new();
    connector.refuse(REFUSED);
    let accept_order = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&accept_order);
    let server = tokio::spawn(async move {
        while let Some(peer) = accepted.recv().await {
            recorded.lock().unwrap().push(peer.address().to_string());
            tokio::spawn(serve(peer));
        }
    });
    let mut pool = ProbePool::new(connector.clone(), Arc::new(StaticIdentity::guest()), 2)
        .with_timeout(Duration::from_millis(300));
    for address in OK_SERVERS.iter().chain([&KICKING, &REFUSED, &SILENT]) {
        assert!(pool.enqueue(address));
    }

    // WHEN
    let mut settled = Vec::new();
    pool.run(|entry| settled.push(entry.clone())).await;

    // THEN: Never more than two open, nothing left open
    assert_eq!(connector.peak_connections(), 2);
    assert_eq!(connector.open_connections(), 0);
    assert_eq!(pool.queued(), 0);
    assert_eq!(pool.idle_connections(), 2);
    assert_eq!(settled.len(), 6);

    // THEN: Every server settled to the expected state
    for address in OK_SERVERS {
        let entry = pool.entry(address).expect("Entry missing");
        assert_eq!(entry.state, ProbeState::Connectable, "{}", address);
        assert_eq!(entry.last_known_name.as_deref(), Some("Ok"));
        assert!(entry.last_measured_ping.is_some());
    }
    let kicked = pool.entry(KICKING).expect("Entry missing");
    assert_eq!(kicked.state, ProbeState::PingError);
    assert!(matches!(
        kicked.last_failure,
        Some(ProbeFailure::Kicked { .. })
    ));
    assert_eq!(
        pool.entry(REFUSED).expect("Entry missing").state,
        ProbeState::PingFail
    );
    let silent = pool.entry(SILENT).expect("Entry missing");
    assert_eq!(silent.state, ProbeState::PingFail);
    assert_eq!(silent.last_failure, Some(ProbeFailure::TimedOut));

    // THEN: The first two queued addresses were probed first
    let order = accept_order.lock().unwrap().clone();
    let first_two: HashSet<&str> = order.iter().take(2).map(String::as_str).collect();
    assert_eq!(first_two, HashSet::from(["mem://ok-1", "mem://ok-2"]));
    assert!(!order.iter().any(|address| address == REFUSED));
    server.abort();
}

/// **VALUE**: A refreshed pool reuses its connections for a second round.
///
/// **WHY THIS MATTERS**: The server list is refreshed on demand; each round
/// must not grow the pool.
///
/// **BUG THIS CATCHES**: Would catch if finished connections are not returned to the idle queue.
#[tokio::test]
async fn given_settled_pool_when_refreshed_then_same_connections_reused() {
    // GIVEN
    let (connector, mut accepted) = MemoryConnector::new();
    let server = tokio::spawn(async move {
        while let Some(peer) = accepted.recv().await {
            tokio::spawn(serve(peer));
        }
    });
    let mut pool = ProbePool::new(connector.clone(), Arc::new(StaticIdentity::guest()), 2);
    for address in OK_SERVERS {
        pool.add_server(address);
    }

    // WHEN: Two full rounds
    assert_eq!(pool.refresh_all(), 3);
    pool.run(|_| {}).await;
    assert_eq!(pool.refresh_all(), 3);
    pool.run(|_| {}).await;

    // THEN
    assert_eq!(connector.total_connections(), 6);
    assert_eq!(connector.peak_connections(), 2);
    assert_eq!(pool.idle_connections(), 2);
    assert!(
        pool.entries()
            .iter()
            .all(|entry| entry.state == ProbeState::Connectable)
    );
    server.abort();
}
