// Unit tests for the probe and connect subcommands

use crate::commands::{ServerListRecorder, connect, format_entry, probe};
use crate::error::HibiscusError;

use hibiscus_core::config::AppConfig;
use hibiscus_core::probe::{ProbeFailure, ProbeState, ServerEntry};
use hibiscus_core::server_list::{ServerListStore, ServerRecord};

use tempfile::TempDir;

/// **VALUE**: Probe lines show state, ping, address and name or failure.
///
/// **WHY THIS MATTERS**: This line is the whole output of `hibiscus probe`.
///
/// **BUG THIS CATCHES**: Would catch if a failed server prints a stale ping.
#[test]
fn given_entries_when_formatted_then_one_line_each() {
    // GIVEN
    let mut ok = ServerEntry::new("wss://one.example.com/websocket");
    ok.state = ProbeState::Connectable;
    ok.last_known_name = Some("One".to_string());
    ok.last_measured_ping = Some(42);
    let mut failed = ServerEntry::new("ws://down.example.com/websocket");
    failed.state = ProbeState::PingFail;
    failed.last_failure = Some(ProbeFailure::TimedOut);

    // WHEN
    let ok_line = format_entry(&ok);
    let failed_line = format_entry(&failed);

    // THEN
    assert!(ok_line.starts_with("CONNECTABLE"), "{}", ok_line);
    assert!(ok_line.contains("42ms"));
    assert!(ok_line.ends_with("wss://one.example.com/websocket  One"));
    assert!(failed_line.starts_with("PING_FAIL"), "{}", failed_line);
    assert!(failed_line.contains(" - "));
    assert!(failed_line.ends_with("timed out"));
}

/// **VALUE**: Connecting with nothing to connect to fails before opening a socket.
///
/// **WHY THIS MATTERS**: A cleared default address must produce a clear error.
///
/// **BUG THIS CATCHES**: Would catch if an empty address is passed to the connector.
#[tokio::test]
async fn given_no_address_when_connecting_then_no_server_error() {
    let mut config = AppConfig::default();
    config.server.default_address = None;

    let result = connect(&config, None).await;

    assert!(matches!(result, Err(HibiscusError::NoServer { .. })));
}

/// **VALUE**: Probing an empty list does nothing and writes nothing.
///
/// **WHY THIS MATTERS**: First runs must not create an empty `servers.toml`.
///
/// **BUG THIS CATCHES**: Would catch if an empty probe run saves the list.
#[tokio::test]
async fn given_empty_list_when_probing_then_nothing_saved() {
    let dir = TempDir::new().unwrap();

    probe(&AppConfig::default(), dir.path(), Vec::new())
        .await
        .expect("Probe failed");

    assert!(!ServerListStore::new(dir.path()).path().exists());
}

/// **VALUE**: Addresses given to `probe` are probed and remembered even when down.
///
/// **WHY THIS MATTERS**: A server that is briefly offline should stay in the list.
///
/// **BUG THIS CATCHES**: Would catch if only connectable servers are saved.
#[tokio::test]
async fn given_unreachable_address_when_probing_then_saved_to_list() {
    // GIVEN: A port nothing listens on
    let dir = TempDir::new().unwrap();
    let address = "ws://127.0.0.1:1/websocket".to_string();

    // WHEN
    probe(&AppConfig::default(), dir.path(), vec![address.clone()])
        .await
        .expect("Probe failed");

    // THEN
    let saved = ServerListStore::new(dir.path()).load().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].address, address);
    assert_eq!(saved[0].last_known_name, None);
}

/// **VALUE**: A server's name reaches disk as soon as its own result arrives.
///
/// **WHY THIS MATTERS**: An interrupted run must not lose names already learned.
///
/// **BUG THIS CATCHES**: Would catch if the list is only written after the whole run.
#[test]
fn given_connectable_result_when_recorded_then_saved_before_run_ends() {
    // GIVEN
    let dir = TempDir::new().unwrap();
    let store = ServerListStore::new(dir.path());
    let records = vec![
        ServerRecord::new("ws://one/websocket"),
        ServerRecord::new("ws://two/websocket").with_name("Two"),
    ];
    let mut recorder = ServerListRecorder::new(store.clone(), records);
    let mut one = ServerEntry::new("ws://one/websocket");
    one.state = ProbeState::Connectable;
    one.last_known_name = Some("One".to_string());
    one.last_measured_ping = Some(10);

    // WHEN
    let saved = recorder.record(&one).expect("Record failed");

    // THEN
    assert!(saved);
    assert_eq!(
        store.load().unwrap(),
        vec![
            ServerRecord::new("ws://one/websocket").with_name("One"),
            ServerRecord::new("ws://two/websocket").with_name("Two"),
        ]
    );
}

/// **VALUE**: Failed results leave the file alone.
///
/// **WHY THIS MATTERS**: Only a successful hello teaches anything worth saving.
///
/// **BUG THIS CATCHES**: Would catch if every result rewrites `servers.toml`.
#[test]
fn given_failed_result_when_recorded_then_nothing_written() {
    // GIVEN
    let dir = TempDir::new().unwrap();
    let store = ServerListStore::new(dir.path());
    let mut recorder = ServerListRecorder::new(store.clone(), vec![ServerRecord::new("ws://down")]);
    let mut down = ServerEntry::new("ws://down");
    down.state = ProbeState::PingFail;
    down.last_failure = Some(ProbeFailure::TimedOut);

    // WHEN
    let saved = recorder.record(&down).expect("Record failed");

    // THEN
    assert!(!saved);
    assert!(!store.path().exists());
}
