use hibiscus_core::config::AppConfig;
use hibiscus_core::error::config::ConfigError;
use hibiscus_core::error::server_list::ServerListError;
use hibiscus_core::server_list::{ServerListStore, ServerRecord};

use tempfile::TempDir;

/// **VALUE**: A fresh install starts from working defaults.
///
/// **WHY THIS MATTERS**: First launch must not fail for lack of a config file.
///
/// **BUG THIS CATCHES**: Would catch if a missing file is reported as a read error.
#[test]
fn given_no_config_file_when_loaded_then_defaults() {
    let dir = TempDir::new().expect("Failed to create temp dir");

    let config = AppConfig::load(dir.path()).expect("Load failed");

    assert_eq!(config.version, 1);
    assert_eq!(config.probe.pool_size, 3);
    assert_eq!(config.probe.timeout_secs, 10);
    assert!(config.validate().is_ok());
}

/// **VALUE**: Saved settings survive a restart and leave no temp file behind.
///
/// **WHY THIS MATTERS**: A stray `.tmp` file means the rename never happened.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Fields are dropped on save
/// - The write is not completed by a rename
#[test]
fn given_saved_config_when_loaded_then_round_trips() {
    // GIVEN
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = AppConfig::default();
    config.server.default_address = Some("wss://play.example.com/websocket".to_string());
    config.probe.pool_size = 5;
    config.client.mobile = true;

    // WHEN
    config.save(dir.path()).expect("Save failed");
    let loaded = AppConfig::load(dir.path()).expect("Load failed");

    // THEN
    assert_eq!(
        loaded.server.default_address.as_deref(),
        Some("wss://play.example.com/websocket")
    );
    assert_eq!(loaded.probe.pool_size, 5);
    assert!(loaded.client.mobile);
    assert!(dir.path().join("config.json").exists());
    assert!(!dir.path().join("config.json.tmp").exists());
}

/// **VALUE**: Partial config files are filled in from defaults.
///
/// **WHY THIS MATTERS**: Users edit the file by hand and omit sections.
///
/// **BUG THIS CATCHES**: Would catch if a missing section fails to parse.
#[test]
fn given_partial_config_when_loaded_then_missing_sections_defaulted() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    std::fs::write(
        dir.path().join("config.json"),
        r#"{ "probe": { "pool_size": 7 } }"#,
    )
    .expect("Failed to write config");

    let config = AppConfig::load(dir.path()).expect("Load failed");

    assert_eq!(config.probe.pool_size, 7);
    assert_eq!(config.probe.timeout_secs, 10);
    assert_eq!(config.version, 1);
}

/// **VALUE**: Corrupt JSON is reported, not replaced by defaults.
///
/// **WHY THIS MATTERS**: Silently overwriting a broken file loses the user's settings.
///
/// **BUG THIS CATCHES**: Would catch if parse failures fall back to defaults.
#[test]
fn given_corrupt_config_when_loaded_then_parse_error() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("config.json"), "{ not json").expect("Failed to write config");

    let result = AppConfig::load(dir.path());

    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

/// **VALUE**: Out-of-range values are rejected by validation.
///
/// **WHY THIS MATTERS**: A zero-size probe pool would never probe anything.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Pool size zero or above the limit passes
/// - A non-websocket server address passes
#[test]
fn given_invalid_values_when_validated_then_validation_error() {
    let mut empty_pool = AppConfig::default();
    empty_pool.probe.pool_size = 0;
    let mut huge_pool = AppConfig::default();
    huge_pool.probe.pool_size = 33;
    let mut http_server = AppConfig::default();
    http_server.server.default_address = Some("http://play.example.com".to_string());
    let mut no_timeout = AppConfig::default();
    no_timeout.probe.timeout_secs = 0;

    for config in [empty_pool, huge_pool, http_server, no_timeout] {
        assert!(
            matches!(config.validate(), Err(ConfigError::ValidationError { .. })),
            "{:?} should not validate",
            config
        );
    }
}

/// **VALUE**: A config written by a newer client is refused with both versions named.
///
/// **WHY THIS MATTERS**: Reading a newer layout as the old one would misread its fields.
///
/// **BUG THIS CATCHES**: Would catch if an unknown version loads as defaults.
#[test]
fn given_newer_config_version_when_loaded_then_unsupported_version() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("config.json"), r#"{ "version": 2 }"#)
        .expect("Failed to write config");

    let result = AppConfig::load(dir.path());

    match result {
        Err(error @ ConfigError::UnsupportedVersion { found: 2, supported: 1, .. }) => {
            assert!(error.to_string().contains("version 2 is not supported"));
        }
        other => panic!("Expected UnsupportedVersion, got {:?}", other),
    }
}

/// **VALUE**: Validation errors name the offending field.
///
/// **WHY THIS MATTERS**: Users fix `config.json` by hand and need to know where to look.
///
/// **BUG THIS CATCHES**: Would catch if the field is missing from the error.
#[test]
fn given_zero_pool_size_when_validated_then_field_named() {
    let mut config = AppConfig::default();
    config.probe.pool_size = 0;

    let error = config.validate().expect_err("Zero pool size validated");

    assert!(matches!(
        error,
        ConfigError::ValidationError { field: "probe.pool_size", .. }
    ));
    assert!(error.to_string().contains("probe.pool_size"));
}

/// **VALUE**: No server list yet means no known servers.
///
/// **WHY THIS MATTERS**: The list is created on the first save.
///
/// **BUG THIS CATCHES**: Would catch if a missing list is an error.
#[test]
fn given_no_server_list_when_loaded_then_empty() {
    let dir = TempDir::new().expect("Failed to create temp dir");

    let servers = ServerListStore::new(dir.path()).load().expect("Load failed");

    assert!(servers.is_empty());
}

/// **VALUE**: Known servers and their last names persist in order.
///
/// **WHY THIS MATTERS**: The list is shown in the order the user added servers.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Order is not preserved
/// - Unnamed servers gain an empty name
/// - The file is not a `[[server]]` table array
#[test]
fn given_saved_server_list_when_loaded_then_round_trips() {
    // GIVEN
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = ServerListStore::new(dir.path());
    let servers = vec![
        ServerRecord::new("wss://one.example.com/websocket").with_name("One"),
        ServerRecord::new("ws://localhost:8080/websocket"),
    ];

    // WHEN
    store.save(&servers).expect("Save failed");
    let loaded = store.load().expect("Load failed");

    // THEN
    assert_eq!(loaded, servers);
    let contents = std::fs::read_to_string(store.path()).expect("Failed to read list");
    assert!(contents.contains("[[server]]"));
    assert!(!dir.path().join("servers.toml.tmp").exists());
}

/// **VALUE**: A corrupt server list is reported with its path.
///
/// **WHY THIS MATTERS**: The user must be able to find and fix the file.
///
/// **BUG THIS CATCHES**: Would catch if parse failures are swallowed.
#[test]
fn given_corrupt_server_list_when_loaded_then_parse_error() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = ServerListStore::new(dir.path());
    std::fs::write(store.path(), "[[server]\naddress = ").expect("Failed to write list");

    match store.load() {
        Err(ServerListError::ParseError { path, .. }) => assert_eq!(path, store.path()),
        other => panic!("Expected parse error, got {:?}", other),
    }
}
