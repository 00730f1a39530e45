// Unit tests for logger initialization
// Tests focus on idempotency and error handling

use crate::error::HibiscusError;
use crate::logger::{initialize, initialize_internal};

use std::path::PathBuf;

use tempfile::TempDir;

/// **VALUE**: Verifies that calling initialize() multiple times doesn't panic or fail.
///
/// **WHY THIS MATTERS**: Both subcommands and the tests may reach initialization;
/// fern panics if a second global logger is installed.
///
/// **BUG THIS CATCHES**: Would catch if the Once or AtomicBool guards are removed.
#[test]
fn given_logger_initialized_when_called_again_then_returns_ok() {
    // GIVEN: A valid temporary directory
    let temp_dir = TempDir::new().unwrap();

    // WHEN: Calling initialize twice
    let first = initialize(temp_dir.path());
    let second = initialize(temp_dir.path());

    // THEN: The second call is a no-op
    assert!(first.is_ok(), "First initialization should succeed");
    assert!(second.is_ok(), "Second initialization should succeed (idempotent)");
}

/// **VALUE**: An unusable log directory is an error, not a panic.
///
/// **WHY THIS MATTERS**: A read-only home directory must not crash startup.
///
/// **BUG THIS CATCHES**: Would catch if directory or file creation unwraps.
#[test]
fn given_invalid_log_dir_when_initialized_then_returns_error() {
    // GIVEN: A path under a device file, which cannot be a directory
    let invalid_dir = PathBuf::from("/dev/null/invalid-path");

    // WHEN
    let result = initialize_internal(&invalid_dir);

    // THEN
    assert!(matches!(result, Err(HibiscusError::Hibiscus { .. })));
}
