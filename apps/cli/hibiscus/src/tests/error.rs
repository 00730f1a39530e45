// Unit tests for error conversion from hibiscus-core

use crate::error::HibiscusError;

use hibiscus_core::config::AppConfig;

/// **VALUE**: Core errors keep their message when surfaced by the CLI.
///
/// **WHY THIS MATTERS**: The CLI logs only the top-level error; a lost message
/// leaves the user guessing which setting is wrong.
///
/// **BUG THIS CATCHES**: Would catch if the conversion drops the core error text.
#[test]
fn given_core_error_when_converted_then_message_kept() {
    // GIVEN: An invalid config
    let mut config = AppConfig::default();
    config.probe.pool_size = 0;
    let core_error = config.validate().unwrap_err();

    // WHEN
    let error = HibiscusError::from(core_error);

    // THEN
    let text = error.to_string();
    assert!(text.starts_with("Core Error: "), "{}", text);
    assert!(text.contains("pool size"), "{}", text);
}

/// **VALUE**: Input errors name what was wrong with the line.
///
/// **WHY THIS MATTERS**: They are the only feedback for a typo on stdin.
///
/// **BUG THIS CATCHES**: Would catch if the Display format loses the message.
#[test]
fn given_input_error_when_displayed_then_message_shown() {
    let error = HibiscusError::input("unknown command 'jump'");

    assert!(error.to_string().contains("Input Error: unknown command 'jump'"));
}
