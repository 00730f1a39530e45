// Unit tests for stdin command parsing

use crate::error::HibiscusError;
use crate::input::parse_line;

use hibiscus_core::connection::LocalCommand;
use hibiscus_core::protocol::ActionValue;

/// **VALUE**: Navigation lines map to page requests.
///
/// **WHY THIS MATTERS**: `page` with no id is how a user returns to the default page.
///
/// **BUG THIS CATCHES**: Would catch if a bare `page` requests a page named "".
#[test]
fn given_page_lines_when_parsed_then_page_requests() {
    assert_eq!(
        parse_line("page settings/audio").unwrap(),
        Some(LocalCommand::RequestPage("settings/audio".to_string()))
    );
    assert_eq!(
        parse_line("  page  ").unwrap(),
        Some(LocalCommand::RequestDefaultPage)
    );
}

/// **VALUE**: Component lines map to the actions the component declares.
///
/// **WHY THIS MATTERS**: The action name selects the action id on the wire.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - Input text is split on its own spaces
/// - `click` sends a text payload
#[test]
fn given_component_lines_when_parsed_then_actions() {
    assert_eq!(
        parse_line("click 7").unwrap(),
        Some(LocalCommand::Action {
            component_id: 7,
            action: "on_click".to_string(),
            value: ActionValue::Void,
        })
    );
    assert_eq!(
        parse_line("input 3 hello there").unwrap(),
        Some(LocalCommand::Action {
            component_id: 3,
            action: "on_input_change".to_string(),
            value: ActionValue::Text(Some("hello there".to_string())),
        })
    );
}

/// **VALUE**: Blank lines are ignored and `quit` disconnects.
///
/// **WHY THIS MATTERS**: Pressing enter must not end or break the session.
///
/// **BUG THIS CATCHES**: Would catch if blank lines are reported as errors.
#[test]
fn given_blank_and_quit_lines_when_parsed_then_ignored_and_disconnect() {
    assert_eq!(parse_line("").unwrap(), None);
    assert_eq!(parse_line("quit").unwrap(), Some(LocalCommand::Disconnect));
}

/// **VALUE**: Typos are reported instead of sent.
///
/// **WHY THIS MATTERS**: A garbled component id must never reach the server.
///
/// **BUG THIS CATCHES**: Would catch if unknown verbs or ids parse to a command.
#[test]
fn given_bad_lines_when_parsed_then_input_error() {
    for line in ["jump 3", "click", "click seven", "input -1 text"] {
        assert!(
            matches!(parse_line(line), Err(HibiscusError::Input { .. })),
            "{line} should not parse"
        );
    }
}
