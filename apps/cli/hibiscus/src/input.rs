//! Lines typed on stdin during a session.

use crate::error::HibiscusError;

use hibiscus_core::connection::LocalCommand;
use hibiscus_core::protocol::ActionValue;

const CLICK_ACTION: &str = "on_click";
const INPUT_CHANGE_ACTION: &str = "on_input_change";

/// Parse one line. Blank lines yield `None`.
///
/// ```text
/// page [<id>]                 request a page, or the default page
/// click <component>           button on_click
/// input <component> <text>    text_input on_input_change
/// quit                        disconnect
/// ```
pub fn parse_line(line: &str) -> Result<Option<LocalCommand>, HibiscusError> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim_start()),
        None => (line, ""),
    };

    let command = match verb {
        "" => return Ok(None),
        "quit" | "exit" => LocalCommand::Disconnect,
        "page" if rest.is_empty() => LocalCommand::RequestDefaultPage,
        "page" => LocalCommand::RequestPage(rest.to_string()),
        "click" => LocalCommand::Action {
            component_id: component_id(rest)?,
            action: CLICK_ACTION.to_string(),
            value: ActionValue::Void,
        },
        "input" => {
            let (id, text) = rest.split_once(' ').unwrap_or((rest, ""));
            LocalCommand::Action {
                component_id: component_id(id)?,
                action: INPUT_CHANGE_ACTION.to_string(),
                value: ActionValue::Text(Some(text.to_string())),
            }
        }
        other => return Err(HibiscusError::input(format!("unknown command '{other}'"))),
    };
    Ok(Some(command))
}

fn component_id(text: &str) -> Result<u32, HibiscusError> {
    text.trim()
        .parse()
        .map_err(|_| HibiscusError::input(format!("expected a component id, got '{text}'")))
}
