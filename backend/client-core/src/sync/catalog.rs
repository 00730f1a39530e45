//! Built-in component types.

use crate::sync::component::{Component, ComponentConstructor};
use crate::sync::property::ThemeColor;

pub const TITLE_BOX: &str = "title_box";
pub const TEXT_BOX: &str = "text_box";
pub const BUTTON: &str = "button";
pub const TEXT_INPUT: &str = "text_input";

pub const TEXT_ALIGNMENTS: &[&str] = &["left", "center", "right"];
pub const UPDATE_EVENTS: &[&str] = &["every_key", "after_change", "after_change_timeout"];

pub(crate) const BUILTIN_COMPONENTS: &[(&str, ComponentConstructor)] = &[
    (TITLE_BOX, title_box),
    (TEXT_BOX, text_box),
    (BUTTON, button),
    (TEXT_INPUT, text_input),
];

pub fn title_box(id: u32) -> Component {
    Component::builder(id, TITLE_BOX)
        .string("title", Some(None))
        .string("subtitle", Some(None))
        .theme_color("color", Some(ThemeColor::Background))
        .enumeration("text_alignment", TEXT_ALIGNMENTS, None)
        .build()
}

/// `text` carries lightweight markup for the rendering surface.
pub fn text_box(id: u32) -> Component {
    Component::builder(id, TEXT_BOX)
        .string("text", Some(None))
        .theme_color("color", Some(ThemeColor::Background))
        .build()
}

pub fn button(id: u32) -> Component {
    Component::builder(id, BUTTON)
        .string("text", Some(Some("Button")))
        .theme_color("color", Some(ThemeColor::Primary))
        .void_client_action("on_click")
        .build()
}

pub fn text_input(id: u32) -> Component {
    Component::builder(id, TEXT_INPUT)
        .string("default_value", Some(Some("")))
        .enumeration("update_events", UPDATE_EVENTS, Some(1))
        .string_client_action("on_input_change")
        .build()
}
