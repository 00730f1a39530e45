use crate::protocol::ActionValue;
use crate::sync::property::PropertyChange;

use tokio::sync::mpsc::UnboundedSender;

/// Why a session's connection ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    /// Closed locally.
    Disconnected,
    /// Remote side closed the transport.
    Terminated { code: Option<u16> },
    /// Transport or protocol failure.
    Failed { reason: String },
    /// Identity verification failed.
    IdentityRejected { reason: String },
}

/// Everything the rendering surface needs to mirror the server's UI.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    ServerInfo {
        name: Option<String>,
        motd: Option<String>,
    },
    Welcome {
        user_id: Option<String>,
        nickname: Option<String>,
    },
    Cleared,
    GroupAdded {
        group_id: String,
        name: String,
    },
    GroupRemoved {
        group_id: String,
    },
    GroupUpdated {
        group_id: String,
        name: String,
    },
    PageAdded {
        page_id: String,
        name: String,
        icon: String,
        group_id: Option<String>,
    },
    PageRemoved {
        page_id: String,
    },
    PageUpdated {
        page_id: String,
        name: String,
        icon: String,
        group_id: Option<String>,
    },
    PageSelected {
        page_id: String,
        requested_page_id: String,
        forced: bool,
    },
    PageDeselected {
        page_id: String,
    },
    ComponentAdded {
        component_id: u32,
        component_type: &'static str,
    },
    ComponentRemoved {
        component_id: u32,
    },
    PropertyChanged {
        component_id: u32,
        change: PropertyChange,
    },
    ServerAction {
        component_id: u32,
        action: &'static str,
        value: ActionValue,
    },
    UnknownPage {
        page_id: Option<String>,
    },
    UiLoaderHidden,
    PageLoaderShown,
    PageLoaderHidden,
    Kicked {
        reason: Option<String>,
    },
    SessionEnded(SessionEnd),
}

/// Consumer of [`UiEvent`]s.
pub trait RenderSink: Send {
    fn emit(&mut self, event: UiEvent);
}

impl RenderSink for Vec<UiEvent> {
    fn emit(&mut self, event: UiEvent) {
        self.push(event);
    }
}

/// Forwards to a channel; events are dropped once the receiver is gone.
impl RenderSink for UnboundedSender<UiEvent> {
    fn emit(&mut self, event: UiEvent) {
        let _ = self.send(event);
    }
}
