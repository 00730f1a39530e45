//! Test helpers for integration tests.
//!
//! This module provides:
//! - A websocket server speaking raw frames
//! - Event collection from a session's render channel
//! - A signed-in test credential
#![allow(dead_code)]

use hibiscus_core::identity::Credential;
use hibiscus_core::sync::UiEvent;

use common::RedactedToken;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{WebSocketStream, accept_async};

pub type ServerSocket = WebSocketStream<TcpStream>;

pub const TEST_USER_ID: &str = "user-1";
pub const TEST_ACCESS_TOKEN: &str = "test-token-12345";

/// Test helper: Bind a websocket listener on an ephemeral port.
///
/// Returns the listener and the `ws://` address clients should use.
pub async fn bind_server() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let port = listener
        .local_addr()
        .expect("Listener has no local address")
        .port();
    (listener, format!("ws://127.0.0.1:{}/websocket", port))
}

/// Test helper: Accept one client and complete the websocket upgrade.
pub async fn accept_client(listener: &TcpListener) -> ServerSocket {
    let (stream, _) = listener
        .accept()
        .await
        .expect("Failed to accept connection");
    accept_async(stream)
        .await
        .expect("Failed websocket upgrade")
}

/// Test helper: Send one packet frame as a binary message.
pub async fn send_frame(ws: &mut ServerSocket, frame: Vec<u8>) {
    ws.send(Message::Binary(frame.into()))
        .await
        .expect("Failed to send frame");
}

/// Test helper: Next binary frame from the client, `None` once it closed.
pub async fn recv_frame(ws: &mut ServerSocket) -> Option<Vec<u8>> {
    loop {
        match ws.next().await {
            Some(Ok(Message::Binary(data))) => return Some(data.to_vec()),
            Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return None,
            Some(Ok(_)) => {}
        }
    }
}

/// Test helper: Close with `code` and wait for the client to go away.
pub async fn close_with(ws: &mut ServerSocket, code: u16) {
    let frame = CloseFrame {
        code: CloseCode::from(code),
        reason: "".into(),
    };
    let _ = ws.close(Some(frame)).await;
    while let Some(Ok(_)) = ws.next().await {}
}

/// Test helper: Everything emitted so far.
pub fn drain_events(events: &mut UnboundedReceiver<UiEvent>) -> Vec<UiEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

pub fn test_credential() -> Credential {
    Credential {
        user_id: TEST_USER_ID.to_string(),
        display_name: "Test User".to_string(),
        photo_url: None,
        access_token: RedactedToken::new(TEST_ACCESS_TOKEN),
    }
}
