use crate::connection::transport::{Connector, Transport, TransportEvent};
use crate::error::connection::ConnectionError;

use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// Websocket transport carrying one packet per binary message.
pub struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl Transport for WsTransport {
    async fn send(&mut self, frame: Vec<u8>) -> Result<(), ConnectionError> {
        self.stream
            .send(Message::Binary(frame.into()))
            .await
            .map_err(|e| ConnectionError::send(e.to_string()))
    }

    async fn recv(&mut self) -> TransportEvent {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Binary(data))) => return TransportEvent::Message(data.to_vec()),
                Some(Ok(Message::Text(text))) => {
                    warn!("Ignoring text message of {} bytes", text.len());
                }
                Some(Ok(Message::Close(frame))) => {
                    let code = frame.map(|frame| u16::from(frame.code));
                    debug!("Websocket closed by peer with code {:?}", code);
                    return TransportEvent::Closed { code };
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return TransportEvent::Failed(e.to_string()),
                None => return TransportEvent::Closed { code: None },
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            debug!("Websocket close handshake failed: {}", e);
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

impl Connector for WsConnector {
    type Transport = WsTransport;

    async fn connect(&self, address: &str) -> Result<WsTransport, ConnectionError> {
        let url = url::Url::parse(address)
            .map_err(|e| ConnectionError::invalid_address(address, e.to_string()))?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(ConnectionError::invalid_address(
                address,
                format!("unsupported scheme {}", url.scheme()),
            ));
        }
        let (stream, _response) = connect_async(address)
            .await
            .map_err(|e| ConnectionError::connect(address, e.to_string()))?;
        info!("Connected to {}", address);
        Ok(WsTransport { stream })
    }
}
