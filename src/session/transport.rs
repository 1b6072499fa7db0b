//! WebSocket transport to the live model
//!
//! Thin wrapper over `tokio-tungstenite` that owns the socket, performs
//! the setup handshake on connect, and surfaces inbound frames as parsed
//! [`ServerMessage`]s.

use crate::config::VoiceConfig;
use crate::session::wire::{self, ServerMessage};
use crate::{Result, VoiceError};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

pub struct Transport {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl Transport {
    /// Open the socket and send the session setup message.
    ///
    /// The caller still has to wait for the remote `setupComplete`
    /// acknowledgement before streaming audio.
    pub async fn connect(config: &VoiceConfig) -> Result<Self> {
        let url = config.session_url();
        debug!("Connecting voice transport to {}", config.endpoint);

        let (ws, _response) = connect_async(url)
            .await
            .map_err(|e| VoiceError::TransportError(format!("WebSocket connect failed: {e}")))?;

        let mut transport = Self { ws };
        transport.send(wire::setup_message(config)).await?;
        Ok(transport)
    }

    pub async fn send(&mut self, payload: String) -> Result<()> {
        self.ws
            .send(Message::Text(payload))
            .await
            .map_err(|e| VoiceError::TransportError(format!("WebSocket send failed: {e}")))
    }

    /// Next parsed envelope. `None` means the remote closed the socket.
    pub async fn next_message(&mut self) -> Option<Result<ServerMessage>> {
        loop {
            let frame = match self.ws.next().await? {
                Ok(frame) => frame,
                Err(e) => {
                    return Some(Err(VoiceError::TransportError(format!(
                        "WebSocket receive failed: {e}"
                    ))))
                }
            };

            let payload = match frame {
                Message::Text(text) => text,
                Message::Binary(bytes) => match String::from_utf8(bytes) {
                    Ok(text) => text,
                    Err(_) => {
                        warn!("Dropping non-UTF-8 binary frame");
                        continue;
                    }
                },
                Message::Ping(_) | Message::Pong(_) => continue,
                Message::Close(_) => return None,
                Message::Frame(_) => continue,
            };

            match ServerMessage::parse(&payload) {
                Ok(message) => return Some(Ok(message)),
                Err(e) => {
                    return Some(Err(VoiceError::TransportError(format!(
                        "Malformed server message: {e}"
                    ))))
                }
            }
        }
    }

    pub async fn close(&mut self) {
        if let Err(e) = self.ws.close(None).await {
            debug!("WebSocket close: {e}");
        }
    }
}
