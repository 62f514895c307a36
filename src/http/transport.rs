use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::SinkExt;
use tracing::debug;

use crate::error::SessionError;
use crate::session::{Frame, ResultMessage, SessionTransport};

/// `SessionTransport` over an upgraded axum WebSocket.
pub struct WsTransport {
    socket: WebSocket,
    closed: bool,
}

impl WsTransport {
    pub fn new(socket: WebSocket) -> Self {
        Self {
            socket,
            closed: false,
        }
    }
}

#[async_trait]
impl SessionTransport for WsTransport {
    async fn recv(&mut self) -> Result<Option<Vec<u8>>, SessionError> {
        loop {
            let frame = match self.socket.recv().await {
                Some(Ok(Message::Binary(bytes))) => Frame::Binary(bytes),
                Some(Ok(Message::Text(text))) => Frame::Text(text),
                Some(Ok(Message::Close(_))) | None => Frame::Close,
                // Answered by axum
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                Some(Err(e)) => return Err(SessionError::transport(e.to_string())),
            };
            return frame.into_chunk();
        }
    }

    async fn send(&mut self, message: &ResultMessage) -> Result<(), SessionError> {
        let json = message
            .to_json()
            .map_err(|e| SessionError::transport(format!("failed to encode result: {}", e)))?;

        self.socket
            .send(Message::Text(json))
            .await
            .map_err(|e| SessionError::transport(e.to_string()))
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        // Sends our Close (or the reply to the peer's) and flushes it
        if let Err(e) = SinkExt::close(&mut self.socket).await {
            debug!("WebSocket close not completed: {}", e);
        }
    }
}
