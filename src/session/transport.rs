use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use super::message::ResultMessage;
use crate::error::SessionError;

/// Inbound frame as seen by a session, independent of the wire library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Binary(Vec<u8>),
    Text(String),
    Close,
}

impl Frame {
    /// Map a frame to the next audio chunk: `None` means the peer closed.
    /// Text where audio is expected is a malformed frame.
    pub fn into_chunk(self) -> Result<Option<Vec<u8>>, SessionError> {
        match self {
            Frame::Binary(bytes) => Ok(Some(bytes)),
            Frame::Close => Ok(None),
            Frame::Text(text) => Err(SessionError::transport(format!(
                "expected binary audio frame, got {} bytes of text",
                text.len()
            ))),
        }
    }
}

/// One duplex connection carrying audio in and results out.
#[async_trait]
pub trait SessionTransport: Send {
    /// Next audio chunk, or `None` once the peer has disconnected.
    async fn recv(&mut self) -> Result<Option<Vec<u8>>, SessionError>;

    async fn send(&mut self, message: &ResultMessage) -> Result<(), SessionError>;

    /// Close the connection. Safe to call more than once.
    async fn close(&mut self);
}

/// In-process transport backed by tokio channels.
pub struct ChannelTransport {
    frames_rx: mpsc::Receiver<Frame>,
    results_tx: Option<mpsc::Sender<ResultMessage>>,
}

/// The peer side of a `ChannelTransport`.
pub struct ChannelPeer {
    frames_tx: Option<mpsc::Sender<Frame>>,
    results_rx: mpsc::Receiver<ResultMessage>,
}

impl ChannelTransport {
    pub fn pair(capacity: usize) -> (ChannelTransport, ChannelPeer) {
        let (frames_tx, frames_rx) = mpsc::channel(capacity);
        let (results_tx, results_rx) = mpsc::channel(capacity);

        (
            ChannelTransport {
                frames_rx,
                results_tx: Some(results_tx),
            },
            ChannelPeer {
                frames_tx: Some(frames_tx),
                results_rx,
            },
        )
    }
}

#[async_trait]
impl SessionTransport for ChannelTransport {
    async fn recv(&mut self) -> Result<Option<Vec<u8>>, SessionError> {
        match self.frames_rx.recv().await {
            Some(frame) => frame.into_chunk(),
            // Sender dropped: treat as a normal disconnect
            None => Ok(None),
        }
    }

    async fn send(&mut self, message: &ResultMessage) -> Result<(), SessionError> {
        let tx = self
            .results_tx
            .as_ref()
            .ok_or_else(|| SessionError::transport("connection already closed"))?;

        tx.send(message.clone())
            .await
            .map_err(|_| SessionError::transport("peer stopped reading results"))
    }

    async fn close(&mut self) {
        if self.results_tx.take().is_some() {
            debug!("Channel transport closed");
        }
        self.frames_rx.close();
    }
}

impl ChannelPeer {
    pub async fn send_audio(&self, chunk: Vec<u8>) -> Result<(), SessionError> {
        self.send_frame(Frame::Binary(chunk)).await
    }

    pub async fn send_frame(&self, frame: Frame) -> Result<(), SessionError> {
        let tx = self
            .frames_tx
            .as_ref()
            .ok_or_else(|| SessionError::transport("peer already disconnected"))?;

        tx.send(frame)
            .await
            .map_err(|_| SessionError::transport("session is no longer receiving"))
    }

    /// Send a close frame and stop sending.
    pub async fn disconnect(&mut self) {
        if let Some(tx) = self.frames_tx.take() {
            let _ = tx.send(Frame::Close).await;
        }
    }

    /// Next result, or `None` once the session closed the connection.
    pub async fn recv_result(&mut self) -> Option<ResultMessage> {
        self.results_rx.recv().await
    }

    /// Drain results until the session closes the connection.
    pub async fn collect_results(&mut self) -> Vec<ResultMessage> {
        let mut results = Vec::new();
        while let Some(msg) = self.results_rx.recv().await {
            results.push(msg);
        }
        results
    }
}
