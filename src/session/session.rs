use super::config::SessionConfig;
use super::message::ResultMessage;
use super::stats::SessionStats;
use super::transport::SessionTransport;
use crate::audio::AudioSink;
use crate::error::SessionError;
use crate::recognizer::{Recognizer, RecognizerFactory};
use tracing::{debug, error, info};

/// Lifecycle of a session. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Receiving and processing chunks
    Active,
    /// Termination initiated, cleanup in progress
    Closing,
    /// Decoder released, sink and connection closed
    Closed,
}

/// One streaming connection's worth of state: a recording and a decoder.
pub struct TranscriptionSession {
    config: SessionConfig,
    state: SessionState,
    sink: AudioSink,
    decoder: Option<Box<dyn Recognizer>>,
    stats: SessionStats,
}

impl TranscriptionSession {
    /// Open the recording, then create the decoder.
    ///
    /// The decoder is only created once the sink exists, so a sink failure
    /// never leaves a decoder behind. A decoder failure closes the sink.
    pub fn open(
        config: SessionConfig,
        factory: &dyn RecognizerFactory,
    ) -> Result<Self, SessionError> {
        let mut sink = AudioSink::open(config.recording_path(), config.sample_rate)?;

        let decoder = match factory.create(config.sample_rate) {
            Ok(decoder) => decoder,
            Err(e) => {
                if let Err(close_err) = sink.close() {
                    error!(
                        "[{}] Failed to close recording after decoder error: {}",
                        config.session_id, close_err
                    );
                }
                return Err(e.into());
            }
        };

        info!(
            "[{}] Session started ({} decoder, recording to {})",
            config.session_id,
            factory.name(),
            sink.path().display()
        );

        let stats = SessionStats::new(config.session_id.clone());

        Ok(Self {
            config,
            state: SessionState::Active,
            sink,
            decoder: Some(decoder),
            stats,
        })
    }

    /// Process chunks until the peer disconnects or an error occurs, then close.
    ///
    /// Cleanup runs on every exit path before this returns.
    pub async fn run<T>(&mut self, transport: &mut T) -> Result<SessionStats, SessionError>
    where
        T: SessionTransport + ?Sized,
    {
        let outcome = self.receive_loop(transport).await;

        if let Err(e) = &outcome {
            error!("[{}] Session terminated: {}", self.config.session_id, e);
        }

        let closed = self.close(transport).await;

        outcome.and(closed).map(|_| self.stats())
    }

    async fn receive_loop<T>(&mut self, transport: &mut T) -> Result<(), SessionError>
    where
        T: SessionTransport + ?Sized,
    {
        while let Some(chunk) = transport.recv().await? {
            let message = self.process_chunk(&chunk)?;
            transport.send(&message).await?;
        }

        info!("[{}] Peer disconnected", self.config.session_id);
        Ok(())
    }

    /// Persist `chunk`, feed it to the decoder and build the one result it yields.
    ///
    /// Persistence happens before decoding so the raw audio survives a decoder failure.
    pub fn process_chunk(&mut self, chunk: &[u8]) -> Result<ResultMessage, SessionError> {
        if self.state != SessionState::Active {
            return Err(SessionError::InvalidState(self.state));
        }

        if chunk.len() % 2 != 0 {
            return Err(SessionError::transport(format!(
                "frame of {} bytes is not sample-aligned",
                chunk.len()
            )));
        }

        self.sink.write(chunk)?;

        let decoder = self
            .decoder
            .as_mut()
            .ok_or(SessionError::InvalidState(self.state))?;

        let message = if decoder.accept_chunk(chunk)? {
            ResultMessage::Final {
                text: decoder.consume_final()?,
            }
        } else {
            ResultMessage::Partial {
                text: decoder.peek_partial()?,
            }
        };

        self.stats.record(chunk.len(), &message);

        debug!(
            "[{}] chunk #{} ({} bytes) -> {:?}",
            self.config.session_id,
            self.stats.chunks_received,
            chunk.len(),
            message
        );

        Ok(message)
    }

    /// Close the sink, release the decoder and close the connection.
    ///
    /// Idempotent: once `Closed`, further calls return `Ok(())` without side effects.
    pub async fn close<T>(&mut self, transport: &mut T) -> Result<(), SessionError>
    where
        T: SessionTransport + ?Sized,
    {
        if self.state == SessionState::Closed {
            return Ok(());
        }

        self.state = SessionState::Closing;

        // Local resources first; closing the connection may wait on the peer.
        self.decoder.take();
        let sink_result = self.sink.close();

        transport.close().await;

        self.state = SessionState::Closed;
        self.stats.touch();

        info!(
            "[{}] Session ended: {} chunks, {} bytes, {} partial / {} final, {:.1}s",
            self.config.session_id,
            self.stats.chunks_received,
            self.stats.bytes_received,
            self.stats.partials_sent,
            self.stats.finals_sent,
            self.stats.duration_secs
        );
        debug!(
            "[{}] Transcript: {}",
            self.config.session_id,
            self.stats.transcript_text()
        );

        sink_result
    }

    pub fn id(&self) -> &str {
        &self.config.session_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn recording_path(&self) -> &std::path::Path {
        self.sink.path()
    }

    pub fn has_decoder(&self) -> bool {
        self.decoder.is_some()
    }

    pub fn stats(&self) -> SessionStats {
        self.stats.clone()
    }
}
