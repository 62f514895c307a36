use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::message::ResultMessage;

/// Statistics about a transcription session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    pub session_id: String,

    /// When the session started
    pub started_at: DateTime<Utc>,

    /// Wall-clock duration in seconds
    pub duration_secs: f64,

    /// Number of audio chunks received
    pub chunks_received: usize,

    /// Raw PCM bytes received (and persisted)
    pub bytes_received: u64,

    pub partials_sent: usize,

    pub finals_sent: usize,

    /// Non-empty final texts, in order
    pub transcript: Vec<String>,
}

impl SessionStats {
    pub fn new(session_id: String) -> Self {
        Self {
            session_id,
            started_at: Utc::now(),
            duration_secs: 0.0,
            chunks_received: 0,
            bytes_received: 0,
            partials_sent: 0,
            finals_sent: 0,
            transcript: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, chunk_len: usize, message: &ResultMessage) {
        self.chunks_received += 1;
        self.bytes_received += chunk_len as u64;

        match message {
            ResultMessage::Partial { .. } => self.partials_sent += 1,
            ResultMessage::Final { text } => {
                self.finals_sent += 1;
                if !text.is_empty() {
                    self.transcript.push(text.clone());
                }
            }
        }
    }

    pub(crate) fn touch(&mut self) {
        let elapsed = Utc::now().signed_duration_since(self.started_at);
        self.duration_secs = elapsed.num_milliseconds() as f64 / 1000.0;
    }

    /// Committed transcript joined with spaces
    pub fn transcript_text(&self) -> String {
        self.transcript.join(" ")
    }
}
