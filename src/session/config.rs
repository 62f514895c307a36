use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for a transcription session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier (UUIDv4), used for the recording file name and log correlation
    pub session_id: String,

    /// Directory the session's WAV file is written to
    pub recordings_dir: PathBuf,

    /// Sample rate of inbound PCM (recognizers expect 16kHz)
    pub sample_rate: u32,
}

impl SessionConfig {
    /// Mint a fresh identity for a new session.
    pub fn new(recordings_dir: impl Into<PathBuf>, sample_rate: u32) -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            recordings_dir: recordings_dir.into(),
            sample_rate,
        }
    }

    /// `<recordings_dir>/<session_id>.wav`
    pub fn recording_path(&self) -> PathBuf {
        self.recordings_dir.join(format!("{}.wav", self.session_id))
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new("recordings", 16000)
    }
}
