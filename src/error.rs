use std::path::PathBuf;
use thiserror::Error;

use crate::session::SessionState;

/// Startup-time failures. Any of these prevents the service from accepting sessions.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("speech model not found at {0} (download and unpack a model there)")]
    MissingModel(PathBuf),

    #[error("recognizer engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("failed to load speech model from {path}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Failure reported by a recognizer engine while processing audio.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct DecoderError(pub String);

impl DecoderError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Errors that terminate a single session. Never propagated to other sessions.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Peer vanished mid-stream or sent a frame we cannot interpret
    #[error("transport error: {0}")]
    Transport(String),

    #[error("decoder error: {0}")]
    Decoder(#[from] DecoderError),

    #[error("audio sink error ({}): {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    #[error("session is {0:?}, cannot process audio")]
    InvalidState(SessionState),
}

impl SessionError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: impl Into<hound::Error>) -> Self {
        Self::Io {
            path: path.into(),
            source: source.into(),
        }
    }
}
