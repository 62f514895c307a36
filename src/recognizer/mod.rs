//! Speech recognizer abstraction
//!
//! A session owns exactly one `Recognizer`, created from the process-wide
//! `RecognizerFactory`. The factory holds whatever is shareable (a loaded
//! model); the recognizer holds per-stream decoding state and is never shared.

#[cfg(feature = "vosk")]
pub mod vosk;

use std::path::Path;
use std::sync::Arc;

use crate::config::RecognizerConfig;
use crate::error::{ConfigurationError, DecoderError};

/// Stateful streaming decoder for one audio stream.
pub trait Recognizer: Send {
    /// Feed raw little-endian 16-bit mono PCM.
    ///
    /// Returns `true` when this chunk completed an utterance.
    fn accept_chunk(&mut self, chunk: &[u8]) -> Result<bool, DecoderError>;

    /// Committed text of the utterance just completed; resets utterance state.
    fn consume_final(&mut self) -> Result<String, DecoderError>;

    /// Non-committing hypothesis for the utterance in progress.
    fn peek_partial(&mut self) -> Result<String, DecoderError>;
}

/// Creates independent recognizers, one per session.
pub trait RecognizerFactory: Send + Sync {
    fn create(&self, sample_rate: u32) -> Result<Box<dyn Recognizer>, DecoderError>;

    /// Engine name for logging
    fn name(&self) -> &str;
}

/// Build the configured engine. Runs once at startup; every failure here is fatal.
pub fn create_factory(
    config: &RecognizerConfig,
    model_path: &Path,
) -> Result<Arc<dyn RecognizerFactory>, ConfigurationError> {
    match config.engine.as_str() {
        "vosk" => {
            if !model_path.exists() {
                return Err(ConfigurationError::MissingModel(model_path.to_path_buf()));
            }

            #[cfg(feature = "vosk")]
            {
                let factory = vosk::VoskFactory::load(model_path)?;
                Ok(Arc::new(factory))
            }

            #[cfg(not(feature = "vosk"))]
            {
                Err(ConfigurationError::EngineUnavailable(
                    "built without the `vosk` feature".to_string(),
                ))
            }
        }
        other => Err(ConfigurationError::EngineUnavailable(format!(
            "unknown engine {:?}",
            other
        ))),
    }
}

/// Decode little-endian 16-bit PCM. A trailing odd byte is an error.
pub fn pcm16_le_samples(chunk: &[u8]) -> Result<Vec<i16>, DecoderError> {
    if chunk.len() % 2 != 0 {
        return Err(DecoderError::new(format!(
            "chunk of {} bytes is not sample-aligned",
            chunk.len()
        )));
    }
    Ok(chunk
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}
