// Vosk (Kaldi) offline recognizer
//
// The model is loaded once and shared; each session gets its own
// `vosk::Recognizer` with independent decoding state.

use std::path::Path;
use std::sync::Arc;
use tracing::info;
use vosk::{CompleteResult, DecodingState, Model};

use super::{pcm16_le_samples, Recognizer, RecognizerFactory};
use crate::error::{ConfigurationError, DecoderError};

pub struct VoskFactory {
    model: Arc<Model>,
}

impl VoskFactory {
    pub fn load(model_path: &Path) -> Result<Self, ConfigurationError> {
        info!("Loading Vosk model from {}", model_path.display());

        let path_str = model_path.to_string_lossy().into_owned();
        let model = Model::new(path_str).ok_or_else(|| ConfigurationError::ModelLoad {
            path: model_path.to_path_buf(),
            reason: "vosk rejected the model directory".to_string(),
        })?;

        info!("Vosk model loaded");

        Ok(Self {
            model: Arc::new(model),
        })
    }
}

impl RecognizerFactory for VoskFactory {
    fn create(&self, sample_rate: u32) -> Result<Box<dyn Recognizer>, DecoderError> {
        let inner = vosk::Recognizer::new(&self.model, sample_rate as f32)
            .ok_or_else(|| DecoderError::new("failed to create vosk recognizer"))?;
        Ok(Box::new(VoskRecognizer { inner }))
    }

    fn name(&self) -> &str {
        "vosk"
    }
}

pub struct VoskRecognizer {
    inner: vosk::Recognizer,
}

impl Recognizer for VoskRecognizer {
    fn accept_chunk(&mut self, chunk: &[u8]) -> Result<bool, DecoderError> {
        let samples = pcm16_le_samples(chunk)?;
        let state = self
            .inner
            .accept_waveform(&samples)
            .map_err(|e| DecoderError::new(format!("accept_waveform: {:?}", e)))?;

        match state {
            DecodingState::Finalized => Ok(true),
            DecodingState::Running => Ok(false),
            DecodingState::Failed => Err(DecoderError::new("vosk failed to decode chunk")),
        }
    }

    fn consume_final(&mut self) -> Result<String, DecoderError> {
        let text = match self.inner.result() {
            CompleteResult::Single(single) => single.text.to_string(),
            CompleteResult::Multiple(multiple) => multiple
                .alternatives
                .first()
                .map(|alt| alt.text.to_string())
                .unwrap_or_default(),
        };
        Ok(text)
    }

    fn peek_partial(&mut self) -> Result<String, DecoderError> {
        Ok(self.inner.partial_result().partial.to_string())
    }
}
