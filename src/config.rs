use serde::Deserialize;
use std::path::PathBuf;

use crate::error::ConfigurationError;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
    pub recognizer: RecognizerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
    /// Path of the streaming endpoint
    pub ws_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    /// Directory receiving one WAV file per session
    pub recordings_path: String,
    pub sample_rate: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecognizerConfig {
    /// Engine name (currently only "vosk")
    pub engine: String,
    pub model_path: String,
}

impl Config {
    /// Load defaults, then the optional file at `path`, then `SPEECH_STREAM__*` env vars.
    pub fn load(path: &str) -> Result<Self, ConfigurationError> {
        let settings = config::Config::builder()
            .set_default("service.name", "speech-stream")?
            .set_default("service.http.bind", "0.0.0.0")?
            .set_default("service.http.port", 8000)?
            .set_default("service.http.ws_path", "/ws/speech")?
            .set_default("audio.recordings_path", "recordings")?
            .set_default("audio.sample_rate", 16000)?
            .set_default("recognizer.engine", "vosk")?
            .set_default("recognizer.model_path", "model")?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("SPEECH_STREAM").separator("__"))
            .build()?;

        let cfg: Self = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.audio.sample_rate == 0 {
            return Err(ConfigurationError::Invalid(
                "audio.sample_rate must be positive".to_string(),
            ));
        }
        if !self.service.http.ws_path.starts_with('/') {
            return Err(ConfigurationError::Invalid(format!(
                "service.http.ws_path must start with '/', got {:?}",
                self.service.http.ws_path
            )));
        }
        if self.recognizer.engine.trim().is_empty() {
            return Err(ConfigurationError::Invalid(
                "recognizer.engine must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.service.http.bind, self.service.http.port)
    }

    pub fn recordings_dir(&self) -> PathBuf {
        expand_path(&self.audio.recordings_path)
    }

    pub fn model_path(&self) -> PathBuf {
        expand_path(&self.recognizer.model_path)
    }
}

fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}
