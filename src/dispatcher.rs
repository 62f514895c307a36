//! Session dispatcher
//!
//! Every accepted connection gets a fresh id, a fresh recording and a fresh
//! decoder. The session runs on its own task so a panic inside it is contained.
//! The registry entry is owned by that task, so it is removed when the session
//! ends even if the caller stops waiting for it.

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::error::SessionError;
use crate::recognizer::RecognizerFactory;
use crate::session::{
    Registration, SessionConfig, SessionRegistry, SessionStats, SessionTransport,
    TranscriptionSession,
};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("session task panicked: {0}")]
    Panicked(String),
}

#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Directory for per-session recordings
    pub recordings_dir: PathBuf,
    pub sample_rate: u32,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            recordings_dir: PathBuf::from("recordings"),
            sample_rate: 16000,
        }
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    factory: Arc<dyn RecognizerFactory>,
    config: DispatcherConfig,
    registry: SessionRegistry,
}

impl Dispatcher {
    pub fn new(factory: Arc<dyn RecognizerFactory>, config: DispatcherConfig) -> Self {
        info!(
            "Dispatcher ready: {} engine, {}Hz, recordings in {}",
            factory.name(),
            config.sample_rate,
            config.recordings_dir.display()
        );

        Self {
            factory,
            config,
            registry: SessionRegistry::new(),
        }
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Run one connection as a session, start to finish.
    pub async fn accept<T>(&self, transport: T) -> Result<SessionStats, DispatchError>
    where
        T: SessionTransport + 'static,
    {
        let (session_config, registration) = self.mint_session();
        let session_id = session_config.session_id.clone();

        let factory = Arc::clone(&self.factory);
        let task = tokio::spawn(async move {
            // Dropped with the task: on completion, on panic, or on runtime shutdown
            let _registration = registration;
            run_session(session_config, transport, factory).await
        });

        let result = match task.await {
            Ok(result) => result.map_err(DispatchError::from),
            Err(e) => {
                error!("[{}] Session task panicked: {}", session_id, e);
                Err(DispatchError::Panicked(e.to_string()))
            }
        };

        match &result {
            Ok(stats) => info!(
                "[{}] Session complete ({} chunks)",
                session_id, stats.chunks_received
            ),
            Err(e) => warn!("[{}] Session failed: {}", session_id, e),
        }

        result
    }

    fn mint_session(&self) -> (SessionConfig, Registration) {
        loop {
            let config =
                SessionConfig::new(self.config.recordings_dir.clone(), self.config.sample_rate);
            if let Some(registration) = self.registry.register(&config.session_id) {
                return (config, registration);
            }
            warn!("Session id {} already in use, minting another", config.session_id);
        }
    }
}

/// Open a session over `transport` and drive it to `Closed`.
///
/// If the session cannot be opened the connection is closed immediately.
pub async fn run_session<T>(
    config: SessionConfig,
    mut transport: T,
    factory: Arc<dyn RecognizerFactory>,
) -> Result<SessionStats, SessionError>
where
    T: SessionTransport,
{
    let session_id = config.session_id.clone();

    let mut session = match TranscriptionSession::open(config, factory.as_ref()) {
        Ok(session) => session,
        Err(e) => {
            error!("[{}] Failed to open session: {}", session_id, e);
            transport.close().await;
            return Err(e);
        }
    };

    session.run(&mut transport).await
}
