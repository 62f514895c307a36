pub mod audio;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod http;
pub mod recognizer;
pub mod session;

pub use audio::{AudioFile, AudioSink};
pub use config::Config;
pub use dispatcher::{DispatchError, Dispatcher, DispatcherConfig};
pub use error::{ConfigurationError, DecoderError, SessionError};
pub use http::{create_router, AppState};
pub use recognizer::{create_factory, Recognizer, RecognizerFactory};
pub use session::{
    ChannelPeer, ChannelTransport, Frame, ResultMessage, SessionConfig, SessionState,
    SessionStats, SessionTransport, TranscriptionSession,
};
