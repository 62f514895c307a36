//! Transcription session management
//!
//! This module provides the `TranscriptionSession` abstraction that manages:
//! - Persisting inbound PCM to one WAV file per session
//! - Feeding the same bytes to a per-session recognizer
//! - Emitting exactly one partial/final result per inbound chunk
//! - Guaranteed teardown on disconnect or error

mod config;
mod message;
mod registry;
mod session;
mod stats;
mod transport;

pub use config::SessionConfig;
pub use message::ResultMessage;
pub use registry::{Registration, SessionRegistry};
pub use session::{SessionState, TranscriptionSession};
pub use stats::SessionStats;
pub use transport::{ChannelPeer, ChannelTransport, Frame, SessionTransport};
