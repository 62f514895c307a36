//! WebSocket endpoint for streaming transcription
//!
//! A single route (default `/ws/speech`) upgrades each connection and hands it
//! to the dispatcher as a new session. Inbound binary frames are raw 16kHz mono
//! PCM; each one is answered with one text frame `{"type", "text"}`.

mod handlers;
mod routes;
mod state;
mod transport;

pub use routes::create_router;
pub use state::AppState;
pub use transport::WsTransport;
