use super::state::AppState;
use super::transport::WsTransport;
use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};

/// GET <ws_path>
/// Upgrade to a WebSocket and run one transcription session over it
pub async fn speech_socket(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| async move {
        // Outcome is logged by the dispatcher
        let _ = state.dispatcher.accept(WsTransport::new(socket)).await;
    })
}
