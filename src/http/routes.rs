use super::handlers;
use super::state::AppState;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

/// Create the router exposing the streaming endpoint at `ws_path`
pub fn create_router(state: AppState, ws_path: &str) -> Router {
    Router::new()
        .route(ws_path, get(handlers::speech_socket))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
