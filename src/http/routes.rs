use super::handlers;
use super::state::AppState;
use super::ws;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    let upload_limit = state.config.uploads.max_upload_bytes;

    Router::new()
        .route("/", get(handlers::root))
        // Health check
        .route("/health", get(handlers::health_check))
        // Audio management
        .route(
            "/upload",
            post(handlers::upload_audio).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/audio-files", get(handlers::list_audio_files))
        // Streaming sockets
        .route("/ws", get(ws::session_socket))
        .route("/ws/captions", get(ws::caption_socket))
        .route("/ws/translate", get(ws::translate_socket))
        // Browser client is served from elsewhere
        .layer(CorsLayer::permissive())
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
