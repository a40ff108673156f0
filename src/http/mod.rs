//! HTTP and WebSocket API for the browser client
//!
//! - GET /ws - JSON request/notification streaming session
//! - GET /ws/captions - raw caption stream, starts on connect
//! - GET /ws/translate - live text translation
//! - POST /upload - store an audio file
//! - GET /audio-files - list stored audio
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;
pub mod ws;

pub use routes::create_router;
pub use state::AppState;
