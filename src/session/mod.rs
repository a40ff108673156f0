//! Streaming session management
//!
//! This module provides the `SessionController` that owns one connection:
//! - Single-flight start/stop of a streaming run
//! - Strategy selection (static, transcript replay, pipeline)
//! - Cooperative teardown on disconnect
//! - Session statistics

mod config;
mod controller;
mod state;
mod stats;

pub use config::SessionConfig;
pub use controller::SessionController;
pub use state::{RunState, SessionHandle};
pub use stats::{SessionCounters, SessionStats};
