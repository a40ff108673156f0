//! Paced emission of fragments over a session's outbound queue, and the
//! message types exchanged with the browser.

mod emitter;
pub mod messages;

pub use emitter::{PacingEmitter, PacingPlan, RunOutcome};
pub use messages::{
    progress_percent, ClientRequest, Outgoing, ServerMessage, StatusKind, Strategy,
};
