pub mod config;
pub mod errors;
pub mod http;
pub mod providers;
pub mod session;
pub mod source;
pub mod stream;
pub mod uploads;

pub use config::Config;
pub use errors::{ConfigError, ProviderError, ProviderErrorKind, SourceError, TransportFailure};
pub use http::{create_router, AppState};
pub use providers::{ModelTier, OpenRouterClient, ProviderSet, Transcriber, Translator};
pub use session::{SessionConfig, SessionController, SessionHandle, SessionStats};
pub use source::{Fragment, FragmentSource, PipelineSource, StaticSource, TranscriptSource};
pub use stream::{ClientRequest, Outgoing, PacingEmitter, PacingPlan, RunOutcome, ServerMessage, Strategy};
