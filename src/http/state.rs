use crate::config::Config;
use crate::providers::ProviderSet;
use std::sync::Arc;

/// Shared application state for HTTP and socket handlers
#[derive(Clone)]
pub struct AppState {
    /// Process-wide configuration, loaded once at startup
    pub config: Arc<Config>,

    /// Transcription/translation providers (absent in offline mode)
    pub providers: ProviderSet,
}

impl AppState {
    pub fn new(config: Config, providers: ProviderSet) -> Self {
        Self {
            config: Arc::new(config),
            providers,
        }
    }
}
