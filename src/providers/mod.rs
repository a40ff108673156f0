//! Provider adapters for the external transcription and translation services.
//!
//! Adapters normalise every response to plain text and classify failures into a
//! [`ProviderErrorKind`](crate::errors::ProviderErrorKind), so fragment sources never
//! look at SDK- or HTTP-specific shapes.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::errors::ProviderError;

/// Which translation model to ask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    Primary,
    Fallback,
}

/// Speech-to-text service
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe the audio file at `audio` into raw text
    async fn transcribe(&self, audio: &Path) -> Result<String, ProviderError>;
}

/// Text translation service
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate one sentence using the given model tier
    async fn translate(&self, text: &str, tier: ModelTier) -> Result<String, ProviderError>;

    /// Round-trip a tiny request to verify credentials and reachability.
    ///
    /// Returns the provider's reply text.
    async fn test_connection(&self) -> Result<String, ProviderError>;
}

/// The providers available to sessions; either may be absent
#[derive(Clone, Default)]
pub struct ProviderSet {
    pub transcriber: Option<Arc<dyn Transcriber>>,
    pub translator: Option<Arc<dyn Translator>>,
}

impl ProviderSet {
    pub fn new(transcriber: Arc<dyn Transcriber>, translator: Arc<dyn Translator>) -> Self {
        Self {
            transcriber: Some(transcriber),
            translator: Some(translator),
        }
    }

    /// One client serving both roles
    pub fn from_client<C>(client: Arc<C>) -> Self
    where
        C: Transcriber + Translator + 'static,
    {
        Self::new(client.clone(), client)
    }

    /// No provider configured (offline mode)
    pub fn none() -> Self {
        Self::default()
    }
}

pub mod mock;
pub mod openrouter;

pub use mock::{ScriptedTranscriber, ScriptedTranslator};
pub use openrouter::OpenRouterClient;
