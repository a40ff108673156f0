//! Scripted providers for demos and tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{ModelTier, Transcriber, Translator};
use crate::errors::{ProviderError, ProviderErrorKind};

/// Transcriber that returns a fixed result
#[derive(Debug)]
pub struct ScriptedTranscriber {
    result: Result<String, ProviderError>,
    calls: AtomicUsize,
}

impl ScriptedTranscriber {
    pub fn returning(text: impl Into<String>) -> Self {
        Self {
            result: Ok(text.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(kind: ProviderErrorKind) -> Self {
        Self {
            result: Err(ProviderError::new(kind, "scripted transcription failure")),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transcriber for ScriptedTranscriber {
    async fn transcribe(&self, _audio: &Path) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

/// Translator with canned answers and configurable failures.
///
/// Unknown sentences translate to `"{text} (translated)"`.
#[derive(Debug, Default)]
pub struct ScriptedTranslator {
    answers: HashMap<String, String>,
    primary_failure: Option<ProviderErrorKind>,
    fallback_failure: Option<ProviderErrorKind>,
    latency: Duration,
    primary_calls: AtomicUsize,
    fallback_calls: AtomicUsize,
}

impl ScriptedTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answer(mut self, text: impl Into<String>, answer: impl Into<String>) -> Self {
        self.answers.insert(text.into(), answer.into());
        self
    }

    pub fn failing_primary(mut self, kind: ProviderErrorKind) -> Self {
        self.primary_failure = Some(kind);
        self
    }

    pub fn failing_fallback(mut self, kind: ProviderErrorKind) -> Self {
        self.fallback_failure = Some(kind);
        self
    }

    /// Sleep this long inside every call
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn primary_calls(&self) -> usize {
        self.primary_calls.load(Ordering::SeqCst)
    }

    pub fn fallback_calls(&self) -> usize {
        self.fallback_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for ScriptedTranslator {
    async fn translate(&self, text: &str, tier: ModelTier) -> Result<String, ProviderError> {
        let failure = match tier {
            ModelTier::Primary => {
                self.primary_calls.fetch_add(1, Ordering::SeqCst);
                self.primary_failure
            }
            ModelTier::Fallback => {
                self.fallback_calls.fetch_add(1, Ordering::SeqCst);
                self.fallback_failure
            }
        };

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if let Some(kind) = failure {
            return Err(ProviderError::new(kind, "scripted translation failure"));
        }

        Ok(self
            .answers
            .get(text)
            .cloned()
            .unwrap_or_else(|| format!("{} (translated)", text)))
    }

    async fn test_connection(&self) -> Result<String, ProviderError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match self.primary_failure {
            Some(kind) => Err(ProviderError::new(kind, "scripted connection failure")),
            None => Ok("Hello, API is working!".to_string()),
        }
    }
}
