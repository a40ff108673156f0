use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use super::splitter::split_sentences;
use super::{Fragment, FragmentSource};
use crate::errors::{ProviderErrorKind, SourceError};
use crate::providers::{ModelTier, Transcriber, Translator};

/// Substituted when the transcription call fails
pub const FALLBACK_TRANSCRIPT: &str = "अजिता हरे जय माधवा विष्णो अजमुख देव नाथा विजय शारदे
साधु द्विजनोनु परयुन्नु सुजन सङ्गममेत्तम् सुकृत निवग
सुलभमथनु नियतम् पलदिनमायि ञ्जनम् बलभद्रनुजा निन्ने
नलमोडु काण्मथिन्नु कलियल्ले रुचिक्कुन्नु काल विशमम् कोण्डु";

/// A transcribed sentence and its translation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentencePair {
    pub original: String,
    pub translated: String,
    /// 1-based position
    pub index: usize,
    pub total: usize,
}

/// Transcribes an audio file once, then translates it sentence by sentence
pub struct PipelineSource {
    translator: Arc<dyn Translator>,
    sentences: Vec<String>,
    next: usize,
    used_fallback: bool,
}

impl PipelineSource {
    /// Validate and transcribe `audio`, then split the result into sentences.
    ///
    /// A failed transcription call is replaced by [`FALLBACK_TRANSCRIPT`]. When
    /// `save_transcript` is set, a successful transcription is written there.
    pub async fn prepare(
        audio: &Path,
        max_bytes: u64,
        transcriber: &dyn Transcriber,
        translator: Arc<dyn Translator>,
        save_transcript: Option<PathBuf>,
    ) -> Result<Self, SourceError> {
        let metadata = tokio::fs::metadata(audio)
            .await
            .map_err(|e| SourceError::unavailable(audio, e))?;

        if !metadata.is_file() {
            return Err(SourceError::unavailable(audio, "not a file"));
        }

        let size = metadata.len();
        if size > max_bytes {
            return Err(SourceError::AudioTooLarge {
                size,
                limit: max_bytes,
            });
        }

        info!(
            "Transcribing {} ({:.2} MB)",
            audio.display(),
            size as f64 / (1024.0 * 1024.0)
        );

        let (text, used_fallback) = match transcriber.transcribe(audio).await {
            Ok(text) => (text, false),
            Err(e) => {
                warn!("Transcription failed ({}), using fallback sample text", e);
                (FALLBACK_TRANSCRIPT.to_string(), true)
            }
        };

        let text = text.trim();
        if text.is_empty() {
            return Err(SourceError::EmptyResult("transcription"));
        }

        if !used_fallback {
            if let Some(path) = save_transcript {
                if let Err(e) = tokio::fs::write(&path, text).await {
                    warn!("Failed to save transcript to {}: {}", path.display(), e);
                }
            }
        }

        let sentences = split_sentences(text);
        if sentences.is_empty() {
            return Err(SourceError::EmptyResult("transcription"));
        }

        info!("Transcription split into {} sentences", sentences.len());

        Ok(Self::from_sentences(sentences, translator, used_fallback))
    }

    /// Build directly from an already split sentence list
    pub fn from_sentences(
        sentences: Vec<String>,
        translator: Arc<dyn Translator>,
        used_fallback: bool,
    ) -> Self {
        Self {
            translator,
            sentences,
            next: 0,
            used_fallback,
        }
    }

    /// Whether the fallback transcript stands in for real transcription output
    pub fn used_fallback(&self) -> bool {
        self.used_fallback
    }
}

#[async_trait]
impl FragmentSource for PipelineSource {
    async fn next_fragment(&mut self) -> Option<Result<Fragment, SourceError>> {
        let original = self.sentences.get(self.next)?.clone();
        self.next += 1;

        let translated = translate_or_placeholder(self.translator.as_ref(), &original).await;
        if translated.trim().is_empty() {
            return Some(Err(SourceError::EmptyResult("translation")));
        }

        Some(Ok(Fragment::Sentence(SentencePair {
            original,
            translated,
            index: self.next,
            total: self.sentences.len(),
        })))
    }

    fn total_units(&self) -> Option<usize> {
        Some(self.sentences.len())
    }

    fn name(&self) -> &str {
        "pipeline"
    }
}

/// Translate `text`, never failing.
///
/// Credential, credit and network failures short-circuit to a placeholder naming
/// the problem. Other failures retry once on the fallback model before giving up.
pub async fn translate_or_placeholder(translator: &dyn Translator, text: &str) -> String {
    let err = match translator.translate(text, ModelTier::Primary).await {
        Ok(translated) => return translated.trim().to_string(),
        Err(e) => e,
    };

    warn!("Translation failed: {}", err);

    match err.kind {
        ProviderErrorKind::Authentication => format!("Authentication error: {}", text),
        ProviderErrorKind::InsufficientCredits => format!("Credit error - Original: {}", text),
        ProviderErrorKind::Network => format!("Network error - Original: {}", text),
        _ => match translator.translate(text, ModelTier::Fallback).await {
            Ok(translated) => translated.trim().to_string(),
            Err(e) => {
                warn!("Fallback translation failed: {}", e);
                format!("Translation unavailable: {}", text)
            }
        },
    }
}
