//! Fragment sources: where the text a session streams comes from.
//!
//! - `StaticSource` - canned demo chunks
//! - `TranscriptSource` - word-by-word replay of a transcript file
//! - `PipelineSource` - transcription + per-sentence translation

use async_trait::async_trait;

use crate::errors::SourceError;

mod pipeline;
mod splitter;
mod static_list;
mod transcript;

pub use pipeline::{translate_or_placeholder, PipelineSource, SentencePair, FALLBACK_TRANSCRIPT};
pub use splitter::split_sentences;
pub use static_list::{StaticSource, DEMO_CHUNKS};
pub use transcript::{replay_fragments, TranscriptSource};

/// One unit of text emitted to the client
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// Word-level or demo caption, sent verbatim
    Caption(String),
    /// End of a transcript line; sent as an empty payload
    LineEnd,
    /// A translated sentence from the pipeline
    Sentence(SentencePair),
}

impl Fragment {
    /// Whether this fragment closes a unit (line or sentence)
    pub fn ends_unit(&self) -> bool {
        matches!(self, Self::LineEnd | Self::Sentence(_))
    }
}

/// A lazy, finite, ordered sequence of fragments, consumed once
#[async_trait]
pub trait FragmentSource: Send {
    /// Produce the next fragment, or `None` once exhausted
    async fn next_fragment(&mut self) -> Option<Result<Fragment, SourceError>>;

    /// Number of units the source will yield, when known up front
    fn total_units(&self) -> Option<usize> {
        None
    }

    /// Source name for logging
    fn name(&self) -> &str;
}
