use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use tracing::info;

use super::{Fragment, FragmentSource};
use crate::errors::SourceError;

/// Replays a transcript file as growing partial captions, one line at a time
pub struct TranscriptSource {
    fragments: VecDeque<Fragment>,
    lines: usize,
}

impl TranscriptSource {
    /// Read the transcript at `path`. Missing or unreadable files are `SourceUnavailable`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        info!("Opening transcript: {}", path.display());

        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| SourceError::unavailable(path, e))?;

        Ok(Self::from_text(&text))
    }

    pub fn from_text(text: &str) -> Self {
        let lines = text.lines().filter(|l| !l.trim().is_empty()).count();
        Self {
            fragments: replay_fragments(text).into(),
            lines,
        }
    }
}

/// Expand transcript text into cumulative word prefixes per line, each line
/// closed by [`Fragment::LineEnd`].
pub fn replay_fragments(text: &str) -> Vec<Fragment> {
    let mut fragments = Vec::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let mut caption = String::with_capacity(line.len());
        for word in line.split_whitespace() {
            if !caption.is_empty() {
                caption.push(' ');
            }
            caption.push_str(word);
            fragments.push(Fragment::Caption(caption.clone()));
        }
        fragments.push(Fragment::LineEnd);
    }

    fragments
}

#[async_trait]
impl FragmentSource for TranscriptSource {
    async fn next_fragment(&mut self) -> Option<Result<Fragment, SourceError>> {
        self.fragments.pop_front().map(Ok)
    }

    fn total_units(&self) -> Option<usize> {
        Some(self.lines)
    }

    fn name(&self) -> &str {
        "transcript"
    }
}
