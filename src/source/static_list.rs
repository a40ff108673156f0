use async_trait::async_trait;
use std::collections::VecDeque;

use super::{Fragment, FragmentSource};
use crate::errors::SourceError;

/// Demo chunks streamed by the static strategy
pub const DEMO_CHUNKS: [&str; 6] = [
    "Om namah shivaya",
    "Salutations to the auspicious one",
    "Jai shri krishna",
    "Victory to the blessed Krishna",
    "Hare Krishna Hare Rama",
    "May all beings be happy",
];

/// Fixed, ordered list of captions
pub struct StaticSource {
    chunks: VecDeque<String>,
}

impl StaticSource {
    pub fn new<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
        }
    }

    pub fn demo() -> Self {
        Self::new(DEMO_CHUNKS)
    }
}

#[async_trait]
impl FragmentSource for StaticSource {
    async fn next_fragment(&mut self) -> Option<Result<Fragment, SourceError>> {
        self.chunks.pop_front().map(|c| Ok(Fragment::Caption(c)))
    }

    fn total_units(&self) -> Option<usize> {
        Some(self.chunks.len())
    }

    fn name(&self) -> &str {
        "static"
    }
}
