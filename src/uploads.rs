//! Upload directory helpers: naming stored audio, resolving client-supplied
//! names, and listing what is available.

use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::errors::SourceError;

/// Extensions accepted for upload and shown in listings
pub const AUDIO_EXTENSIONS: [&str; 6] = ["mp3", "wav", "m4a", "ogg", "flac", "webm"];

/// Names tried before giving up on a fresh upload file
const MAX_NAME_ATTEMPTS: usize = 5;

/// Lowercased extension of `name` if it is an accepted audio type
pub fn audio_extension(name: &str) -> Option<String> {
    let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    AUDIO_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Storage name for an upload received at `at`, e.g. `audio_20251028_143000_123456.mp3`
pub fn stored_name(at: DateTime<Utc>, extension: &str) -> String {
    format!("audio_{}.{}", at.format("%Y%m%d_%H%M%S_%6f"), extension)
}

/// Create a file in `dir` under a name from `next_name`, never replacing an
/// existing file. A name that is already taken is retried with the next one.
pub async fn create_unique<F>(dir: &Path, mut next_name: F) -> std::io::Result<(String, tokio::fs::File)>
where
    F: FnMut() -> String,
{
    tokio::fs::create_dir_all(dir).await?;

    let mut attempt = 1;
    loop {
        let name = next_name();
        let opened = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(dir.join(&name))
            .await;

        match opened {
            Ok(file) => return Ok((name, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists && attempt < MAX_NAME_ATTEMPTS => {
                warn!("Upload name {} already taken, retrying", name);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Resolve a client-supplied file name inside `dir`, refusing anything that is
/// not a bare file name.
pub fn resolve(dir: &Path, name: &str) -> Result<PathBuf, SourceError> {
    let candidate = Path::new(name);
    let is_bare = !name.is_empty()
        && candidate.file_name().is_some_and(|f| f == candidate.as_os_str())
        && name != "."
        && name != "..";

    if !is_bare {
        return Err(SourceError::unavailable(name, "invalid audio file name"));
    }

    Ok(dir.join(candidate))
}

/// Sorted names of audio files in `dir`; a missing directory lists as empty
pub async fn list_audio_files(dir: &Path) -> Vec<String> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Cannot list {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut files = Vec::new();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!("Listing {} stopped early: {}", dir.display(), e);
                break;
            }
        };
        let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
        if !is_file {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if audio_extension(name).is_some() {
                files.push(name.to_string());
            }
        }
    }

    files.sort();
    files
}
