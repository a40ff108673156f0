//! Error types shared by the fragment sources, provider adapters and the stream loop.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Failure category decided once by a provider adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// 401/403, bad or missing credential
    Authentication,
    /// 402, account out of credits
    InsufficientCredits,
    /// 429
    RateLimited,
    /// Connect/timeout/transport failure before a response arrived
    Network,
    /// Any other non-success status
    Rejected,
    /// Response arrived but could not be read
    Malformed,
}

impl ProviderErrorKind {
    /// Map an HTTP status code onto a failure category.
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => Self::Authentication,
            402 => Self::InsufficientCredits,
            429 => Self::RateLimited,
            _ => Self::Rejected,
        }
    }
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Authentication => "authentication failed",
            Self::InsufficientCredits => "insufficient credits",
            Self::RateLimited => "rate limited",
            Self::Network => "network error",
            Self::Rejected => "request rejected",
            Self::Malformed => "malformed response",
        };
        f.write_str(label)
    }
}

/// Errors returned by a transcription or translation provider.
#[derive(Error, Debug, Clone)]
#[error("Provider {kind}: {message}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        let kind = if error.is_timeout() || error.is_connect() || error.is_request() {
            ProviderErrorKind::Network
        } else if let Some(status) = error.status() {
            ProviderErrorKind::from_status(status.as_u16())
        } else if error.is_decode() || error.is_body() {
            ProviderErrorKind::Malformed
        } else {
            ProviderErrorKind::Network
        };
        Self::new(kind, error.to_string())
    }
}

/// Errors that end a fragment source early.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Required input artifact is missing or unreadable
    #[error("Source unavailable: {path}: {reason}")]
    SourceUnavailable { path: PathBuf, reason: String },

    /// Audio exceeds the transcription ceiling
    #[error("Audio file too large ({size} bytes, limit {limit} bytes). Please use a smaller file.")]
    AudioTooLarge { size: u64, limit: u64 },

    /// A provider returned blank output
    #[error("Received empty {0} from provider")]
    EmptyResult(&'static str),

    /// Provider-backed strategy requested without a configured provider
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl SourceError {
    pub fn unavailable(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        Self::SourceUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Raised when a provider client cannot be built from its configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing provider credential: set provider.api_key or one of {vars}")]
    MissingCredential { vars: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Writing to the client failed; the peer is gone.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Transport closed")]
pub struct TransportFailure;
