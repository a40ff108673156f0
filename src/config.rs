use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Environment variables checked for the provider credential, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["KAPI", "OPENROUTER_API_KEY"];

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub uploads: UploadConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub stream: StreamConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Directory uploaded audio is stored in and listed from
    #[serde(default = "default_upload_dir")]
    pub dir: PathBuf,

    /// Ingress cap for `POST /upload`
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Files above this size are rejected before transcription is attempted
    #[serde(default = "default_max_transcription_bytes")]
    pub max_transcription_bytes: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_referer")]
    pub referer: String,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_transcription_model")]
    pub transcription_model: String,
    /// ISO code passed to the transcription endpoint ("sa" = Sanskrit)
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_translation_model")]
    pub translation_model: String,
    #[serde(default = "default_fallback_model")]
    pub fallback_model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    /// Where the pipeline saves transcripts and the replay strategy reads them
    #[serde(default = "default_transcript_path")]
    pub transcript_path: PathBuf,
    #[serde(default = "default_word_delay")]
    pub word_delay_secs: f64,
    #[serde(default = "default_line_delay")]
    pub line_delay_secs: f64,
    #[serde(default = "default_chunk_delay")]
    pub chunk_delay_secs: f64,
    #[serde(default = "default_sentence_delay")]
    pub sentence_delay_secs: f64,
}

impl Config {
    /// Load from an optional config file, then `CAPTION__*` environment overrides.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("CAPTION").separator("__"))
            .build()
            .with_context(|| format!("Failed to read config from {}", path))?;

        let mut cfg: Config = settings
            .try_deserialize()
            .context("Failed to deserialize config")?;

        if cfg.provider.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            cfg.provider.api_key = API_KEY_ENV_VARS
                .iter()
                .find_map(|var| std::env::var(var).ok())
                .filter(|k| !k.trim().is_empty());
        }

        Ok(cfg)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            http: HttpConfig::default(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: default_upload_dir(),
            max_upload_bytes: default_max_upload_bytes(),
            max_transcription_bytes: default_max_transcription_bytes(),
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            referer: default_referer(),
            title: default_title(),
            transcription_model: default_transcription_model(),
            language: default_language(),
            translation_model: default_translation_model(),
            fallback_model: default_fallback_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            transcript_path: default_transcript_path(),
            word_delay_secs: default_word_delay(),
            line_delay_secs: default_line_delay(),
            chunk_delay_secs: default_chunk_delay(),
            sentence_delay_secs: default_sentence_delay(),
        }
    }
}

fn default_service_name() -> String {
    "caption-stream".to_string()
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_max_upload_bytes() -> usize {
    100 * 1024 * 1024
}

fn default_max_transcription_bytes() -> u64 {
    25 * 1024 * 1024
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_referer() -> String {
    "http://localhost:5000".to_string()
}

fn default_title() -> String {
    "Sanskrit Translator".to_string()
}

fn default_transcription_model() -> String {
    "openai/whisper-large-v3".to_string()
}

fn default_language() -> String {
    "sa".to_string()
}

fn default_translation_model() -> String {
    "anthropic/claude-3.5-sonnet".to_string()
}

fn default_fallback_model() -> String {
    "openai/gpt-4o-mini".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_transcript_path() -> PathBuf {
    PathBuf::from("transcript.txt")
}

fn default_word_delay() -> f64 {
    0.8
}

fn default_line_delay() -> f64 {
    1.5
}

fn default_chunk_delay() -> f64 {
    1.0
}

fn default_sentence_delay() -> f64 {
    3.0
}
