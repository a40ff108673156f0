use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info};

use super::{ModelTier, Transcriber, Translator};
use crate::config::{ProviderConfig, API_KEY_ENV_VARS};
use crate::errors::{ConfigError, ProviderError, ProviderErrorKind};

const TRANSLATION_PROMPT: &str = "You are an expert Sanskrit translator specializing in devotional and spiritual texts.

Your task:
1. Translate the given Sanskrit text to natural, flowing English
2. Focus on the devotional and spiritual meaning
3. Keep translations concise but meaningful
4. If the text appears to be garbled or unclear, provide the best possible interpretation
5. Respond with ONLY the English translation, no explanations

Context: This is likely devotional content related to Hindu deities like Krishna, Vishnu, or other divine beings.";

const FALLBACK_PROMPT: &str = "You are a Sanskrit translator. Translate the given Sanskrit text to English. Focus on devotional meaning. Respond with only the translation.";

/// OpenAI-compatible chat completion request
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Shape of a JSON transcription response; plain-text bodies are used as-is.
#[derive(Debug, Deserialize)]
struct TranscriptionBody {
    text: String,
}

/// Client for the OpenRouter (OpenAI-compatible) API
pub struct OpenRouterClient {
    client: Client,
    api_key: String,
    config: ProviderConfig,
}

impl OpenRouterClient {
    /// Build a client. Fails when no credential is configured.
    pub fn new(config: &ProviderConfig) -> Result<Self, ConfigError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ConfigError::MissingCredential {
                vars: API_KEY_ENV_VARS.join(", "),
            })?
            .to_string();

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        info!("OpenRouter client ready ({})", config.base_url);

        Ok(Self {
            client,
            api_key,
            config: config.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.config.referer)
            .header("X-Title", &self.config.title)
    }

    async fn chat(
        &self,
        model: &str,
        system: Option<&str>,
        user: String,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, ProviderError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.to_string(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: user,
        });

        let body = ChatRequest {
            model,
            messages,
            max_tokens,
            temperature,
        };

        let response = self
            .request(&self.url("chat/completions"))
            .json(&body)
            .send()
            .await?;

        let response = check_status(response).await?;
        let parsed: ChatResponse = response.json().await.map_err(|e| {
            ProviderError::new(ProviderErrorKind::Malformed, e.to_string())
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| ProviderError::new(ProviderErrorKind::Malformed, "no choices returned"))
    }
}

/// Turn a non-success response into a classified error
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error response".to_string());
    error!("Provider API error ({}): {}", status, error_text);

    Err(ProviderError::new(
        ProviderErrorKind::from_status(status.as_u16()),
        format!("{}: {}", status, error_text),
    ))
}

/// Accept either `{"text": ...}` or a bare text body.
fn normalize_transcription(body: String) -> String {
    match serde_json::from_str::<TranscriptionBody>(&body) {
        Ok(parsed) => parsed.text,
        Err(_) => body,
    }
}

#[async_trait]
impl Transcriber for OpenRouterClient {
    async fn transcribe(&self, audio: &Path) -> Result<String, ProviderError> {
        let bytes = tokio::fs::read(audio).await.map_err(|e| {
            ProviderError::new(
                ProviderErrorKind::Rejected,
                format!("Failed to read {}: {}", audio.display(), e),
            )
        })?;

        let file_name = audio
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());

        debug!(
            "Sending {} ({:.2} MB) for transcription",
            file_name,
            bytes.len() as f64 / (1024.0 * 1024.0)
        );

        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name))
            .text("model", self.config.transcription_model.clone())
            .text("language", self.config.language.clone())
            .text("response_format", "text");

        let response = self
            .request(&self.url("audio/transcriptions"))
            .multipart(form)
            .send()
            .await?;

        let response = check_status(response).await?;
        let body = response.text().await?;

        Ok(normalize_transcription(body))
    }
}

#[async_trait]
impl Translator for OpenRouterClient {
    async fn translate(&self, text: &str, tier: ModelTier) -> Result<String, ProviderError> {
        match tier {
            ModelTier::Primary => {
                self.chat(
                    &self.config.translation_model,
                    Some(TRANSLATION_PROMPT),
                    format!("Translate this Sanskrit text to English: {}", text),
                    200,
                    0.3,
                )
                .await
            }
            ModelTier::Fallback => {
                self.chat(
                    &self.config.fallback_model,
                    Some(FALLBACK_PROMPT),
                    format!("Translate: {}", text),
                    150,
                    0.2,
                )
                .await
            }
        }
    }

    async fn test_connection(&self) -> Result<String, ProviderError> {
        self.chat(
            &self.config.fallback_model,
            None,
            "Say 'Hello, API is working!' in one sentence.".to_string(),
            50,
            0.0,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_api_key() {
        let config = ProviderConfig::default();
        assert!(matches!(
            OpenRouterClient::new(&config),
            Err(ConfigError::MissingCredential { .. })
        ));

        let config = ProviderConfig {
            api_key: Some("   ".to_string()),
            ..ProviderConfig::default()
        };
        assert!(matches!(
            OpenRouterClient::new(&config),
            Err(ConfigError::MissingCredential { .. })
        ));
    }

    #[test]
    fn test_url_joins_base() {
        let config = ProviderConfig {
            api_key: Some("sk-test".to_string()),
            base_url: "https://example.test/api/v1/".to_string(),
            ..ProviderConfig::default()
        };
        let client = OpenRouterClient::new(&config).unwrap();
        assert_eq!(
            client.url("chat/completions"),
            "https://example.test/api/v1/chat/completions"
        );
    }

    #[test]
    fn test_client_builds_with_configured_timeout() {
        let config = ProviderConfig {
            api_key: Some("sk-test".to_string()),
            timeout_secs: 5,
            ..ProviderConfig::default()
        };
        assert!(OpenRouterClient::new(&config).is_ok());
    }

    #[test]
    fn test_normalize_transcription_shapes() {
        assert_eq!(normalize_transcription(r#"{"text":"om"}"#.to_string()), "om");
        assert_eq!(normalize_transcription("om namah".to_string()), "om namah");
    }
}
