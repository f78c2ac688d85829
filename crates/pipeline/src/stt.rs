//! HTTP transcription backend
//!
//! Sends the raw audio payload to a remote transcription service and
//! parses the recognized text plus the detected language.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use chat_agent_core::{Error, Language, Result, SpeechToText, Transcription};

/// HTTP transcription configuration
#[derive(Debug, Clone)]
pub struct HttpSttConfig {
    /// Base URL of the transcription service
    pub endpoint: String,
    /// API key (optional)
    pub api_key: Option<String>,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for HttpSttConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8090".to_string(),
            api_key: None,
            timeout_ms: 30_000,
        }
    }
}

/// Response from the transcription service
#[derive(Debug, Deserialize)]
struct SttResponse {
    text: String,
    language: String,
}

/// HTTP transcription backend
pub struct HttpSttBackend {
    client: Client,
    config: HttpSttConfig,
    languages: Vec<Language>,
}

impl HttpSttBackend {
    /// Create a new backend
    pub fn new(config: HttpSttConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| Error::Transcription(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            languages: Language::all().to_vec(),
        })
    }
}

#[async_trait]
impl SpeechToText for HttpSttBackend {
    async fn transcribe(&self, audio: &[u8]) -> Result<Transcription> {
        let mut builder = self
            .client
            .post(format!("{}/transcribe", self.config.endpoint))
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(audio.to_vec());
        if let Some(ref key) = self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Transcription(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Transcription(format!("{}: {}", status, body)));
        }

        let parsed: SttResponse = response
            .json()
            .await
            .map_err(|e| Error::Transcription(format!("invalid response: {}", e)))?;

        let language = Language::from_str_loose(&parsed.language).ok_or_else(|| {
            Error::Transcription(format!("unsupported language '{}'", parsed.language))
        })?;

        tracing::debug!(
            language = language.code(),
            chars = parsed.text.len(),
            "audio transcribed"
        );

        Ok(Transcription {
            text: parsed.text,
            language,
        })
    }

    fn supported_languages(&self) -> &[Language] {
        &self.languages
    }

    fn model_name(&self) -> &str {
        "http-stt"
    }
}
