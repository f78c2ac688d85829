//! REST translation backend
//!
//! Calls a translation service that accepts regioned language codes
//! (`hi-IN`, `en-IN`, ...) and returns the translated text.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use chat_agent_core::{Language, Result, Translator};

use crate::TranslationError;

/// HTTP translator configuration
#[derive(Debug, Clone)]
pub struct HttpTranslatorConfig {
    /// Service base URL
    pub endpoint: String,
    /// API subscription key (optional)
    pub api_key: Option<String>,
    /// Translation model id
    pub model: String,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for HttpTranslatorConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.sarvam.ai".to_string(),
            api_key: None,
            model: "sarvam-translate:v1".to_string(),
            timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    input: &'a str,
    source_language_code: String,
    target_language_code: String,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translated_text: String,
}

/// REST translation backend
pub struct HttpTranslator {
    client: Client,
    config: HttpTranslatorConfig,
}

impl HttpTranslator {
    /// Create a new HTTP translator
    pub fn new(config: HttpTranslatorConfig) -> std::result::Result<Self, TranslationError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| TranslationError::Network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Regioned language code expected by the service
    fn region_code(language: Language) -> String {
        format!("{}-IN", language.code())
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(&self, text: &str, from: Language, to: Language) -> Result<String> {
        if !self.supports_pair(from, to) {
            return Err(TranslationError::UnsupportedPair(
                from.code().to_string(),
                to.code().to_string(),
            )
            .into());
        }

        let request = TranslateRequest {
            input: text,
            source_language_code: Self::region_code(from),
            target_language_code: Self::region_code(to),
            model: &self.config.model,
        };

        let mut builder = self
            .client
            .post(format!("{}/translate", self.config.endpoint))
            .json(&request);
        if let Some(ref key) = self.config.api_key {
            builder = builder.header("api-subscription-key", key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TranslationError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TranslationError::Service(format!("{}: {}", status, body)).into());
        }

        let parsed: TranslateResponse = response
            .json()
            .await
            .map_err(|e| TranslationError::InvalidResponse(e.to_string()))?;

        tracing::debug!(
            from = from.code(),
            to = to.code(),
            chars = text.len(),
            "translation complete"
        );

        Ok(parsed.translated_text)
    }

    fn supports_pair(&self, from: Language, to: Language) -> bool {
        from != to
    }

    fn name(&self) -> &str {
        "http-translator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_codes() {
        assert_eq!(HttpTranslator::region_code(Language::English), "en-IN");
        assert_eq!(HttpTranslator::region_code(Language::Hindi), "hi-IN");
        assert_eq!(HttpTranslator::region_code(Language::Malayalam), "ml-IN");
    }

    #[test]
    fn test_identical_pair_unsupported() {
        let translator = HttpTranslator::new(HttpTranslatorConfig::default()).unwrap();
        assert!(!translator.supports_pair(Language::Hindi, Language::Hindi));
        assert!(translator.supports_pair(Language::Hindi, Language::English));
    }

    #[tokio::test]
    async fn test_identical_pair_rejected() {
        let translator = HttpTranslator::new(HttpTranslatorConfig::default()).unwrap();
        let result = translator
            .translate("text", Language::English, Language::English)
            .await;
        assert!(result.is_err());
    }
}
