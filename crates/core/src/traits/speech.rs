//! Speech-to-text trait

use async_trait::async_trait;

use crate::{Language, Result};

/// Transcription result: recognized text plus the language the speaker used
#[derive(Debug, Clone, PartialEq)]
pub struct Transcription {
    pub text: String,
    pub language: Language,
}

/// Speech-to-Text interface
///
/// Implementations:
/// - `HttpSttBackend` - remote transcription service
///
/// # Example
///
/// ```ignore
/// let stt: Arc<dyn SpeechToText> = Arc::new(HttpSttBackend::new(config)?);
/// let transcription = stt.transcribe(&audio_bytes).await?;
/// println!("{} ({})", transcription.text, transcription.language);
/// ```
#[async_trait]
pub trait SpeechToText: Send + Sync + 'static {
    /// Transcribe an audio payload
    ///
    /// # Arguments
    /// * `audio` - Encoded audio bytes as received from the caller
    ///
    /// # Returns
    /// Recognized text and detected language
    async fn transcribe(&self, audio: &[u8]) -> Result<Transcription>;

    /// Get supported languages
    fn supported_languages(&self) -> &[Language];

    /// Get model name for logging
    fn model_name(&self) -> &str;

    /// Check if a specific language is supported
    fn supports_language(&self, lang: Language) -> bool {
        self.supported_languages().contains(&lang)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockStt {
        languages: Vec<Language>,
    }

    #[async_trait]
    impl SpeechToText for MockStt {
        async fn transcribe(&self, _audio: &[u8]) -> Result<Transcription> {
            Ok(Transcription {
                text: "test transcription".to_string(),
                language: Language::Hindi,
            })
        }

        fn supported_languages(&self) -> &[Language] {
            &self.languages
        }

        fn model_name(&self) -> &str {
            "mock-stt"
        }
    }

    #[tokio::test]
    async fn test_mock_stt() {
        let stt = MockStt {
            languages: vec![Language::Hindi, Language::English],
        };
        assert!(stt.supports_language(Language::Hindi));
        assert!(!stt.supports_language(Language::Malayalam));

        let result = stt.transcribe(&[0u8; 16]).await.unwrap();
        assert_eq!(result.language, Language::Hindi);
    }
}
