//! Translation trait

use async_trait::async_trait;

use crate::{Language, Result};

/// Translation interface
///
/// Implementations:
/// - `HttpTranslator` - remote translation service
/// - `NoopTranslator` - pass-through (disabled)
///
/// The orchestrator skips translation entirely when source and target
/// languages match, so implementations may assume `from != to`.
///
/// # Example
///
/// ```ignore
/// let translator: Arc<dyn Translator> = create_translator(&config);
/// let english = translator
///     .translate("नमस्ते", Language::Hindi, Language::English)
///     .await?;
/// ```
#[async_trait]
pub trait Translator: Send + Sync + 'static {
    /// Translate text between languages
    ///
    /// # Arguments
    /// * `text` - Text to translate
    /// * `from` - Source language
    /// * `to` - Target language
    ///
    /// # Returns
    /// Translated text
    async fn translate(&self, text: &str, from: Language, to: Language) -> Result<String>;

    /// Check if a language pair is supported
    fn supports_pair(&self, from: Language, to: Language) -> bool;

    /// Get translator name for logging
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockTranslator;

    #[async_trait]
    impl Translator for MockTranslator {
        async fn translate(&self, text: &str, _from: Language, to: Language) -> Result<String> {
            Ok(format!("[{}] {}", to.code(), text))
        }

        fn supports_pair(&self, _from: Language, _to: Language) -> bool {
            true
        }

        fn name(&self) -> &str {
            "mock-translator"
        }
    }

    #[tokio::test]
    async fn test_mock_translator() {
        let translator = MockTranslator;
        assert!(translator.supports_pair(Language::Hindi, Language::English));

        let result = translator
            .translate("नमस्ते", Language::Hindi, Language::English)
            .await
            .unwrap();
        assert!(result.starts_with("[en]"));
    }
}
