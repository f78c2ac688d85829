//! Pass-through translator

use async_trait::async_trait;

use chat_agent_core::{Language, Result, Translator};

/// Translator that returns the input unchanged
///
/// Used when translation is disabled; the pipeline then answers in the
/// working language regardless of the user's input language.
pub struct NoopTranslator;

impl NoopTranslator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoopTranslator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Translator for NoopTranslator {
    async fn translate(&self, text: &str, _from: Language, _to: Language) -> Result<String> {
        Ok(text.to_string())
    }

    fn supports_pair(&self, _from: Language, _to: Language) -> bool {
        true
    }

    fn name(&self) -> &str {
        "noop-translator"
    }
}
